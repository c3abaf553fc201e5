use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use super::types::Card;
use crate::error::GameError;
use crate::game::GameService;
use crate::status_messages::ApiError;

const MAX_PRACTICE_DRAW: usize = 20;

/// Every card definition in the catalog.
#[openapi]
#[get("/cards")]
pub async fn list_cards(service: &State<GameService>) -> Json<Vec<Card>> {
    Json(service.catalog().cards().to_vec())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PracticeDrawResponse {
    pub cards: Vec<Card>,
    pub game_size: u8,
}

/// Weighted random cards drawn with replacement. Nothing is stored and no
/// deck is touched.
#[openapi]
#[get("/cards/practice-draw?<game_size>&<count>")]
pub async fn practice_draw(
    game_size: Option<u8>,
    count: Option<usize>,
    service: &State<GameService>,
) -> Result<Json<PracticeDrawResponse>, ApiError> {
    let game_size = game_size.unwrap_or(service.config().default_game_size);
    let count = count.unwrap_or(1);
    if count == 0 || count > MAX_PRACTICE_DRAW {
        return Err(GameError::validation(format!(
            "count must be between 1 and {MAX_PRACTICE_DRAW}, got {count}"
        ))
        .into());
    }
    let cards = service.practice_draw(game_size, count)?;
    Ok(Json(PracticeDrawResponse { cards, game_size }))
}
