use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use super::service::GameService;
use super::types::{
    DeckInfo, DrawCardsRequest, DrawCardsResponse, GameStateView, PlacePendingCardsRequest,
    PlayCardRequest, PlayCardResponse, UpdateGameSizeRequest, UpdateHandRequest, UserId,
};
use crate::status_messages::ApiError;

/// Current game state, created on first access.
#[openapi]
#[get("/users/<user_id>/game/state")]
pub async fn get_game_state(
    user_id: UserId,
    service: &State<GameService>,
) -> Result<Json<GameStateView>, ApiError> {
    let state = service.get_or_create_state(user_id)?;
    Ok(Json(GameStateView::from(&state)))
}

/// Draw cards for a question. They stay pending in the deck until the next
/// hand update decides which were kept.
#[openapi]
#[post("/users/<user_id>/game/draw", format = "json", data = "<request>")]
pub async fn draw_cards(
    user_id: UserId,
    service: &State<GameService>,
    request: Json<DrawCardsRequest>,
) -> Result<Json<DrawCardsResponse>, ApiError> {
    let drawn = service.draw_cards(user_id, &request.question_type)?;
    Ok(Json(drawn))
}

#[openapi]
#[put("/users/<user_id>/game/hand", format = "json", data = "<request>")]
pub async fn update_hand(
    user_id: UserId,
    service: &State<GameService>,
    request: Json<UpdateHandRequest>,
) -> Result<Json<GameStateView>, ApiError> {
    let state = service.update_hand(user_id, &request.hand)?;
    Ok(Json(GameStateView::from(&state)))
}

#[openapi]
#[put("/users/<user_id>/game/game-size", format = "json", data = "<request>")]
pub async fn update_game_size(
    user_id: UserId,
    service: &State<GameService>,
    request: Json<UpdateGameSizeRequest>,
) -> Result<Json<GameStateView>, ApiError> {
    let state = service.update_game_size(user_id, request.game_size)?;
    Ok(Json(GameStateView::from(&state)))
}

/// Play the card at `hand_position`. Curses and chained draws take the
/// discard positions their cost asks for.
#[openapi]
#[post("/users/<user_id>/game/play", format = "json", data = "<request>")]
pub async fn play_card(
    user_id: UserId,
    service: &State<GameService>,
    request: Json<PlayCardRequest>,
) -> Result<Json<PlayCardResponse>, ApiError> {
    let request = request.into_inner();
    let result = service.play_card(
        user_id,
        request.hand_position,
        request.discard_positions.as_deref().unwrap_or(&[]),
    )?;
    Ok(Json(PlayCardResponse::from(&result)))
}

#[openapi]
#[post(
    "/users/<user_id>/game/place-pending-cards",
    format = "json",
    data = "<request>"
)]
pub async fn place_pending_cards(
    user_id: UserId,
    service: &State<GameService>,
    request: Json<PlacePendingCardsRequest>,
) -> Result<Json<GameStateView>, ApiError> {
    let state =
        service.place_pending_cards(user_id, &request.cards_to_place, &request.discard_positions)?;
    Ok(Json(GameStateView::from(&state)))
}

#[openapi]
#[get("/users/<user_id>/game/deck")]
pub async fn get_deck_info(
    user_id: UserId,
    service: &State<GameService>,
) -> Result<Json<DeckInfo>, ApiError> {
    let state = service.get_or_create_state(user_id)?;
    Ok(Json(DeckInfo::from(&state)))
}
