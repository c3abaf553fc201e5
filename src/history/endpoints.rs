use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use super::types::{HistoryEntry, HistoryQuery, ResetResponse, Statistics};
use crate::error::GameError;
use crate::game::types::UserId;
use crate::game::GameService;
use crate::status_messages::ApiError;

#[openapi]
#[get("/users/<user_id>/stats")]
pub async fn get_statistics(
    user_id: UserId,
    service: &State<GameService>,
) -> Result<Json<Statistics>, ApiError> {
    Ok(Json(service.statistics(user_id)?))
}

/// A user's history, newest first.
/// Optionally filter by ?action_type= (draw, update_hand, play_card, ...).
#[openapi]
#[get("/users/<user_id>/stats/history?<limit>&<offset>&<action_type>")]
pub async fn list_history(
    user_id: UserId,
    limit: Option<usize>,
    offset: Option<usize>,
    action_type: Option<String>,
    service: &State<GameService>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let limit = limit.unwrap_or(HistoryQuery::DEFAULT_LIMIT);
    if limit == 0 || limit > HistoryQuery::MAX_LIMIT {
        return Err(GameError::validation(format!(
            "limit must be between 1 and {}, got {limit}",
            HistoryQuery::MAX_LIMIT
        ))
        .into());
    }
    let query = HistoryQuery {
        limit,
        offset: offset.unwrap_or(0),
        action_type,
    };
    Ok(Json(service.user_history(user_id, &query)))
}

/// Archive the current game and counters into history, then start a fresh
/// game at the same size.
#[openapi]
#[post("/users/<user_id>/stats/reset")]
pub async fn reset_progress(
    user_id: UserId,
    service: &State<GameService>,
) -> Result<Json<ResetResponse>, ApiError> {
    let archive = service.reset_progress(user_id)?;
    Ok(Json(ResetResponse {
        success: true,
        message: "Progress reset; previous game archived".to_string(),
        archive_seq: archive.seq,
        archive_timestamp: archive.created_at,
    }))
}
