use rocket::http::Status as HttpStatus;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use crate::error::GameError;

/// Error body returned by every endpoint.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Status {
    pub message: String,
}

pub fn new_status(message: String) -> Json<Status> {
    Json(Status { message })
}

/// What a failing endpoint responds with.
pub type ApiError = (HttpStatus, Json<Status>);

impl From<GameError> for ApiError {
    fn from(error: GameError) -> Self {
        let code = match &error {
            GameError::Validation(_) | GameError::InvalidPosition { .. } => HttpStatus::BadRequest,
            GameError::NotFound(_) => HttpStatus::NotFound,
            GameError::DeckExhausted { .. } => HttpStatus::Conflict,
            GameError::Internal(_) => {
                log::error!("{error}");
                HttpStatus::InternalServerError
            }
        };
        (code, new_status(error.to_string()))
    }
}
