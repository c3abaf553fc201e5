use std::fmt;

use thiserror::Error;

/// Why a hand or discard position was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFault {
    OutOfBounds,
    /// The slot holds no card.
    EmptySlot,
    /// The position is the card being played.
    PlayedCard,
}

impl fmt::Display for PositionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionFault::OutOfBounds => write!(f, "position is outside the hand"),
            PositionFault::EmptySlot => write!(f, "no card at this position"),
            PositionFault::PlayedCard => write!(f, "cannot discard the card being played"),
        }
    }
}

/// Error kinds surfaced by every game operation.
///
/// All of them are raised before anything is written back, so a failed
/// operation never leaves a partial change behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid position {position}: {fault}")]
    InvalidPosition {
        position: usize,
        fault: PositionFault,
    },
    #[error("deck exhausted: requested {requested} card(s) but only {available} available, reset is required to continue drawing")]
    DeckExhausted { requested: usize, available: usize },
    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn validation(message: impl Into<String>) -> Self {
        GameError::Validation(message.into())
    }

    pub fn position(position: usize, fault: PositionFault) -> Self {
        GameError::InvalidPosition { position, fault }
    }
}

impl From<std::io::Error> for GameError {
    fn from(value: std::io::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type GameResult<T> = Result<T, GameError>;
