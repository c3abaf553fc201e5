use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use crate::catalog::types::Card;
use crate::deck::DeckCard;
use crate::game::types::{GameState, UserId};

/// Per-user counters. They only ever grow, until a reset zeroes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Statistics {
    pub cards_drawn: u64,
    pub cards_played: u64,
    pub games_completed: u64,
}

/// Amounts to add to a user's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsDelta {
    pub cards_drawn: u64,
    pub cards_played: u64,
    pub games_completed: u64,
}

impl StatisticsDelta {
    pub fn drawn(count: usize) -> Self {
        StatisticsDelta {
            cards_drawn: count as u64,
            ..Self::default()
        }
    }

    pub fn played() -> Self {
        StatisticsDelta {
            cards_played: 1,
            ..Self::default()
        }
    }
}

impl Statistics {
    pub fn apply(&mut self, delta: &StatisticsDelta) {
        self.cards_drawn += delta.cards_drawn;
        self.cards_played += delta.cards_played;
        self.games_completed += delta.games_completed;
    }
}

/// The parts of a game state kept when a reset archives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct GameStateSnapshot {
    pub hand: Vec<Option<Card>>,
    pub game_size: u8,
    pub deck: Vec<DeckCard>,
    pub discard_pile: Vec<Card>,
}

impl From<&GameState> for GameStateSnapshot {
    fn from(state: &GameState) -> Self {
        GameStateSnapshot {
            hand: state.hand.clone(),
            game_size: state.game_size,
            deck: state.deck.clone(),
            discard_pile: state.discard_pile.clone(),
        }
    }
}

/// What happened, one variant per game operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "type")]
pub enum HistoryPayload {
    Draw {
        question_type: String,
        cards: Vec<Card>,
        pick_count: usize,
    },
    UpdateHand {
        hand: Vec<Option<Card>>,
    },
    UpdateGameSize {
        old_size: u8,
        new_size: u8,
        deck_size: usize,
    },
    PlayCard {
        card: Card,
        hand_position: usize,
        discard_positions: Vec<usize>,
        drawn_cards: Vec<Card>,
    },
    PlacePendingCards {
        cards_placed: usize,
        discard_positions: Vec<usize>,
    },
    ResetArchive {
        game_state: Option<GameStateSnapshot>,
        statistics: Option<Statistics>,
    },
}

impl HistoryPayload {
    pub fn action_type(&self) -> &'static str {
        match self {
            HistoryPayload::Draw { .. } => "draw",
            HistoryPayload::UpdateHand { .. } => "update_hand",
            HistoryPayload::UpdateGameSize { .. } => "update_game_size",
            HistoryPayload::PlayCard { .. } => "play_card",
            HistoryPayload::PlacePendingCards { .. } => "place_pending_cards",
            HistoryPayload::ResetArchive { .. } => "reset_archive",
        }
    }
}

/// Stored entry in the append-only history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct HistoryEntry {
    pub seq: u64,
    pub user_id: UserId,
    pub action_type: String,
    pub payload: HistoryPayload,
    /// Milliseconds since the unix epoch.
    pub created_at: u64,
}

/// Paging and filtering for a user's history, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub limit: usize,
    pub offset: usize,
    pub action_type: Option<String>,
}

impl HistoryQuery {
    pub const DEFAULT_LIMIT: usize = 50;
    pub const MAX_LIMIT: usize = 200;
}

impl Default for HistoryQuery {
    fn default() -> Self {
        HistoryQuery {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
            action_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
    pub archive_seq: u64,
    pub archive_timestamp: u64,
}
