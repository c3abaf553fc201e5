use std::collections::BTreeMap;

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use crate::catalog::types::{Card, CurseData};
use crate::deck::{deck_composition, pending_count, DeckCard};

pub type UserId = u64;

/// One user's game: their hand, their deck and everything they discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct GameState {
    pub user_id: UserId,
    /// Fixed number of slots, `None` for an empty slot.
    pub hand: Vec<Option<Card>>,
    /// Difficulty level: 3 = Small, 4 = Medium, 5 = Large.
    pub game_size: u8,
    pub deck: Vec<DeckCard>,
    pub discard_pile: Vec<Card>,
}

impl GameState {
    pub fn new(user_id: UserId, hand_size: usize, game_size: u8) -> Self {
        GameState {
            user_id,
            hand: vec![None; hand_size],
            game_size,
            deck: Vec::new(),
            discard_pile: Vec::new(),
        }
    }

    pub fn empty_slots(&self) -> Vec<usize> {
        self.hand
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Questions the seekers can ask, each with its own draw/pick pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Matching,
    Measuring,
    Thermometer,
    Radar,
    Tentacles,
    Photos,
}

impl QuestionType {
    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "MATCHING" => Some(QuestionType::Matching),
            "MEASURING" => Some(QuestionType::Measuring),
            "THERMOMETER" => Some(QuestionType::Thermometer),
            "RADAR" => Some(QuestionType::Radar),
            "TENTACLES" => Some(QuestionType::Tentacles),
            "PHOTOS" => Some(QuestionType::Photos),
            _ => None,
        }
    }

    /// `(draw, pick)` for this question.
    pub fn draw_counts(&self) -> (usize, usize) {
        match self {
            QuestionType::Matching | QuestionType::Measuring => (3, 1),
            QuestionType::Thermometer | QuestionType::Radar => (2, 1),
            QuestionType::Tentacles => (4, 2),
            QuestionType::Photos => (1, 1),
        }
    }
}

/// Draw counts for a raw question name; unknown questions draw 3 and pick 1.
pub fn draw_counts_for(question_type: &str) -> (usize, usize) {
    QuestionType::from_name(question_type).map_or((3, 1), |q| q.draw_counts())
}

/// Everything a successful play produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayResult {
    pub state: GameState,
    pub played: Card,
    pub drawn_cards: Vec<Card>,
    pub auto_placed: bool,
    pub placed_positions: Vec<usize>,
    pub curse_data: Option<CurseData>,
}

// ====== Request / response bodies ======

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DrawCardsRequest {
    pub question_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DrawCardsResponse {
    pub cards: Vec<Card>,
    pub count: usize,
    pub pick_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct UpdateHandRequest {
    pub hand: Vec<Option<Card>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct UpdateGameSizeRequest {
    pub game_size: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PlayCardRequest {
    pub hand_position: usize,
    #[serde(default)]
    pub discard_positions: Option<Vec<usize>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PlacePendingCardsRequest {
    pub cards_to_place: Vec<Card>,
    pub discard_positions: Vec<usize>,
}

/// What callers see of a game state. The deck itself stays server side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct GameStateView {
    pub hand: Vec<Option<Card>>,
    pub game_size: u8,
    pub deck_size: usize,
    pub deck_composition: BTreeMap<String, usize>,
    pub discard_pile_size: usize,
    pub pending_count: usize,
}

impl From<&GameState> for GameStateView {
    fn from(state: &GameState) -> Self {
        GameStateView {
            hand: state.hand.clone(),
            game_size: state.game_size,
            deck_size: state.deck.len(),
            deck_composition: deck_composition(&state.deck),
            discard_pile_size: state.discard_pile.len(),
            pending_count: pending_count(&state.deck),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DeckInfo {
    pub deck_size: usize,
    pub deck_composition: BTreeMap<String, usize>,
    pub discard_pile_size: usize,
    pub game_size: u8,
}

impl From<&GameState> for DeckInfo {
    fn from(state: &GameState) -> Self {
        DeckInfo {
            deck_size: state.deck.len(),
            deck_composition: deck_composition(&state.deck),
            discard_pile_size: state.discard_pile.len(),
            game_size: state.game_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PlayCardResponse {
    #[serde(flatten)]
    pub state: GameStateView,
    pub drawn_cards: Vec<Card>,
    pub auto_placed: bool,
    pub placed_positions: Vec<usize>,
    /// Set when drawn cards did not fit and must be placed manually.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_discard_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curse_data: Option<CurseData>,
    pub message: String,
}

impl From<&PlayResult> for PlayCardResponse {
    fn from(result: &PlayResult) -> Self {
        let must_discard_count = if !result.drawn_cards.is_empty() && !result.auto_placed {
            Some(result.drawn_cards.len())
        } else {
            None
        };
        PlayCardResponse {
            state: GameStateView::from(&result.state),
            drawn_cards: result.drawn_cards.clone(),
            auto_placed: result.auto_placed,
            placed_positions: result.placed_positions.clone(),
            must_discard_count,
            curse_data: result.curse_data.clone(),
            message: "Card played successfully".to_string(),
        }
    }
}
