//! The card catalog: static card definitions, loaded once and shared read-only.

mod endpoints;
pub mod types;

pub use endpoints::{
    list_cards, okapi_add_operation_for_list_cards_, okapi_add_operation_for_practice_draw_,
    practice_draw, PracticeDrawResponse,
};

use std::collections::HashMap;
use std::path::Path;

use types::{Card, CardId, Difficulty, EffectKind};

use crate::error::{GameError, GameResult};

const BUNDLED_CATALOG: &str = include_str!("../../data/cards.json");

/// Immutable set of card definitions. Built once at bootstrap and handed
/// around behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Catalog {
    cards: Vec<Card>,
    by_id: HashMap<CardId, usize>,
}

impl Catalog {
    /// Validate the definitions and resolve each card's effect kind.
    pub fn from_cards(mut cards: Vec<Card>) -> GameResult<Self> {
        let mut by_id = HashMap::with_capacity(cards.len());
        for (index, card) in cards.iter_mut().enumerate() {
            if card.weight == 0 {
                return Err(GameError::Internal(format!(
                    "catalog card {} has a weight of zero",
                    card.id
                )));
            }
            if by_id.insert(card.id, index).is_some() {
                return Err(GameError::Internal(format!(
                    "catalog card id {} is defined more than once",
                    card.id
                )));
            }
            card.effect = EffectKind::classify(card);
        }
        Ok(Catalog { cards, by_id })
    }

    pub fn from_json(json: &str) -> GameResult<Self> {
        let cards: Vec<Card> = serde_json::from_str(json)
            .map_err(|e| GameError::Internal(format!("failed to parse card catalog: {e}")))?;
        Self::from_cards(cards)
    }

    pub fn bundled() -> GameResult<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Load from `path`, or the bundled catalog when no path is configured.
    pub fn load(path: Option<&Path>) -> GameResult<Self> {
        let catalog = match path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    GameError::Internal(format!(
                        "failed to read card catalog {}: {e}",
                        path.display()
                    ))
                })?;
                Self::from_json(&json)?
            }
            None => Self::bundled()?,
        };
        log::info!(
            "loaded {} card definitions from {}",
            catalog.cards.len(),
            path.map_or_else(|| "bundled catalog".to_string(), |p| p.display().to_string())
        );
        Ok(catalog)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.by_id.get(&id).map(|&index| &self.cards[index])
    }

    /// Cards that belong in a deck at this difficulty.
    pub fn eligible(&self, difficulty: Difficulty) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.is_eligible(difficulty))
    }

    /// Replace a client-supplied card with the catalog's definition of the same id.
    pub fn canonicalize(&self, card: &Card) -> GameResult<Card> {
        self.get(card.id)
            .cloned()
            .ok_or_else(|| GameError::validation(format!("unknown card id {}", card.id)))
    }
}
