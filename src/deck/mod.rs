//! Deck building and the pending-draw resolver.
//!
//! A user's deck is an ordered list of [`DeckCard`]s. Drawing for a question
//! marks cards as pending instead of removing them: they stay in the deck
//! until the next hand update tells us which of them the user kept. Only one
//! pending batch exists at a time, every draw first returns the previous
//! batch to the pool.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use crate::catalog::types::{Card, CardId, Difficulty};
use crate::catalog::Catalog;
use crate::error::{GameError, GameResult};

/// A catalog card sitting in a user's deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DeckCard {
    #[serde(flatten)]
    pub card: Card,
    /// Drawn but not yet confirmed into the hand.
    #[serde(rename = "_pending", default, skip_serializing_if = "is_false")]
    pub pending: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl DeckCard {
    pub fn available(card: Card) -> Self {
        DeckCard {
            card,
            pending: false,
        }
    }
}

/// Cards handed out by a draw, together with the deck that results from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub drawn: Vec<Card>,
    pub deck: Vec<DeckCard>,
}

/// Every eligible card `weight` times, shuffled.
pub fn build_deck<R: Rng + ?Sized>(catalog: &Catalog, game_size: u8, rng: &mut R) -> Vec<DeckCard> {
    let difficulty = Difficulty::from_game_size(game_size);
    let mut deck: Vec<DeckCard> = catalog
        .eligible(difficulty)
        .flat_map(|card| std::iter::repeat(card).take(card.weight as usize))
        .map(|card| DeckCard::available(card.clone()))
        .collect();
    deck.shuffle(rng);
    log::debug!(
        "built {} card deck for {:?} difficulty",
        deck.len(),
        difficulty
    );
    deck
}

/// Sample `count` cards with replacement, weighted by copy count, without
/// touching any deck. Used for practice draws only.
pub fn generate_random_cards<R: Rng + ?Sized>(
    catalog: &Catalog,
    count: usize,
    game_size: u8,
    rng: &mut R,
) -> GameResult<Vec<Card>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let pool: Vec<&Card> = catalog
        .eligible(Difficulty::from_game_size(game_size))
        .collect();
    let weights = WeightedIndex::new(pool.iter().map(|c| c.weight))
        .map_err(|e| GameError::Internal(format!("no cards to draw from: {e}")))?;
    Ok((0..count)
        .map(|_| pool[weights.sample(rng)].clone())
        .collect())
}

/// Return every pending card to the pool.
pub fn clear_pending(deck: &[DeckCard]) -> Vec<DeckCard> {
    deck.iter()
        .map(|entry| DeckCard::available(entry.card.clone()))
        .collect()
}

pub fn pending_count(deck: &[DeckCard]) -> usize {
    deck.iter().filter(|c| c.pending).count()
}

fn pick_indices<R: Rng + ?Sized>(
    available: usize,
    count: usize,
    rng: &mut R,
) -> GameResult<Vec<usize>> {
    if available < count {
        log::warn!("deck exhausted: requested {count}, {available} available");
        return Err(GameError::DeckExhausted {
            requested: count,
            available,
        });
    }
    Ok(index::sample(rng, available, count).into_vec())
}

/// Draw `count` distinct cards and mark them pending. Any earlier pending
/// batch is returned to the pool first. On failure the input deck is untouched.
pub fn draw_from_deck<R: Rng + ?Sized>(
    deck: &[DeckCard],
    count: usize,
    rng: &mut R,
) -> GameResult<Draw> {
    let mut updated = clear_pending(deck);
    let picked = pick_indices(updated.len(), count, rng)?;
    let drawn = picked
        .iter()
        .map(|&i| {
            updated[i].pending = true;
            updated[i].card.clone()
        })
        .collect();
    Ok(Draw {
        drawn,
        deck: updated,
    })
}

/// Draw `count` distinct cards and remove them from the deck straight away.
/// Used by effects that draw inside the same action that played the card.
pub fn consume_from_deck<R: Rng + ?Sized>(
    deck: &[DeckCard],
    count: usize,
    rng: &mut R,
) -> GameResult<Draw> {
    let clean = clear_pending(deck);
    let picked = pick_indices(clean.len(), count, rng)?;
    let drawn = picked.iter().map(|&i| clean[i].card.clone()).collect();
    let picked: HashSet<usize> = picked.into_iter().collect();
    let deck = clean
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !picked.contains(i))
        .map(|(_, c)| c)
        .collect();
    Ok(Draw { drawn, deck })
}

fn id_counts<'a>(hand: impl IntoIterator<Item = &'a Option<Card>>) -> HashMap<CardId, usize> {
    let mut counts = HashMap::new();
    for card in hand.into_iter().flatten() {
        *counts.entry(card.id).or_insert(0) += 1;
    }
    counts
}

/// Settle the pending batch against a whole-hand update.
///
/// The update carries the full new hand, so kept cards are inferred from the
/// per-id population change: each extra copy of an id consumes one pending
/// deck entry with that id. Rearranging cards already in hand changes no
/// counts and consumes nothing. Pending entries left over return to the pool.
pub fn reconcile_pending(
    old_hand: &[Option<Card>],
    new_hand: &[Option<Card>],
    deck: &[DeckCard],
) -> Vec<DeckCard> {
    if pending_count(deck) == 0 {
        return deck.to_vec();
    }
    let old_counts = id_counts(old_hand);
    let new_counts = id_counts(new_hand);
    let mut updated = deck.to_vec();
    for (id, new_count) in new_counts {
        let added = new_count.saturating_sub(old_counts.get(&id).copied().unwrap_or(0));
        for _ in 0..added {
            match updated.iter().position(|c| c.pending && c.card.id == id) {
                Some(index) => {
                    updated.remove(index);
                }
                None => break,
            }
        }
    }
    clear_pending(&updated)
}

/// Deck entries grouped by "Type (color)", or the bare type when colorless.
pub fn deck_composition(deck: &[DeckCard]) -> BTreeMap<String, usize> {
    let mut composition = BTreeMap::new();
    for entry in deck {
        *composition.entry(entry.card.composition_key()).or_insert(0) += 1;
    }
    composition
}
