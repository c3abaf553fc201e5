//! Hand and discard-pile rules: playing cards, resolving their effects,
//! placing drawn cards and keeping the hand at its configured size.
//!
//! Every function validates completely before it touches the state, so an
//! error always leaves the state exactly as it was passed in.

use std::collections::HashSet;

use rand::Rng;

use super::types::{GameState, PlayResult};
use crate::catalog::types::{Card, CurseData, EffectKind};
use crate::catalog::Catalog;
use crate::deck::{build_deck, consume_from_deck};
use crate::error::{GameError, GameResult, PositionFault};

/// Check the positions a play wants to discard.
///
/// There must be exactly `required` of them, each inside the hand, distinct,
/// not the played card and holding a card.
pub fn validate_discard_positions(
    hand: &[Option<Card>],
    played_position: Option<usize>,
    positions: &[usize],
    required: usize,
) -> GameResult<()> {
    if positions.len() != required {
        return Err(GameError::validation(format!(
            "must discard exactly {required} card(s), got {}",
            positions.len()
        )));
    }
    let mut seen = HashSet::with_capacity(positions.len());
    for &position in positions {
        if position >= hand.len() {
            return Err(GameError::position(position, PositionFault::OutOfBounds));
        }
        if Some(position) == played_position {
            return Err(GameError::position(position, PositionFault::PlayedCard));
        }
        if !seen.insert(position) {
            return Err(GameError::validation(format!(
                "position {position} selected more than once"
            )));
        }
        if hand[position].is_none() {
            return Err(GameError::position(position, PositionFault::EmptySlot));
        }
    }
    Ok(())
}

/// Move the cards at `positions` to the discard pile, in the given order.
fn discard_positions(state: &mut GameState, positions: &[usize]) {
    for &position in positions {
        if let Some(card) = state.hand[position].take() {
            state.discard_pile.push(card);
        }
    }
}

/// Fill empty slots, lowest index first, if all of `drawn` fit.
/// Returns the filled positions, or `None` when there is not enough room.
pub fn auto_place(hand: &mut [Option<Card>], drawn: &[Card]) -> Option<Vec<usize>> {
    let empty: Vec<usize> = hand
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none())
        .map(|(i, _)| i)
        .collect();
    if empty.len() < drawn.len() {
        return None;
    }
    let placed: Vec<usize> = empty.into_iter().take(drawn.len()).collect();
    for (&position, card) in placed.iter().zip(drawn) {
        hand[position] = Some(card.clone());
    }
    Some(placed)
}

/// Play the card at `hand_position` and resolve its effect.
pub fn play_card<R: Rng + ?Sized>(
    mut state: GameState,
    catalog: &Catalog,
    hand_position: usize,
    discards: &[usize],
    rng: &mut R,
) -> GameResult<PlayResult> {
    if hand_position >= state.hand.len() {
        return Err(GameError::position(
            hand_position,
            PositionFault::OutOfBounds,
        ));
    }
    let played = state.hand[hand_position]
        .clone()
        .ok_or_else(|| GameError::position(hand_position, PositionFault::EmptySlot))?;

    let mut drawn_cards = Vec::new();
    let mut auto_placed = false;
    let mut placed_positions = Vec::new();
    let mut curse_data = None;

    match played.effect {
        EffectKind::CurseCast { discard } => {
            validate_discard_positions(&state.hand, Some(hand_position), discards, discard)?;
            discard_positions(&mut state, discards);
            discard_positions(&mut state, &[hand_position]);
            curse_data = Some(CurseData::from(&played));
        }
        EffectKind::ChainedDraw { discard, draw } => {
            validate_discard_positions(&state.hand, Some(hand_position), discards, discard)?;
            let deck = if state.deck.is_empty() {
                build_deck(catalog, state.game_size, rng)
            } else {
                std::mem::take(&mut state.deck)
            };
            let result = consume_from_deck(&deck, draw, rng)?;
            state.deck = result.deck;
            discard_positions(&mut state, discards);
            discard_positions(&mut state, &[hand_position]);
            if let Some(positions) = auto_place(&mut state.hand, &result.drawn) {
                auto_placed = true;
                placed_positions = positions;
            }
            drawn_cards = result.drawn;
        }
        EffectKind::SimpleDiscard => {
            discard_positions(&mut state, &[hand_position]);
        }
    }

    Ok(PlayResult {
        state,
        played,
        drawn_cards,
        auto_placed,
        placed_positions,
        curse_data,
    })
}

/// Discard the cards at `positions`, then put `cards` into the empty slots in
/// order. Cards that still do not fit are dropped.
///
/// Returns the positions that received a card.
pub fn place_pending_cards(
    state: &mut GameState,
    cards: &[Card],
    positions: &[usize],
) -> GameResult<Vec<usize>> {
    if positions.len() != cards.len() {
        return Err(GameError::validation(format!(
            "must discard the same number of cards as are placed ({} placed, {} discarded)",
            cards.len(),
            positions.len()
        )));
    }
    validate_discard_positions(&state.hand, None, positions, cards.len())?;
    discard_positions(state, positions);

    let empty = state.empty_slots();
    let mut placed = Vec::with_capacity(cards.len());
    for (position, card) in empty.into_iter().zip(cards) {
        state.hand[position] = Some(card.clone());
        placed.push(position);
    }
    if placed.len() < cards.len() {
        log::warn!(
            "user {}: dropped {} pending card(s) with no free hand slot",
            state.user_id,
            cards.len() - placed.len()
        );
    }
    Ok(placed)
}

/// Pad with empty slots or cut the hand down to `hand_size`. Cards in cut
/// slots go to the discard pile. Returns whether the hand changed.
pub fn resize_hand(state: &mut GameState, hand_size: usize) -> bool {
    if state.hand.len() == hand_size {
        return false;
    }
    if state.hand.len() < hand_size {
        state.hand.resize(hand_size, None);
    } else {
        let cut: Vec<Card> = state.hand.drain(hand_size..).flatten().collect();
        if !cut.is_empty() {
            log::warn!(
                "user {}: hand shrunk to {hand_size}, {} card(s) moved to the discard pile",
                state.user_id,
                cut.len()
            );
        }
        state.discard_pile.extend(cut);
    }
    true
}
