use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand_pcg::Lcg64Xsh32;

use super::hand;
use super::types::{draw_counts_for, DrawCardsResponse, GameState, PlayResult, UserId};
use crate::catalog::types::Card;
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::deck::{build_deck, draw_from_deck, generate_random_cards, reconcile_pending};
use crate::error::{GameError, GameResult};
use crate::history::types::{
    GameStateSnapshot, HistoryEntry, HistoryPayload, HistoryQuery, Statistics, StatisticsDelta,
};
use crate::history::HistoryLog;
use crate::lock;
use crate::repository::{InMemoryRepository, StateRepository, StatisticsStore};

const USER_LOCK_PRUNE_AT: usize = 256;

/// Expand a u64 seed to the generator's 16 seed bytes.
pub fn seeded_rng(seed: u64) -> Lcg64Xsh32 {
    let mut seed_bytes = [0u8; 16];
    seed_bytes[0..8].copy_from_slice(&seed.to_le_bytes());
    seed_bytes[8..16].copy_from_slice(&seed.to_le_bytes());
    Lcg64Xsh32::from_seed(seed_bytes)
}

/// Runs every game operation as load, compute, store, record.
///
/// Operations for one user are serialized on that user's lock, so a draw and
/// the hand update that settles it can never interleave with another request
/// for the same user.
pub struct GameService {
    config: GameConfig,
    catalog: Arc<Catalog>,
    states: Arc<dyn StateRepository>,
    statistics: Arc<dyn StatisticsStore>,
    history: Arc<HistoryLog>,
    rng: Mutex<Lcg64Xsh32>,
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl GameService {
    pub fn new(
        config: GameConfig,
        catalog: Arc<Catalog>,
        states: Arc<dyn StateRepository>,
        statistics: Arc<dyn StatisticsStore>,
        history: Arc<HistoryLog>,
    ) -> GameResult<Self> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => seeded_rng(seed),
            None => Lcg64Xsh32::from_entropy(),
        };
        Ok(GameService {
            config,
            catalog,
            states,
            statistics,
            history,
            rng: Mutex::new(rng),
            user_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Service backed by a fresh in-memory repository.
    pub fn in_memory(
        config: GameConfig,
        catalog: Arc<Catalog>,
        history: Arc<HistoryLog>,
    ) -> GameResult<Self> {
        let repository = Arc::new(InMemoryRepository::new());
        Self::new(config, catalog, repository.clone(), repository, history)
    }

    /// Load the catalog and history named by `config` and start with an empty
    /// in-memory repository.
    pub fn from_config(config: GameConfig) -> GameResult<Self> {
        config.validate()?;
        let catalog = Catalog::load(config.catalog_path.as_deref())?;
        let history = HistoryLog::open(config.history_log_file.as_deref())?;
        Self::in_memory(config, Arc::new(catalog), Arc::new(history))
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Flush the history file, if one is attached.
    pub fn shutdown(&self) {
        self.history.shutdown();
    }

    /// The lock serializing `user_id`'s operations. Once the registry grows
    /// past `USER_LOCK_PRUNE_AT`, locks nobody holds are dropped; a later
    /// request for such a user just gets a new one.
    fn user_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let mut locks = lock(&self.user_locks);
        if locks.len() >= USER_LOCK_PRUNE_AT {
            locks.retain(|_, user| Arc::strong_count(user) > 1);
        }
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut Lcg64Xsh32) -> T) -> T {
        f(&mut lock(&self.rng))
    }

    /// Bring a stored hand back to the configured size, persisting the change.
    fn fit_hand(&self, mut state: GameState) -> GameResult<GameState> {
        if hand::resize_hand(&mut state, self.config.hand_size) {
            self.states.update_state(&state)?;
        }
        Ok(state)
    }

    fn load_or_create(&self, user_id: UserId) -> GameResult<GameState> {
        match self.states.get_state(user_id)? {
            Some(state) => self.fit_hand(state),
            None => {
                let state = GameState::new(
                    user_id,
                    self.config.hand_size,
                    self.config.default_game_size,
                );
                let state = self.states.create_state(state)?;
                self.statistics.create_statistics(user_id)?;
                log::debug!("created game state for user {user_id}");
                Ok(state)
            }
        }
    }

    fn load_existing(&self, user_id: UserId) -> GameResult<GameState> {
        let state = self
            .states
            .get_state(user_id)?
            .ok_or_else(|| GameError::NotFound(format!("game state for user {user_id}")))?;
        self.fit_hand(state)
    }

    fn canonical_cards<'a>(
        &self,
        cards: impl IntoIterator<Item = &'a Card>,
    ) -> GameResult<Vec<Card>> {
        cards
            .into_iter()
            .map(|c| self.catalog.canonicalize(c))
            .collect()
    }

    pub fn get_or_create_state(&self, user_id: UserId) -> GameResult<GameState> {
        let user = self.user_lock(user_id);
        let _guard = lock(&user);
        self.load_or_create(user_id)
    }

    /// Draw for a question from the user's deck. The drawn cards stay in the
    /// deck as pending until the next hand update.
    pub fn draw_cards(&self, user_id: UserId, question_type: &str) -> GameResult<DrawCardsResponse> {
        let user = self.user_lock(user_id);
        let _guard = lock(&user);
        let (count, pick_count) = draw_counts_for(question_type);
        let mut state = self.load_or_create(user_id)?;

        let draw = self.with_rng(|rng| {
            let deck = if state.deck.is_empty() {
                log::info!(
                    "building deck for user {user_id} at game size {}",
                    state.game_size
                );
                build_deck(&self.catalog, state.game_size, rng)
            } else {
                std::mem::take(&mut state.deck)
            };
            draw_from_deck(&deck, count, rng)
        })?;
        state.deck = draw.deck;

        self.states.update_state(&state)?;
        self.statistics
            .increment_statistics(user_id, &StatisticsDelta::drawn(count))?;
        self.history.append(
            user_id,
            HistoryPayload::Draw {
                question_type: question_type.to_string(),
                cards: draw.drawn.clone(),
                pick_count,
            },
        );
        Ok(DrawCardsResponse {
            cards: draw.drawn,
            count,
            pick_count,
        })
    }

    /// Replace the whole hand and settle any pending draw against it.
    pub fn update_hand(&self, user_id: UserId, new_hand: &[Option<Card>]) -> GameResult<GameState> {
        if new_hand.len() != self.config.hand_size {
            return Err(GameError::validation(format!(
                "hand must have exactly {} positions, got {}",
                self.config.hand_size,
                new_hand.len()
            )));
        }
        let new_hand: Vec<Option<Card>> = new_hand
            .iter()
            .map(|slot| slot.as_ref().map(|c| self.catalog.canonicalize(c)).transpose())
            .collect::<GameResult<_>>()?;

        let user = self.user_lock(user_id);
        let _guard = lock(&user);
        let mut state = self.load_existing(user_id)?;
        state.deck = reconcile_pending(&state.hand, &new_hand, &state.deck);
        state.hand = new_hand;

        self.states.update_state(&state)?;
        self.history.append(
            user_id,
            HistoryPayload::UpdateHand {
                hand: state.hand.clone(),
            },
        );
        Ok(state)
    }

    /// Switch difficulty and rebuild the deck for it. Hand and discard pile
    /// are left alone.
    pub fn update_game_size(&self, user_id: UserId, game_size: u8) -> GameResult<GameState> {
        if !(3..=5).contains(&game_size) {
            return Err(GameError::validation(format!(
                "game size must be between 3 and 5, got {game_size}"
            )));
        }
        let user = self.user_lock(user_id);
        let _guard = lock(&user);
        let mut state = self.load_or_create(user_id)?;
        let old_size = state.game_size;
        state.deck = self.with_rng(|rng| build_deck(&self.catalog, game_size, rng));
        state.game_size = game_size;
        log::info!(
            "user {user_id}: game size {old_size} -> {game_size}, rebuilt deck of {} cards",
            state.deck.len()
        );

        self.states.update_state(&state)?;
        self.history.append(
            user_id,
            HistoryPayload::UpdateGameSize {
                old_size,
                new_size: game_size,
                deck_size: state.deck.len(),
            },
        );
        Ok(state)
    }

    pub fn play_card(
        &self,
        user_id: UserId,
        hand_position: usize,
        discards: &[usize],
    ) -> GameResult<PlayResult> {
        let user = self.user_lock(user_id);
        let _guard = lock(&user);
        let state = self.load_existing(user_id)?;

        let result = self.with_rng(|rng| {
            hand::play_card(state, &self.catalog, hand_position, discards, rng)
        })?;

        self.states.update_state(&result.state)?;
        let delta = StatisticsDelta {
            cards_drawn: result.drawn_cards.len() as u64,
            ..StatisticsDelta::played()
        };
        self.statistics.increment_statistics(user_id, &delta)?;
        self.history.append(
            user_id,
            HistoryPayload::PlayCard {
                card: result.played.clone(),
                hand_position,
                discard_positions: discards.to_vec(),
                drawn_cards: result.drawn_cards.clone(),
            },
        );
        Ok(result)
    }

    /// Manual placement of drawn cards that did not fit in the hand.
    pub fn place_pending_cards(
        &self,
        user_id: UserId,
        cards_to_place: &[Card],
        discard_positions: &[usize],
    ) -> GameResult<GameState> {
        let cards = self.canonical_cards(cards_to_place)?;
        let user = self.user_lock(user_id);
        let _guard = lock(&user);
        let mut state = self.load_existing(user_id)?;
        let placed = hand::place_pending_cards(&mut state, &cards, discard_positions)?;

        self.states.update_state(&state)?;
        self.history.append(
            user_id,
            HistoryPayload::PlacePendingCards {
                cards_placed: placed.len(),
                discard_positions: discard_positions.to_vec(),
            },
        );
        Ok(state)
    }

    /// Counters for a user, zeros when nothing was recorded yet.
    pub fn statistics(&self, user_id: UserId) -> GameResult<Statistics> {
        Ok(self
            .statistics
            .get_statistics(user_id)?
            .unwrap_or_default())
    }

    pub fn user_history(&self, user_id: UserId, query: &HistoryQuery) -> Vec<HistoryEntry> {
        self.history.for_user(user_id, query)
    }

    /// Archive the current state and counters into history, then start over.
    /// Returns the archive entry.
    pub fn reset_progress(&self, user_id: UserId) -> GameResult<HistoryEntry> {
        let user = self.user_lock(user_id);
        let _guard = lock(&user);
        let existing = self.states.get_state(user_id)?;
        let statistics = self.statistics.get_statistics(user_id)?;

        let archive = self.history.append(
            user_id,
            HistoryPayload::ResetArchive {
                game_state: existing.as_ref().map(GameStateSnapshot::from),
                statistics,
            },
        );

        match existing {
            Some(state) => {
                let fresh = GameState::new(user_id, self.config.hand_size, state.game_size);
                self.states.update_state(&fresh)?;
            }
            None => {
                self.states.create_state(GameState::new(
                    user_id,
                    self.config.hand_size,
                    self.config.default_game_size,
                ))?;
            }
        }
        self.statistics.reset_statistics(user_id)?;
        log::info!("user {user_id}: progress reset, archived as entry {}", archive.seq);
        Ok(archive)
    }

    /// Weighted sample with replacement that reads and writes no state.
    pub fn practice_draw(&self, game_size: u8, count: usize) -> GameResult<Vec<Card>> {
        if !(3..=5).contains(&game_size) {
            return Err(GameError::validation(format!(
                "game size must be between 3 and 5, got {game_size}"
            )));
        }
        self.with_rng(|rng| generate_random_cards(&self.catalog, count, game_size, rng))
    }
}
