//! Persistence seams for game states and statistics, keyed by user id.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{GameError, GameResult};
use crate::game::types::{GameState, UserId};
use crate::history::types::{Statistics, StatisticsDelta};
use crate::lock;

pub trait StateRepository: Send + Sync {
    fn get_state(&self, user_id: UserId) -> GameResult<Option<GameState>>;
    /// Fails if the user already has a state.
    fn create_state(&self, state: GameState) -> GameResult<GameState>;
    /// Fails with `NotFound` if the user has no state yet.
    fn update_state(&self, state: &GameState) -> GameResult<()>;
}

pub trait StatisticsStore: Send + Sync {
    fn get_statistics(&self, user_id: UserId) -> GameResult<Option<Statistics>>;
    fn create_statistics(&self, user_id: UserId) -> GameResult<Statistics>;
    /// Adds `delta`, creating zeroed counters first when the user has none.
    fn increment_statistics(
        &self,
        user_id: UserId,
        delta: &StatisticsDelta,
    ) -> GameResult<Statistics>;
    fn reset_statistics(&self, user_id: UserId) -> GameResult<Statistics>;
}

/// Keeps everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    states: Mutex<HashMap<UserId, GameState>>,
    statistics: Mutex<HashMap<UserId, Statistics>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateRepository for InMemoryRepository {
    fn get_state(&self, user_id: UserId) -> GameResult<Option<GameState>> {
        Ok(lock(&self.states).get(&user_id).cloned())
    }

    fn create_state(&self, state: GameState) -> GameResult<GameState> {
        let mut states = lock(&self.states);
        if states.contains_key(&state.user_id) {
            return Err(GameError::Internal(format!(
                "game state for user {} already exists",
                state.user_id
            )));
        }
        states.insert(state.user_id, state.clone());
        Ok(state)
    }

    fn update_state(&self, state: &GameState) -> GameResult<()> {
        match lock(&self.states).get_mut(&state.user_id) {
            Some(stored) => {
                *stored = state.clone();
                Ok(())
            }
            None => Err(GameError::NotFound(format!(
                "game state for user {}",
                state.user_id
            ))),
        }
    }
}

impl StatisticsStore for InMemoryRepository {
    fn get_statistics(&self, user_id: UserId) -> GameResult<Option<Statistics>> {
        Ok(lock(&self.statistics).get(&user_id).cloned())
    }

    fn create_statistics(&self, user_id: UserId) -> GameResult<Statistics> {
        Ok(lock(&self.statistics)
            .entry(user_id)
            .or_default()
            .clone())
    }

    fn increment_statistics(
        &self,
        user_id: UserId,
        delta: &StatisticsDelta,
    ) -> GameResult<Statistics> {
        let mut statistics = lock(&self.statistics);
        let entry = statistics.entry(user_id).or_default();
        entry.apply(delta);
        Ok(entry.clone())
    }

    fn reset_statistics(&self, user_id: UserId) -> GameResult<Statistics> {
        let zeroed = Statistics::default();
        lock(&self.statistics).insert(user_id, zeroed.clone());
        Ok(zeroed)
    }
}
