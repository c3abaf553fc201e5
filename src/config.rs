//! Startup configuration for the game service.

use std::path::PathBuf;

use rocket::figment::providers::Serialized;
use rocket::figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

pub const DEFAULT_HAND_SIZE: usize = 5;
pub const DEFAULT_GAME_SIZE: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of slots in every hand.
    pub hand_size: usize,
    /// Difficulty assigned to newly created game states.
    pub default_game_size: u8,
    /// Catalog JSON file; the bundled catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// JSON-lines file the history log is restored from and appended to.
    pub history_log_file: Option<PathBuf>,
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            hand_size: DEFAULT_HAND_SIZE,
            default_game_size: DEFAULT_GAME_SIZE,
            catalog_path: None,
            history_log_file: None,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Read `HAND_SIZE`, `DEFAULT_GAME_SIZE`, `CARD_CATALOG`, `HISTORY_LOG_FILE`
    /// and `GAME_RNG_SEED` from the environment. Unparsable numbers fall back to
    /// the defaults.
    pub fn from_env() -> Self {
        let mut config = GameConfig::default();
        if let Some(size) = env_parse::<usize>("HAND_SIZE") {
            config.hand_size = size;
        }
        if let Some(size) = env_parse::<u8>("DEFAULT_GAME_SIZE") {
            config.default_game_size = size;
        }
        if let Ok(path) = std::env::var("CARD_CATALOG") {
            config.catalog_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("HISTORY_LOG_FILE") {
            config.history_log_file = Some(PathBuf::from(path));
        }
        config.rng_seed = env_parse::<u64>("GAME_RNG_SEED");
        config
    }

    /// Environment values, overridden field by field by a `game` table in
    /// Rocket's figment (`Rocket.toml` or `ROCKET_GAME=...`).
    pub fn from_figment(figment: &Figment) -> Self {
        Self::from_env().with_overrides(figment)
    }

    /// Layer the figment's `game` table over `self`. Fields the table leaves
    /// out keep their current value.
    pub fn with_overrides(self, figment: &Figment) -> Self {
        let layered = Figment::from(Serialized::defaults(&self))
            .merge(figment.focus("game"))
            .select(figment.profile().clone());
        match layered.extract::<GameConfig>() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring invalid [game] configuration: {e}");
                self
            }
        }
    }

    pub fn validate(&self) -> GameResult<()> {
        if self.hand_size == 0 {
            return Err(GameError::validation("hand_size must be at least 1"));
        }
        if !(3..=5).contains(&self.default_game_size) {
            return Err(GameError::validation(
                "default_game_size must be between 3 and 5",
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let zero_hand = GameConfig {
            hand_size: 0,
            ..GameConfig::default()
        };
        assert!(zero_hand.validate().is_err());

        let bad_size = GameConfig {
            default_game_size: 6,
            ..GameConfig::default()
        };
        assert!(bad_size.validate().is_err());
    }

    #[test]
    fn figment_game_table_overrides_defaults() {
        let figment = Figment::new().merge(("game", GameConfig {
            hand_size: 4,
            default_game_size: 3,
            ..GameConfig::default()
        }));
        let config = GameConfig::default().with_overrides(&figment);
        assert_eq!(config.hand_size, 4);
        assert_eq!(config.default_game_size, 3);
    }

    #[test]
    fn partial_game_table_keeps_other_values() {
        let base = GameConfig {
            default_game_size: 3,
            rng_seed: Some(99),
            history_log_file: Some(PathBuf::from("history.jsonl")),
            ..GameConfig::default()
        };
        let figment = Figment::new().merge(("game.hand_size", 4));
        let config = base.with_overrides(&figment);
        assert_eq!(config.hand_size, 4);
        assert_eq!(config.default_game_size, 3);
        assert_eq!(config.rng_seed, Some(99));
        assert_eq!(
            config.history_log_file,
            Some(PathBuf::from("history.jsonl"))
        );
    }

    #[test]
    fn missing_game_table_keeps_base() {
        let base = GameConfig {
            hand_size: 6,
            rng_seed: Some(1),
            ..GameConfig::default()
        };
        assert_eq!(base.clone().with_overrides(&Figment::new()), base);
    }

    #[test]
    fn invalid_game_table_is_ignored() {
        let base = GameConfig {
            rng_seed: Some(3),
            ..GameConfig::default()
        };
        let figment = Figment::new().merge(("game.hand_size", "many"));
        assert_eq!(base.clone().with_overrides(&figment), base);
    }
}
