//! Game Configuration
//!
//! Every tunable constant of a game lives here. Grid size is the crate
//! constant [`GRID_SIZE`](crate::GRID_SIZE) because board storage is sized by it.

use std::time::Duration;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::{GRID_SIZE, MAX_EXP, TICK_RATE, WINNING_EXP};

/// Configuration rejected by [`GameConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Winning exponent must be reachable and storable.
    #[error("winning exponent {0} outside 2..={max}", max = MAX_EXP)]
    WinningExp(u8),

    /// Spawn probability is a percentage.
    #[error("spawn percent {0} exceeds 100")]
    SpawnPercent(u8),

    /// Spawned tiles must be non-empty and below the win threshold.
    #[error("spawn exponents {low}/{high} invalid for winning exponent {winning}")]
    SpawnExp {
        /// Common spawn exponent
        low: u8,
        /// Rare spawn exponent
        high: u8,
        /// Configured winning exponent
        winning: u8,
    },

    /// More starting tiles than cells.
    #[error("{0} starting tiles do not fit on the grid")]
    StartingTiles(u8),

    /// The animation clock needs a positive rate.
    #[error("tick rate must be positive")]
    TickRate,

    /// Malformed JSON.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which tile a spawn places, and how often.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Exponent placed most of the time (1 = tile "2")
    pub low_exp: u8,
    /// Exponent placed `high_percent` of the time (2 = tile "4")
    pub high_exp: u8,
    /// Chance of `high_exp`, in percent
    pub high_percent: u8,
}

impl Default for SpawnRule {
    fn default() -> Self {
        Self {
            low_exp: 1,
            high_exp: 2,
            high_percent: 10,
        }
    }
}

/// Configuration for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Exponent whose first appearance wins the game (11 = tile "2048")
    pub winning_exp: u8,
    /// Spawn distribution
    pub spawn: SpawnRule,
    /// Tiles placed by a new game
    pub starting_tiles: u8,
    /// Animation clock rate (Hz)
    pub tick_rate_hz: u32,
    /// Ticks to wait before a spawn, for legibility
    pub spawn_delay_ticks: u32,
    /// Frames of "just merged" emphasis after a merge commits
    pub reward_ticks: u8,
    /// Idle time after which the shell may put the game to sleep
    pub inactivity_timeout_ms: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            winning_exp: WINNING_EXP,
            spawn: SpawnRule::default(),
            starting_tiles: 2,
            tick_rate_hz: TICK_RATE,
            spawn_delay_ticks: 3,
            reward_ticks: 12,
            inactivity_timeout_ms: None,
        }
    }
}

impl GameConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against what the engine can represent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.winning_exp < 2 || self.winning_exp > MAX_EXP {
            return Err(ConfigError::WinningExp(self.winning_exp));
        }
        if self.spawn.high_percent > 100 {
            return Err(ConfigError::SpawnPercent(self.spawn.high_percent));
        }
        let spawn_ok = |exp: u8| exp >= 1 && exp < self.winning_exp;
        if !spawn_ok(self.spawn.low_exp) || !spawn_ok(self.spawn.high_exp) {
            return Err(ConfigError::SpawnExp {
                low: self.spawn.low_exp,
                high: self.spawn.high_exp,
                winning: self.winning_exp,
            });
        }
        if usize::from(self.starting_tiles) > GRID_SIZE * GRID_SIZE {
            return Err(ConfigError::StartingTiles(self.starting_tiles));
        }
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::TickRate);
        }
        Ok(())
    }

    /// Wall-clock length of one animation tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }

    /// Tick length in whole milliseconds, rounded up (what `advance` expects).
    pub fn tick_interval_ms(&self) -> u32 {
        1000u32.div_ceil(self.tick_rate_hz.max(1))
    }
}
