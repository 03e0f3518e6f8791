//! Game configuration
//!
//! All tuning parameters are construction-time values; there are no runtime
//! flags. Defaults match the reference tuning of the game (182 BPM, 8 slots).

use std::time::Duration;

use crate::{Error, Result};

/// Default tempo in beats per minute
pub const DEFAULT_BPM: f64 = 182.0;

/// Default number of prompt slots per round
pub const DEFAULT_SLOT_COUNT: usize = 8;

/// Default number of rounds per game
pub const DEFAULT_TOTAL_ROUNDS: u32 = 4;

/// Beats counted down before the first round starts
pub const PRE_GAME_COUNTDOWN: u32 = 16;

/// Beats counted down between rounds
pub const INTERMISSION_COUNTDOWN: u32 = 8;

/// Construction-time game parameters
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Tempo in beats per minute
    pub bpm: f64,

    /// Number of prompt slots per round
    pub slot_count: usize,

    /// Number of rounds per game
    pub total_rounds: u32,

    /// Beats counted down before the first round
    pub pre_game_countdown: u32,

    /// Beats counted down between rounds
    pub intermission_countdown: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            slot_count: DEFAULT_SLOT_COUNT,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            pre_game_countdown: PRE_GAME_COUNTDOWN,
            intermission_countdown: INTERMISSION_COUNTDOWN,
        }
    }
}

impl GameConfig {
    /// Duration of one beat (`60000 / BPM` milliseconds)
    #[must_use]
    pub fn beat_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.bpm)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any parameter is zero or the tempo is not a positive
    /// finite number
    pub fn validate(&self) -> Result<()> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(Error::Config(format!("invalid tempo: {} BPM", self.bpm)));
        }
        if self.slot_count == 0 {
            return Err(Error::Config("slot_count must be at least 1".to_string()));
        }
        if self.total_rounds == 0 {
            return Err(Error::Config("total_rounds must be at least 1".to_string()));
        }
        if self.pre_game_countdown == 0 || self.intermission_countdown == 0 {
            return Err(Error::Config(
                "countdown lengths must be at least 1 beat".to_string(),
            ));
        }
        Ok(())
    }
}
