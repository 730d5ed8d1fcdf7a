use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

use crate::rank::RankMetric;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("outcome weights sum to zero")]
    ZeroWeights,
    #[error("win points range is inverted (min={min}, max={max})")]
    BadWinRange { min: u64, max: u64 },
    #[error("loss points range is inverted (min={min}, max={max})")]
    BadLossRange { min: u64, max: u64 },
    #[error("point deltas must be at least 1")]
    ZeroDelta,
    #[error("top_size must be at least 1")]
    ZeroTop,
}

/// Tunable rules of the progression engine. The defaults reproduce the
/// canonical deployment; the alternate one ships as a preset file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Relative weights of the three match outcomes.
    pub win_weight: u32,
    pub lose_weight: u32,
    pub draw_weight: u32,
    /// Inclusive range of points credited on a win.
    pub win_points_min: u64,
    pub win_points_max: u64,
    /// Inclusive range of points deducted on a loss.
    pub loss_points_min: u64,
    pub loss_points_max: u64,
    /// Hours a player waits between matches in one chat.
    pub cooldown_hours: u64,
    pub rank_metric: RankMetric,
    /// Rows shown on the leaderboard.
    pub top_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            win_weight: 60,
            lose_weight: 35,
            draw_weight: 5,
            win_points_min: 1,
            win_points_max: 15,
            loss_points_min: 1,
            loss_points_max: 10,
            cooldown_hours: 10,
            rank_metric: RankMetric::Wins,
            top_size: 10,
        }
    }
}

impl GameConfig {
    pub fn total_weight(&self) -> u32 {
        self.win_weight + self.lose_weight + self.draw_weight
    }

    pub fn cooldown(&self) -> Duration {
        Duration::hours(self.cooldown_hours as i64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_weight() == 0 {
            return Err(ConfigError::ZeroWeights);
        }
        if self.win_points_min > self.win_points_max {
            return Err(ConfigError::BadWinRange {
                min: self.win_points_min,
                max: self.win_points_max,
            });
        }
        if self.loss_points_min > self.loss_points_max {
            return Err(ConfigError::BadLossRange {
                min: self.loss_points_min,
                max: self.loss_points_max,
            });
        }
        if self.win_points_min == 0 || self.loss_points_min == 0 {
            return Err(ConfigError::ZeroDelta);
        }
        if self.top_size == 0 {
            return Err(ConfigError::ZeroTop);
        }
        Ok(())
    }
}
