use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timestamp layout used for `last_play`: ISO-8601 with microsecond
/// precision, e.g. `2025-05-28T20:24:09.000123`.
pub const LAST_PLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerRecordError {
    #[error("unparseable last_play timestamp: {raw:?}")]
    BadTimestamp { raw: String },
}

/// Per-chat player state. Created on a player's first action in a chat and
/// never deleted afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Spendable balance. Deductions clamp at zero instead of going
    /// negative.
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub wins: u64,
    /// Raw timestamp of the last resolved match. Kept as the stored string
    /// and parsed per use, so one bad value degrades only that player's
    /// cooldown handling.
    #[serde(default)]
    pub last_play: Option<String>,
    /// Display-name cache for the leaderboard, refreshed on every match
    /// action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl PlayerRecord {
    /// Parses `last_play`, distinguishing "never played" from a stored
    /// value that no longer parses.
    pub fn last_play_at(&self) -> Result<Option<NaiveDateTime>, PlayerRecordError> {
        match &self.last_play {
            None => Ok(None),
            Some(raw) => raw
                .parse::<NaiveDateTime>()
                .map(Some)
                .map_err(|_| PlayerRecordError::BadTimestamp { raw: raw.clone() }),
        }
    }

    /// Stamps `last_play` with the given instant.
    pub fn record_play(&mut self, at: NaiveDateTime) {
        self.last_play = Some(at.format(LAST_PLAY_FORMAT).to_string());
    }
}
