use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromoInvariantError {
    #[error("use counter disagrees with the redeemer list (used={used}, tracked={tracked})")]
    CountMismatch { used: u64, tracked: u64 },
    #[error("use counter exceeds the activation cap (used={used}, max={max})")]
    OverCap { used: u64, max: u64 },
    #[error("user {user:?} appears twice in the redeemer list")]
    DuplicateUser { user: String },
}

/// One promo code: the static reward definition plus the usage counters
/// that persist across restarts. The serialized shape doubles as the
/// stored form under the ledger's reserved key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoEntry {
    /// Points credited on redemption.
    pub points: u64,
    /// Global activation cap across all chats.
    pub max_uses: u64,
    #[serde(default)]
    pub used: u64,
    /// User ids that redeemed the code, in redemption order.
    #[serde(default)]
    pub used_by: Vec<String>,
    /// Optional `YYYY-MM-DD` expiry. Kept as the raw string; a value that
    /// fails to parse makes the code invalid rather than eternal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

impl PromoEntry {
    pub fn new(points: u64, max_uses: u64) -> Self {
        Self {
            points,
            max_uses,
            used: 0,
            used_by: Vec::new(),
            expires: None,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.max_uses.saturating_sub(self.used)
    }

    pub fn validate_invariants(&self) -> Result<(), PromoInvariantError> {
        if self.used != self.used_by.len() as u64 {
            return Err(PromoInvariantError::CountMismatch {
                used: self.used,
                tracked: self.used_by.len() as u64,
            });
        }
        if self.used > self.max_uses {
            return Err(PromoInvariantError::OverCap {
                used: self.used,
                max: self.max_uses,
            });
        }
        let mut seen = BTreeSet::new();
        for user in &self.used_by {
            if !seen.insert(user) {
                return Err(PromoInvariantError::DuplicateUser { user: user.clone() });
            }
        }
        Ok(())
    }
}

/// The codes shipped with the bot.
pub fn builtin_promo_codes() -> BTreeMap<String, PromoEntry> {
    [
        ("CSGO2025", 60, 1500),
        ("HEADSHOT", 55, 350),
        ("SASAPIDR", 520, 1),
        ("HENDAYGOVNO", 500, 10),
        ("TURKFUNK", 500, 10),
    ]
    .into_iter()
    .map(|(code, points, max_uses)| (code.to_string(), PromoEntry::new(points, max_uses)))
    .collect()
}
