use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use clutch_types::{builtin_promo_codes, PromoEntry};
use thiserror::Error;
use tracing::warn;

/// Redemption failure, one variant per precondition in check order.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PromoError {
    /// Unknown code, or one past (or with an unparseable) expiry date.
    #[error("unknown promo code")]
    InvalidCode,
    #[error("code already redeemed by this user")]
    AlreadyUsed,
    #[error("activation limit reached (used={used}, max={max})")]
    LimitReached { used: u64, max: u64 },
}

/// Successful redemption summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redemption {
    pub points: u64,
    /// Activations left after this one.
    pub remaining: u64,
}

/// Process-wide promo registry: static definitions plus the usage counters
/// persisted under the ledger document's reserved key. Counters are global
/// across chats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromoLedger {
    codes: BTreeMap<String, PromoEntry>,
}

impl PromoLedger {
    pub fn builtin() -> Self {
        Self {
            codes: builtin_promo_codes(),
        }
    }

    pub fn from_codes(codes: BTreeMap<String, PromoEntry>) -> Self {
        Self { codes }
    }

    /// Merges extra definitions from the optional overlay file. A code that
    /// collides with an existing definition is dropped with a warning.
    pub fn extend(&mut self, extra: BTreeMap<String, PromoEntry>) {
        for (code, entry) in extra {
            match self.codes.entry(code) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
                Entry::Occupied(slot) => {
                    warn!(code = %slot.key(), "ignoring duplicate promo definition");
                }
            }
        }
    }

    /// Restores persisted usage counters for codes that still exist.
    /// Counters for retired codes are dropped. Corrupt counters are kept
    /// as stored but flagged, since redemption stays safe either way.
    pub fn absorb_usage(&mut self, saved: &BTreeMap<String, PromoEntry>) {
        for (code, entry) in &mut self.codes {
            if let Some(saved) = saved.get(code) {
                entry.used = saved.used;
                entry.used_by = saved.used_by.clone();
                if let Err(issue) = entry.validate_invariants() {
                    warn!(%code, %issue, "stored promo counters are inconsistent");
                }
            }
        }
    }

    /// Snapshot persisted alongside the chat ledgers.
    pub fn entries(&self) -> &BTreeMap<String, PromoEntry> {
        &self.codes
    }

    /// Redeems `code` for `user_id`. The precondition order is part of the
    /// contract: code validity first, then the per-user repeat check, then
    /// the global cap. An expired code is indistinguishable from an
    /// unknown one.
    pub fn redeem(
        &mut self,
        code: &str,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Redemption, PromoError> {
        let entry = self.codes.get_mut(code).ok_or(PromoError::InvalidCode)?;
        if !expiry_ok(entry.expires.as_deref(), today) {
            return Err(PromoError::InvalidCode);
        }
        if entry.used_by.iter().any(|user| user == user_id) {
            return Err(PromoError::AlreadyUsed);
        }
        if entry.used >= entry.max_uses {
            return Err(PromoError::LimitReached {
                used: entry.used,
                max: entry.max_uses,
            });
        }
        entry.used = entry.used.saturating_add(1);
        entry.used_by.push(user_id.to_string());
        Ok(Redemption {
            points: entry.points,
            remaining: entry.remaining(),
        })
    }
}

/// A code is live until the end of its expiry day. A date that fails to
/// parse disables the code.
fn expiry_ok(expires: Option<&str>, today: NaiveDate) -> bool {
    match expires {
        None => true,
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => today <= date,
            Err(_) => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn test_redeem_happy_path() {
        let mut ledger = PromoLedger::builtin();
        let redemption = ledger.redeem("CSGO2025", "111", today()).unwrap();
        assert_eq!(
            redemption,
            Redemption {
                points: 60,
                remaining: 1499
            }
        );
        let entry = &ledger.entries()["CSGO2025"];
        assert_eq!(entry.used, 1);
        assert_eq!(entry.used_by, vec!["111".to_string()]);
        assert_eq!(entry.validate_invariants(), Ok(()));
    }

    #[test]
    fn test_unknown_code() {
        let mut ledger = PromoLedger::builtin();
        assert_eq!(
            ledger.redeem("FREESTUFF", "111", today()),
            Err(PromoError::InvalidCode)
        );
    }

    #[test]
    fn test_second_redemption_is_rejected() {
        let mut ledger = PromoLedger::builtin();
        ledger.redeem("HEADSHOT", "111", today()).unwrap();
        assert_eq!(
            ledger.redeem("HEADSHOT", "111", today()),
            Err(PromoError::AlreadyUsed)
        );
        // The counter did not move.
        assert_eq!(ledger.entries()["HEADSHOT"].used, 1);
    }

    #[test]
    fn test_cap_is_global_across_users() {
        let mut ledger = PromoLedger::builtin();
        ledger.redeem("SASAPIDR", "111", today()).unwrap();
        assert_eq!(
            ledger.redeem("SASAPIDR", "222", today()),
            Err(PromoError::LimitReached { used: 1, max: 1 })
        );
    }

    #[test]
    fn test_repeat_check_wins_over_cap_check() {
        // The user who exhausted the cap sees the repeat error, not the
        // limit error.
        let mut ledger = PromoLedger::builtin();
        ledger.redeem("SASAPIDR", "111", today()).unwrap();
        assert_eq!(
            ledger.redeem("SASAPIDR", "111", today()),
            Err(PromoError::AlreadyUsed)
        );
    }

    #[test]
    fn test_expiry_gates_redemption() {
        let mut extra = BTreeMap::new();
        let mut entry = PromoEntry::new(25, 100);
        entry.expires = Some("2025-06-02".to_string());
        extra.insert("SUMMER".to_string(), entry);

        let mut ledger = PromoLedger::from_codes(extra);
        // Valid through the expiry day itself.
        assert!(ledger.redeem("SUMMER", "111", today()).is_ok());
        let expired = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        assert_eq!(
            ledger.redeem("SUMMER", "222", expired),
            Err(PromoError::InvalidCode)
        );
    }

    #[test]
    fn test_malformed_expiry_disables_code() {
        let mut extra = BTreeMap::new();
        let mut entry = PromoEntry::new(25, 100);
        entry.expires = Some("next tuesday".to_string());
        extra.insert("BROKEN".to_string(), entry);

        let mut ledger = PromoLedger::from_codes(extra);
        assert_eq!(
            ledger.redeem("BROKEN", "111", today()),
            Err(PromoError::InvalidCode)
        );
    }

    #[test]
    fn test_extend_never_overrides() {
        let mut ledger = PromoLedger::builtin();
        let mut extra = BTreeMap::new();
        extra.insert("CSGO2025".to_string(), PromoEntry::new(9999, 1));
        extra.insert("FRESH".to_string(), PromoEntry::new(10, 5));
        ledger.extend(extra);

        assert_eq!(ledger.entries()["CSGO2025"].points, 60);
        assert_eq!(ledger.entries()["FRESH"].points, 10);
    }

    #[test]
    fn test_absorb_usage_restores_counters_and_drops_retired() {
        let mut saved = BTreeMap::new();
        let mut used = PromoEntry::new(60, 1500);
        used.used = 2;
        used.used_by = vec!["1".to_string(), "2".to_string()];
        saved.insert("CSGO2025".to_string(), used);
        saved.insert("RETIRED".to_string(), PromoEntry::new(1, 1));

        let mut ledger = PromoLedger::builtin();
        ledger.absorb_usage(&saved);

        assert_eq!(ledger.entries()["CSGO2025"].used, 2);
        assert_eq!(
            ledger.redeem("CSGO2025", "1", today()),
            Err(PromoError::AlreadyUsed)
        );
        assert!(!ledger.entries().contains_key("RETIRED"));
    }

    #[test]
    fn test_absorb_keeps_corrupt_counters_redeemable_safely() {
        // A hand-edited file can desync the counter from the redeemer
        // list. The stored numbers win and the cap check still holds.
        let mut saved = BTreeMap::new();
        let mut corrupt = PromoEntry::new(520, 1);
        corrupt.used = 4;
        corrupt.used_by = vec!["1".to_string()];
        saved.insert("SASAPIDR".to_string(), corrupt);

        let mut ledger = PromoLedger::builtin();
        ledger.absorb_usage(&saved);

        assert_eq!(ledger.entries()["SASAPIDR"].used, 4);
        assert_eq!(
            ledger.redeem("SASAPIDR", "2", today()),
            Err(PromoError::LimitReached { used: 4, max: 1 })
        );
    }
}
