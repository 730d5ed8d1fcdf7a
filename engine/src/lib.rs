//! Game logic for clutch: match resolution, the inter-match cooldown,
//! promo-code redemption, and case openings over [`clutch_types`] records.
//!
//! Every entry point is a state transition over borrowed records plus a
//! caller-supplied [`rand::Rng`]. Persistence and transport live in the
//! bot crate; callers follow load, gate, resolve, save. Nothing here
//! performs I/O beyond tracing.

pub mod cases;
pub use cases::{CaseError, Opening};
pub mod cooldown;
pub use cooldown::Readiness;
pub mod matchplay;
pub use matchplay::{MatchOutcome, Team};
pub mod promo;
pub use promo::{PromoError, PromoLedger, Redemption};
