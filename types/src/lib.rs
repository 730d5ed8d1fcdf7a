pub mod catalog;
pub use catalog::{Case, Catalog, CatalogIssue, Rarity, Skin};
pub mod config;
pub use config::{ConfigError, GameConfig};
pub mod player;
pub use player::{PlayerRecord, PlayerRecordError, LAST_PLAY_FORMAT};
pub mod promo;
pub use promo::{builtin_promo_codes, PromoEntry, PromoInvariantError};
pub mod rank;
pub use rank::{RankMetric, RankStanding, RankTable, RankTableError, RankTier};
