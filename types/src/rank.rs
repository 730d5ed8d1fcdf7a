use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::PlayerRecord;

/// Progression metric the ladder is resolved against. The two historical
/// deployments disagreed (one counted wins, the other points), so both are
/// supported and picked by configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMetric {
    #[default]
    Wins,
    Points,
}

impl RankMetric {
    pub fn progress(&self, record: &PlayerRecord) -> u64 {
        match self {
            RankMetric::Wins => record.wins,
            RankMetric::Points => record.points,
        }
    }
}

/// One rung of the ladder: the rank is held from `threshold` progress
/// until the next tier's threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTier {
    pub threshold: u64,
    pub name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankTableError {
    #[error("rank table is empty")]
    Empty,
    #[error("base tier must start at zero (got={got})")]
    BaseNotZero { got: u64 },
    #[error("thresholds not strictly increasing at {name:?} (prev={prev}, next={next})")]
    NotIncreasing { name: String, prev: u64, next: u64 },
}

/// Resolved position on the ladder. `to_next` is zero at the top tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankStanding<'a> {
    pub rank: &'a str,
    pub to_next: u64,
}

/// Ascending rank ladder keyed by progress thresholds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankTable {
    tiers: Vec<RankTier>,
}

impl RankTable {
    pub fn new(tiers: Vec<RankTier>) -> Result<Self, RankTableError> {
        let first = tiers.first().ok_or(RankTableError::Empty)?;
        if first.threshold != 0 {
            return Err(RankTableError::BaseNotZero {
                got: first.threshold,
            });
        }
        for pair in tiers.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(RankTableError::NotIncreasing {
                    name: pair[1].name.clone(),
                    prev: pair[0].threshold,
                    next: pair[1].threshold,
                });
            }
        }
        Ok(Self { tiers })
    }

    /// The canonical 26-tier ladder, Silver 1 through Challenger.
    pub fn builtin() -> Self {
        let tiers = [
            (0, "Silver 1"),
            (5, "Silver 2"),
            (15, "Silver 3"),
            (25, "Silver 4"),
            (35, "Gold Nova 1"),
            (45, "Gold Nova 2"),
            (60, "Gold Nova 3"),
            (75, "Gold Nova 4"),
            (90, "Master Guardian 1"),
            (110, "Master Guardian 2"),
            (130, "DMG"),
            (150, "LE"),
            (180, "LEM"),
            (210, "Supreme"),
            (230, "Global Elite"),
            (260, "Faceit 1"),
            (290, "Faceit 2"),
            (310, "Faceit 3"),
            (350, "Faceit 4"),
            (400, "Faceit 5"),
            (450, "Faceit 6"),
            (500, "Faceit 7"),
            (600, "Faceit 8"),
            (800, "Faceit 9"),
            (1000, "Faceit 10"),
            (2500, "Challenger 💎"),
        ]
        .into_iter()
        .map(|(threshold, name)| RankTier {
            threshold,
            name: name.to_string(),
        })
        .collect();
        // The static ladder satisfies the constructor's invariants.
        Self { tiers }
    }

    pub fn tiers(&self) -> &[RankTier] {
        &self.tiers
    }

    /// Maps `progress` to the rank held at that level and the distance to
    /// the next tier.
    pub fn resolve(&self, progress: u64) -> RankStanding<'_> {
        for pair in self.tiers.windows(2) {
            if progress < pair[1].threshold {
                return RankStanding {
                    rank: &pair[0].name,
                    to_next: pair[1].threshold - progress,
                };
            }
        }
        // Past the last threshold there is nothing left to climb.
        let top = &self.tiers[self.tiers.len() - 1];
        RankStanding {
            rank: &top.name,
            to_next: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base_rank() {
        let table = RankTable::builtin();
        let standing = table.resolve(0);
        assert_eq!(standing.rank, "Silver 1");
        assert_eq!(standing.to_next, 5);
    }

    #[test]
    fn test_boundaries_promote_exactly_on_threshold() {
        let table = RankTable::builtin();
        assert_eq!(table.resolve(4).rank, "Silver 1");
        assert_eq!(table.resolve(5).rank, "Silver 2");
        assert_eq!(table.resolve(5).to_next, 10);
        assert_eq!(table.resolve(14).rank, "Silver 2");
        assert_eq!(table.resolve(15).rank, "Silver 3");
    }

    #[test]
    fn test_top_tier_has_no_next() {
        let table = RankTable::builtin();
        let standing = table.resolve(2500);
        assert_eq!(standing.rank, "Challenger 💎");
        assert_eq!(standing.to_next, 0);
        assert_eq!(table.resolve(1_000_000).to_next, 0);
    }

    #[test]
    fn test_mid_ladder_distance() {
        let table = RankTable::builtin();
        let standing = table.resolve(97);
        assert_eq!(standing.rank, "Master Guardian 1");
        assert_eq!(standing.to_next, 13);
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert_eq!(RankTable::new(vec![]), Err(RankTableError::Empty));
        let shifted = vec![RankTier {
            threshold: 5,
            name: "Silver 1".to_string(),
        }];
        assert_eq!(
            RankTable::new(shifted),
            Err(RankTableError::BaseNotZero { got: 5 })
        );
        let doubled = vec![
            RankTier {
                threshold: 0,
                name: "Silver 1".to_string(),
            },
            RankTier {
                threshold: 0,
                name: "Silver 2".to_string(),
            },
        ];
        assert!(matches!(
            RankTable::new(doubled),
            Err(RankTableError::NotIncreasing { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_resolved_rank_brackets_progress(progress in 0u64..5000) {
            let table = RankTable::builtin();
            let standing = table.resolve(progress);
            let tier = table
                .tiers()
                .iter()
                .find(|tier| tier.name == standing.rank)
                .unwrap();
            // Held tier never lies above the progress that earned it.
            prop_assert!(tier.threshold <= progress);
            if standing.to_next > 0 {
                let next = progress + standing.to_next;
                prop_assert!(table.tiers().iter().any(|tier| tier.threshold == next));
            }
        }
    }
}
