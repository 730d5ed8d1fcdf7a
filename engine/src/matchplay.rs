use chrono::NaiveDateTime;
use clutch_types::{GameConfig, PlayerRecord};
use rand::Rng;

/// Side picked for a match. Only the flavor text differs between the two;
/// odds and deltas are identical.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Team {
    Terrorists,
    CounterTerrorists,
}

/// Resolved match result carrying the rolled point delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// `gained` was credited and the win counter advanced.
    Win { gained: u64 },
    /// `lost` is the rolled penalty. The balance clamps at zero, so the
    /// applied deduction may be smaller than the roll.
    Loss { lost: u64 },
    Draw,
}

/// Resolves one match for `player`: draws win/lose/draw by the configured
/// weights, applies the point delta, and stamps `last_play` with `now`.
/// The draw leaves counters untouched but still consumes the attempt.
/// Cooldown enforcement is the caller's job (see [`crate::cooldown`]).
pub fn resolve<R: Rng>(
    player: &mut PlayerRecord,
    config: &GameConfig,
    now: NaiveDateTime,
    rng: &mut R,
) -> MatchOutcome {
    let roll = rng.gen_range(0..config.total_weight());
    let outcome = if roll < config.win_weight {
        let gained = rng.gen_range(config.win_points_min..=config.win_points_max);
        player.wins = player.wins.saturating_add(1);
        player.points = player.points.saturating_add(gained);
        MatchOutcome::Win { gained }
    } else if roll < config.win_weight + config.lose_weight {
        let lost = rng.gen_range(config.loss_points_min..=config.loss_points_max);
        player.points = player.points.saturating_sub(lost);
        MatchOutcome::Loss { lost }
    } else {
        MatchOutcome::Draw
    };
    player.record_play(now);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap()
    }

    fn forced(win: u32, lose: u32, draw: u32) -> GameConfig {
        GameConfig {
            win_weight: win,
            lose_weight: lose,
            draw_weight: draw,
            ..Default::default()
        }
    }

    #[test]
    fn test_win_credits_points_and_advances_counter() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut player = PlayerRecord::default();
        let outcome = resolve(&mut player, &forced(1, 0, 0), now(), &mut rng);

        let MatchOutcome::Win { gained } = outcome else {
            panic!("expected a win, got {outcome:?}");
        };
        assert!((1..=15).contains(&gained));
        assert_eq!(player.points, gained);
        assert_eq!(player.wins, 1);
        assert_eq!(player.last_play_at(), Ok(Some(now())));
    }

    #[test]
    fn test_loss_reports_nominal_delta_but_floors_balance() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = GameConfig {
            loss_points_min: 10,
            loss_points_max: 10,
            ..forced(0, 1, 0)
        };
        let mut player = PlayerRecord {
            points: 3,
            ..Default::default()
        };
        let outcome = resolve(&mut player, &config, now(), &mut rng);

        assert_eq!(outcome, MatchOutcome::Loss { lost: 10 });
        assert_eq!(player.points, 0);
        assert_eq!(player.wins, 0);
    }

    #[test]
    fn test_draw_only_consumes_the_attempt() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut player = PlayerRecord {
            points: 77,
            wins: 9,
            ..Default::default()
        };
        let outcome = resolve(&mut player, &forced(0, 0, 1), now(), &mut rng);

        assert_eq!(outcome, MatchOutcome::Draw);
        assert_eq!(player.points, 77);
        assert_eq!(player.wins, 9);
        assert_eq!(player.last_play_at(), Ok(Some(now())));
    }

    #[test]
    fn test_outcome_distribution_matches_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = GameConfig::default();
        let mut player = PlayerRecord::default();
        let (mut wins, mut draws) = (0u32, 0u32);
        const ROUNDS: u32 = 100_000;

        for _ in 0..ROUNDS {
            match resolve(&mut player, &config, now(), &mut rng) {
                MatchOutcome::Win { .. } => wins += 1,
                MatchOutcome::Draw => draws += 1,
                MatchOutcome::Loss { .. } => {}
            }
        }

        let win_rate = f64::from(wins) / f64::from(ROUNDS);
        let draw_rate = f64::from(draws) / f64::from(ROUNDS);
        assert!(
            (0.59..=0.61).contains(&win_rate),
            "win rate drifted: {win_rate}"
        );
        assert!(
            (0.04..=0.06).contains(&draw_rate),
            "draw rate drifted: {draw_rate}"
        );
    }

    proptest! {
        #[test]
        fn prop_loss_never_underflows(balance in 0u64..10_000, penalty in 1u64..1_000) {
            let mut rng = StdRng::seed_from_u64(7);
            let config = GameConfig {
                loss_points_min: penalty,
                loss_points_max: penalty,
                ..forced(0, 1, 0)
            };
            let mut player = PlayerRecord { points: balance, ..Default::default() };
            let outcome = resolve(&mut player, &config, now(), &mut rng);

            prop_assert_eq!(outcome, MatchOutcome::Loss { lost: penalty });
            prop_assert_eq!(player.points, balance.saturating_sub(penalty));
        }
    }
}
