use clutch_types::{Case, Catalog, PlayerRecord, Skin};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CaseError {
    #[error("unknown case id")]
    UnknownCase,
    #[error("player has no history in this chat")]
    NoHistory,
    #[error("insufficient points (need {needed}, have {have})")]
    InsufficientPoints { needed: u64, have: u64 },
    #[error("case pool resolved to no known skins")]
    EmptyPool,
}

/// One drawn skin, borrowed from the catalog.
#[derive(Clone, Copy, Debug)]
pub struct Opening<'a> {
    pub name: &'a str,
    pub skin: &'a Skin,
}

/// Shared validation for the preview and confirm steps: the case must
/// exist, the player must already have a record in the chat, and the
/// balance must cover the price. The confirm step re-runs this because the
/// balance may have moved since the preview was shown.
pub fn validate<'a>(
    catalog: &'a Catalog,
    case_id: &str,
    player: Option<&PlayerRecord>,
) -> Result<&'a Case, CaseError> {
    let case = catalog.case(case_id).ok_or(CaseError::UnknownCase)?;
    let player = player.ok_or(CaseError::NoHistory)?;
    if player.points < case.price {
        return Err(CaseError::InsufficientPoints {
            needed: case.price,
            have: player.points,
        });
    }
    Ok(case)
}

/// Debits the case price. Callers persist between this and [`draw`] so the
/// stake is durable before any reward is rolled.
pub fn charge(player: &mut PlayerRecord, case: &Case) -> Result<(), CaseError> {
    player.points = player
        .points
        .checked_sub(case.price)
        .ok_or(CaseError::InsufficientPoints {
            needed: case.price,
            have: player.points,
        })?;
    Ok(())
}

/// Draws one skin from the case, weighted by rarity. References the
/// catalog cannot resolve are skipped with a warning; a pool with nothing
/// left is a configuration error surfaced to the caller.
pub fn draw<'a, R: Rng>(
    catalog: &'a Catalog,
    case: &Case,
    rng: &mut R,
) -> Result<Opening<'a>, CaseError> {
    let mut pool: Vec<(&str, &Skin)> = Vec::with_capacity(case.contains.len());
    for name in &case.contains {
        match catalog.skins.get_key_value(name) {
            Some((name, skin)) => pool.push((name.as_str(), skin)),
            None => warn!(case = %case.id, skin = %name, "case references unknown skin"),
        }
    }
    let &(name, skin) = pool
        .choose_weighted(rng, |(_, skin)| skin.rarity.weight())
        .map_err(|_| CaseError::EmptyPool)?;
    Ok(Opening { name, skin })
}

/// Credits a drawn skin's resale value.
pub fn award(player: &mut PlayerRecord, skin: &Skin) {
    player.points = player.points.saturating_add(skin.price);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clutch_types::Rarity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn skin(rarity: Rarity, price: u64) -> Skin {
        Skin {
            rarity,
            price,
            image: "https://example.com/skin.png".to_string(),
        }
    }

    fn small_catalog() -> Catalog {
        let mut skins = BTreeMap::new();
        skins.insert("Дешёвый".to_string(), skin(Rarity::Common, 10));
        skins.insert("Дорогой".to_string(), skin(Rarity::Legendary, 400));
        let cases = vec![Case {
            id: "test_case".to_string(),
            name: "Тестовый кейс".to_string(),
            price: 100,
            image: "https://example.com/case.png".to_string(),
            contains: vec![
                "Дешёвый".to_string(),
                "Дорогой".to_string(),
                "Призрак".to_string(),
            ],
        }];
        Catalog { skins, cases }
    }

    fn player_with(points: u64) -> PlayerRecord {
        PlayerRecord {
            points,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_checks_in_order() {
        let catalog = small_catalog();
        assert_eq!(
            validate(&catalog, "ghost_case", None),
            Err(CaseError::UnknownCase)
        );
        assert_eq!(
            validate(&catalog, "test_case", None),
            Err(CaseError::NoHistory)
        );
        assert_eq!(
            validate(&catalog, "test_case", Some(&player_with(99))),
            Err(CaseError::InsufficientPoints {
                needed: 100,
                have: 99
            })
        );
        let case = validate(&catalog, "test_case", Some(&player_with(100))).unwrap();
        assert_eq!(case.id, "test_case");
    }

    #[test]
    fn test_charge_debits_exactly_the_price() {
        let catalog = small_catalog();
        let case = catalog.case("test_case").unwrap();
        let mut player = player_with(130);
        charge(&mut player, case).unwrap();
        assert_eq!(player.points, 30);
    }

    #[test]
    fn test_draw_skips_ghost_references() {
        let catalog = small_catalog();
        let case = catalog.case("test_case").unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let opening = draw(&catalog, case, &mut rng).unwrap();
            assert_ne!(opening.name, "Призрак");
        }
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let mut catalog = small_catalog();
        catalog.cases[0].contains = vec!["Призрак".to_string()];
        let case = catalog.case("test_case").unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        assert!(matches!(
            draw(&catalog, case, &mut rng),
            Err(CaseError::EmptyPool)
        ));
    }

    #[test]
    fn test_rarity_weights_shape_the_draw() {
        let catalog = small_catalog();
        let case = catalog.case("test_case").unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut commons = 0u32;
        const ROUNDS: u32 = 10_000;
        for _ in 0..ROUNDS {
            if draw(&catalog, case, &mut rng).unwrap().name == "Дешёвый" {
                commons += 1;
            }
        }
        // 45 vs 5 weight: the common should land near 90% of draws.
        let rate = f64::from(commons) / f64::from(ROUNDS);
        assert!((0.88..=0.92).contains(&rate), "common rate drifted: {rate}");
    }

    #[test]
    fn test_open_can_profit_and_lose() {
        let catalog = small_catalog();
        let case = catalog.case("test_case").unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        loop {
            let mut player = player_with(case.price);
            charge(&mut player, case).unwrap();
            let opening = draw(&catalog, case, &mut rng).unwrap();
            award(&mut player, opening.skin);
            match opening.name {
                // 100 in, 10 back.
                "Дешёвый" => {
                    assert_eq!(player.points, 10);
                    break;
                }
                "Дорогой" => assert_eq!(player.points, 400),
                other => panic!("unexpected skin {other}"),
            }
        }
    }
}
