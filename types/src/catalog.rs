use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Drop-rate tier. The weights feed the per-skin draw directly: a case's
/// pool is never normalized, so two skins of equal rarity always share the
/// same odds while a pool's total mass varies with its composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    /// Static sampling weight of the tier.
    pub const fn weight(&self) -> u32 {
        match self {
            Rarity::Common => 45,
            Rarity::Uncommon => 30,
            Rarity::Rare => 20,
            Rarity::Legendary => 5,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skin {
    pub rarity: Rarity,
    /// Resale value credited when the skin drops.
    pub price: u64,
    pub image: String,
}

/// A purchasable case. `contains` lists skin names; a name that resolves
/// to no catalog skin is skipped at draw time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub image: String,
    pub contains: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogIssue {
    #[error("case {case:?} references unknown skin {skin:?}")]
    UnknownSkin { case: String, skin: String },
    #[error("skin {skin:?} has an unparseable image url {url:?}")]
    BadSkinImage { skin: String, url: String },
    #[error("case {case:?} has an unparseable image url {url:?}")]
    BadCaseImage { case: String, url: String },
}

/// The full economy surface: every known skin plus the cases sold in the
/// shop menu, in menu order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    pub skins: BTreeMap<String, Skin>,
    pub cases: Vec<Case>,
}

impl Catalog {
    pub fn case(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|case| case.id == id)
    }

    /// Cross-checks case contents and image URLs. Issues are reported, not
    /// fatal; the affected skin is simply excluded from draws.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        for (name, skin) in &self.skins {
            if Url::parse(&skin.image).is_err() {
                issues.push(CatalogIssue::BadSkinImage {
                    skin: name.clone(),
                    url: skin.image.clone(),
                });
            }
        }
        for case in &self.cases {
            if Url::parse(&case.image).is_err() {
                issues.push(CatalogIssue::BadCaseImage {
                    case: case.id.clone(),
                    url: case.image.clone(),
                });
            }
            for skin in &case.contains {
                if !self.skins.contains_key(skin) {
                    issues.push(CatalogIssue::UnknownSkin {
                        case: case.id.clone(),
                        skin: skin.clone(),
                    });
                }
            }
        }
        issues
    }

    /// The shipped skin and case tables.
    pub fn builtin() -> Self {
        let skins = [
            ("AK-47 | Красная линия", Rarity::Uncommon, 126, "https://i.postimg.cc/FzDYdG7v/Chat-GPT-Image-28-2025-20-43-48.png"),
            ("AK-47 | Прямо с завода", Rarity::Uncommon, 100, "https://i.postimg.cc/63X4KnJr/Chat-GPT-Image-29-2025-11-45-01.png"),
            ("AWP | Африканская сетка", Rarity::Common, 70, "https://i.postimg.cc/bvkdHqs3/Chat-GPT-Image-28-2025-20-44-33.png"),
            ("P250 | Муертос", Rarity::Common, 8, "https://i.postimg.cc/xd40NCGX/image.png"),
            ("AK47 | 'Элитное снарежение", Rarity::Rare, 150, "https://i.postimg.cc/bYZCpvFZ/image.png"),
            ("AK-47 | Африканская сетка", Rarity::Common, 34, "https://postimg.cc/5QdqF328"),
            ("AWP | Сгорающая прибыль", Rarity::Rare, 255, "https://i.postimg.cc/T1qw80rm/photo-2025-05-28-20-24-09.jpg"),
            ("Desert Eagle | Огненная буря", Rarity::Rare, 220, "https://i.postimg.cc/Nf9pzkdL/Chat-GPT-Image-29-2025-10-49-06.png"),
            ("UMP-45 | Blaze", Rarity::Uncommon, 90, "https://i.postimg.cc/0ymxPmyy/3c20f497-19aa-440b-9364-bf88fba90cac.png"),
            ("Нож | Бабочка | Тигриный клык", Rarity::Legendary, 500, "https://i.postimg.cc/dVLXYTwS/Chat-GPT-Image-29-2025-11-29-32.png"),
            ("Перчатки | Леопардовые", Rarity::Legendary, 600, "https://i.postimg.cc/RVj5sRzZ/1e88b865-4cb1-400f-b0a6-54a80adf5637.png"),
            ("Нож | Керамбит | Изыск", Rarity::Legendary, 650, "https://i.postimg.cc/02tdPWN9/87321e5c-526d-47e2-a4a0-4174d3a03a8e.png"),
            ("AWP | История о пьяном драконе", Rarity::Rare, 200, "https://i.postimg.cc/j2c26F12/f268e53d-0d81-47d4-af27-e790252430e7.png"),
            ("Desert Eagle | Самородок", Rarity::Rare, 180, "https://i.postimg.cc/8c0JQWPb/Chat-GPT-Image-29-2025-11-03-56.png"),
        ]
        .into_iter()
        .map(|(name, rarity, price, image)| {
            (
                name.to_string(),
                Skin {
                    rarity,
                    price,
                    image: image.to_string(),
                },
            )
        })
        .collect();

        let cases = vec![
            Case {
                id: "weapon_case".to_string(),
                name: "Оружейный кейс".to_string(),
                price: 80,
                image: "https://i.postimg.cc/85711Kw6/Chat-GPT-Image-28-2025-10-49-09.png"
                    .to_string(),
                contains: vec![
                    "AK-47 | Прямо с завода".to_string(),
                    "AWP | Африканская сетка".to_string(),
                    "P250 | Муертос".to_string(),
                    "AK47 | 'Элитное снарежение".to_string(),
                    "AK-47 | Африканская сетка".to_string(),
                ],
            },
            Case {
                id: "fire_case".to_string(),
                name: "Огненный кейс".to_string(),
                price: 150,
                image: "https://i.postimg.cc/7ZPrHtZZ/Chat-GPT-Image-28-2025-10-51-00.png"
                    .to_string(),
                contains: vec![
                    "AWP | Сгорающая прибыль".to_string(),
                    "Desert Eagle | Огненная буря".to_string(),
                    "AK-47 | Красная линия".to_string(),
                    "UMP-45 | Blaze".to_string(),
                    "P250 | Муертос".to_string(),
                ],
            },
            Case {
                id: "premium_case".to_string(),
                name: "Буржуйский кейс".to_string(),
                price: 350,
                image: "https://i.postimg.cc/rsnhYwX6/Chat-GPT-Image-28-2025-18-28-21.png"
                    .to_string(),
                contains: vec![
                    "Нож | Бабочка | Тигриный клык".to_string(),
                    "Перчатки | Леопардовые".to_string(),
                    "Нож | Керамбит | Изыск".to_string(),
                    "AWP | История о пьяном драконе".to_string(),
                    "Desert Eagle | Самородок".to_string(),
                    "AK-47 | Прямо с завода".to_string(),
                ],
            },
        ];

        Self { skins, cases }
    }
}
