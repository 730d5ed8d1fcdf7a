use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clutch_types::GameConfig;
use serde::Deserialize;

/// Service-level settings. The `game` section carries the engine rules;
/// everything else is transport and housekeeping. Defaults reproduce the
/// standard deployment, so running without a file is fine.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Ledger document location.
    pub data_file: PathBuf,
    /// Optional promo-definition overlay.
    pub promo_file: PathBuf,
    /// Long-poll duration for getUpdates.
    pub poll_timeout_secs: u64,
    /// Backoff after a failed poll.
    pub retry_delay_secs: u64,
    /// Lifetime of the cooldown notice before it is swept.
    pub cooldown_notice_secs: u64,
    /// Lifetime of the help message before it is swept.
    pub help_notice_secs: u64,
    pub game: GameConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("csgo_data.json"),
            promo_file: PathBuf::from("promo_codes.json"),
            poll_timeout_secs: 50,
            retry_delay_secs: 3,
            cooldown_notice_secs: 10,
            help_notice_secs: 30,
            game: GameConfig::default(),
        }
    }
}

impl BotConfig {
    /// Loads settings from a YAML file, or the defaults when no path is
    /// given. Game rules are validated here so a bad file fails startup
    /// instead of surfacing mid-match.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config
            .game
            .validate()
            .with_context(|| format!("invalid game rules in {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clutch_types::RankMetric;

    #[test]
    fn test_defaults_without_a_file() {
        let config = BotConfig::load(None).unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.data_file, PathBuf::from("csgo_data.json"));
        assert_eq!(config.game.cooldown_hours, 10);
    }

    #[test]
    fn test_partial_yaml_fills_the_rest() {
        let raw = "game:\n  cooldown_hours: 12\n  rank_metric: points\n";
        let config: BotConfig = serde_yaml::from_str(raw).unwrap();
        assert_eq!(config.game.cooldown_hours, 12);
        assert_eq!(config.game.rank_metric, RankMetric::Points);
        // Untouched sections keep their defaults.
        assert_eq!(config.poll_timeout_secs, 50);
        assert_eq!(config.game.win_weight, 60);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let raw = "pol_timeout_secs: 50\n";
        assert!(serde_yaml::from_str::<BotConfig>(raw).is_err());
    }

    #[test]
    fn test_invalid_rules_fail_load() {
        let path = std::env::temp_dir().join(format!(
            "clutch-config-bad-{}.yaml",
            std::process::id()
        ));
        fs::write(&path, "game:\n  win_points_min: 20\n  win_points_max: 3\n").unwrap();
        assert!(BotConfig::load(Some(&path)).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_shipped_presets_parse() {
        let standard: BotConfig =
            serde_yaml::from_str(include_str!("../../config/standard.yaml")).unwrap();
        assert_eq!(standard.game.cooldown_hours, 10);
        assert_eq!(standard.game.rank_metric, RankMetric::Wins);
        standard.game.validate().unwrap();

        let marathon: BotConfig =
            serde_yaml::from_str(include_str!("../../config/marathon.yaml")).unwrap();
        assert_eq!(marathon.game.cooldown_hours, 12);
        assert_eq!(marathon.game.rank_metric, RankMetric::Points);
        marathon.game.validate().unwrap();
    }
}
