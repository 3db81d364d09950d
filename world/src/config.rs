//! Loading of per-level configuration records.

use iso_dimension_core::{GoalsError, LevelConfig};
use thiserror::Error;

/// File extension of raw level maps.
pub const MAP_EXTENSION: &str = "isomap";

/// File extension of level configuration records.
pub const CONFIG_EXTENSION: &str = "isoconfig";

/// Reasons a level configuration record is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The record is not valid JSON or misses a required field.
    #[error("malformed level config: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The goal thresholds cannot produce a monotonic rating.
    #[error("invalid level goals: {0}")]
    Goals(#[from] GoalsError),
}

/// Parses and validates a JSON level configuration record.
pub fn parse_level_config(json: &str) -> Result<LevelConfig, ConfigError> {
    let config: LevelConfig = serde_json::from_str(json)?;
    config.goals().validate()?;
    Ok(config)
}

/// Resource stem of the configuration shipped for the numbered level.
#[must_use]
pub fn level_config_stem(level: u32) -> String {
    format!("Levels/Level_{level}/Level_{level}_Config")
}

/// File name of the raw map referenced by the configuration.
#[must_use]
pub fn map_file_name(config: &LevelConfig) -> String {
    format!("{}.{MAP_EXTENSION}", config.raw_map_file())
}

#[cfg(test)]
mod tests {
    use iso_dimension_core::FacingDirection;

    use super::*;

    #[test]
    fn parses_shipped_config_layout() {
        let json = r#"{
            "rawMapFile": "Levels/Level_2/Level_2_Map",
            "initialDirection": "downRight",
            "goals": { "oneStar": 40, "twoStars": 25, "threeStars": 12.5 }
        }"#;
        let config = parse_level_config(json).expect("config should load");

        assert_eq!(config.initial_direction(), FacingDirection::DownRight);
        assert_eq!(config.goals().three_stars(), 12.5);
        assert_eq!(map_file_name(&config), "Levels/Level_2/Level_2_Map.isomap");
    }

    #[test]
    fn misordered_goals_fail_to_load() {
        let json = r#"{ "goals": { "oneStar": 5, "twoStars": 10, "threeStars": 20 } }"#;
        let error = parse_level_config(json).expect_err("misordered goals must fail");
        assert!(matches!(error, ConfigError::Goals(GoalsError::Misordered { .. })));
    }

    #[test]
    fn missing_goals_are_malformed() {
        let error = parse_level_config(r#"{ "rawMapFile": "x" }"#).expect_err("goals required");
        assert!(matches!(error, ConfigError::Malformed(_)));
    }

    #[test]
    fn level_stems_follow_the_shipped_layout() {
        assert_eq!(level_config_stem(3), "Levels/Level_3/Level_3_Config");
    }
}
