use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunable balance knobs for an encounter.
///
/// Formula constants that define the game rules (damage, capture, growth)
/// are module constants, not config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BattleConfig {
    /// Weight of the player/opponent speed ratio in the escape chance.
    pub flee_speed_weight: f64,
    /// Escape chance added on top of the weighted ratio.
    pub flee_floor: f64,
    /// Fraction of the normal experience yield granted for a capture.
    pub capture_xp_share: f64,
    /// Party size before captures overflow into storage.
    pub party_capacity: usize,
}

impl BattleConfig {
    pub const DEFAULT_FLEE_SPEED_WEIGHT: f64 = 0.7;
    pub const DEFAULT_FLEE_FLOOR: f64 = 0.3;
    pub const DEFAULT_CAPTURE_XP_SHARE: f64 = 0.5;
    pub const DEFAULT_PARTY_CAPACITY: usize = 6;

    pub fn new() -> Self {
        Self {
            flee_speed_weight: Self::DEFAULT_FLEE_SPEED_WEIGHT,
            flee_floor: Self::DEFAULT_FLEE_FLOOR,
            capture_xp_share: Self::DEFAULT_CAPTURE_XP_SHARE,
            party_capacity: Self::DEFAULT_PARTY_CAPACITY,
        }
    }

    /// Parses a RON document. Missing fields take their defaults.
    pub fn from_ron_str(text: &str) -> ConfigResult<Self> {
        let config: BattleConfig =
            ron::from_str(text).map_err(|err| ConfigError::Malformed(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            details: err.to_string(),
        })?;
        Self::from_ron_str(&text)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.flee_floor) {
            return Err(ConfigError::OutOfRange {
                field: "flee_floor",
                details: format!("{} is not within [0, 1]", self.flee_floor),
            });
        }
        if !self.flee_speed_weight.is_finite() || self.flee_speed_weight < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "flee_speed_weight",
                details: format!("{} must be a non-negative number", self.flee_speed_weight),
            });
        }
        if !(0.0..=1.0).contains(&self.capture_xp_share) {
            return Err(ConfigError::OutOfRange {
                field: "capture_xp_share",
                details: format!("{} is not within [0, 1]", self.capture_xp_share),
            });
        }
        if self.party_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                field: "party_capacity",
                details: "party must hold at least one agent".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = BattleConfig::from_ron_str("(party_capacity: 3)").unwrap();
        assert_eq!(
            config,
            BattleConfig {
                party_capacity: 3,
                ..BattleConfig::default()
            }
        );
    }

    #[test]
    fn test_rejects_unknown_fields_and_bad_ranges() {
        assert!(matches!(
            BattleConfig::from_ron_str("(flee_bonus: 1.0)"),
            Err(ConfigError::Malformed(_))
        ));
        assert!(matches!(
            BattleConfig::from_ron_str("(flee_floor: 1.5)"),
            Err(ConfigError::OutOfRange { field: "flee_floor", .. })
        ));
        assert!(matches!(
            BattleConfig::from_ron_str("(party_capacity: 0)"),
            Err(ConfigError::OutOfRange { field: "party_capacity", .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = BattleConfig::load("/definitely/not/here/battle.ron");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
