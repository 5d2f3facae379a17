//! Engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the walker and the history projector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reason tag passed to the XP ledger when a run completes.
    pub xp_reason_tag: String,

    /// History page size used when the caller asks for 0 entries.
    pub default_history_limit: usize,

    /// Upper bound on any history page.
    pub max_history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            xp_reason_tag: "simulation_complete".to_string(),
            default_history_limit: 20,
            max_history_limit: 100,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML config; absent keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.xp_reason_tag.trim().is_empty() {
            return Err(ConfigError::Invalid("xp_reason_tag must not be empty".into()));
        }
        if self.max_history_limit == 0 {
            return Err(ConfigError::Invalid("max_history_limit must be positive".into()));
        }
        if self.default_history_limit > self.max_history_limit {
            return Err(ConfigError::Invalid(
                "default_history_limit exceeds max_history_limit".into(),
            ));
        }
        Ok(())
    }

    /// Page size to use for a requested history `limit`.
    pub fn history_limit(&self, limit: usize) -> usize {
        let requested = if limit == 0 {
            self.default_history_limit
        } else {
            limit
        };
        requested.min(self.max_history_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.xp_reason_tag, "simulation_complete");
        assert_eq!(config.default_history_limit, 20);
        assert_eq!(config.max_history_limit, 100);
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str("max_history_limit = 50\n").unwrap();
        assert_eq!(config.max_history_limit, 50);
        assert_eq!(config.xp_reason_tag, "simulation_complete");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            EngineConfig::from_toml_str("max_history_limit = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("default_history_limit = 500"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("xp_reason_tag = \"  \""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_history_limit() {
        let config = EngineConfig::default();
        assert_eq!(config.history_limit(0), 20);
        assert_eq!(config.history_limit(5), 5);
        assert_eq!(config.history_limit(1000), 100);
    }
}
