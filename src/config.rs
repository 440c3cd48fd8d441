//! Router configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cost::CostWeights;
use crate::drc::DesignRules;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub weights: CostWeights,
    /// Per-search iteration budget; unbounded when absent
    pub max_iterations: Option<u32>,
    /// Attempt rip-up-and-reroute when a net fails
    pub rip_up: bool,
    /// Rules loaded into the rule engine. `track_width` is also the width
    /// stamped on every routed path.
    pub rules: DesignRules,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            weights: CostWeights::default(),
            max_iterations: None,
            rip_up: true,
            rules: DesignRules::default(),
        }
    }
}

impl RouterConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RouterConfig::from_toml_str(
            r#"
            max_iterations = 5000
            rip_up = false

            [weights]
            via = 80.0

            [rules]
            track_width = 150000
            "#,
        )
        .unwrap();

        assert_eq!(config.max_iterations, Some(5000));
        assert!(!config.rip_up);
        assert_eq!(config.weights.via, 80.0);
        assert_eq!(config.weights.length, 1.0);
        assert_eq!(config.weights.history, 20.0);
        assert_eq!(config.rules.track_width, 150_000);
        assert_eq!(config.rules.via_drill, DesignRules::default().via_drill);
    }

    #[test]
    fn empty_document_is_the_default() {
        assert_eq!(RouterConfig::from_toml_str("").unwrap(), RouterConfig::default());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = RouterConfig::from_toml_str("[weights]\nvia = \"lots\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RouterConfig::from_file("/nonexistent/router.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
