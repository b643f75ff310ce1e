//! Bundle configuration.
use crate::errors::ConfigError;
use serde::Deserialize;
use std::{fs, path::Path};

/// How a bundle turns messages into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Walk the syntax tree on every call.
    Interpret,
    /// Compile every message once, on first use.
    Compile,
}

impl Default for Strategy {
    #[inline]
    fn default() -> Self {
        Strategy::Compile
    }
}

/// Settings of a [`crate::bundle::FluentBundle`].
///
/// ```yaml
/// use_isolating: false
/// max_parts: 500
/// strategy: interpret
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Wrap placeables in Unicode isolation marks.
    pub use_isolating: bool,
    /// Pattern elements a single format call may expand.
    pub max_parts: usize,
    /// Characters a single interpolated value may hold.
    pub max_part_length: usize,
    pub strategy: Strategy,
}

impl BundleConfig {
    pub const MAX_PARTS: usize = 1000;
    pub const MAX_PART_LENGTH: usize = 2500;

    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: BundleConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        log::debug!("loaded bundle config: {:?}", config);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_yaml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parts == 0 {
            return Err(ConfigError::Invalid("max_parts must be greater than zero"));
        }
        if self.max_part_length == 0 {
            return Err(ConfigError::Invalid("max_part_length must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            use_isolating: true,
            max_parts: Self::MAX_PARTS,
            max_part_length: Self::MAX_PART_LENGTH,
            strategy: Strategy::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BundleConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, BundleConfig::default());
        assert!(config.use_isolating);
        assert_eq!(config.strategy, Strategy::Compile);
    }

    #[test]
    fn test_partial() {
        let config = BundleConfig::from_yaml_str("use_isolating: false\nstrategy: interpret\n").unwrap();
        assert!(!config.use_isolating);
        assert_eq!(config.strategy, Strategy::Interpret);
        assert_eq!(config.max_parts, BundleConfig::MAX_PARTS);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            BundleConfig::from_yaml_str("max_parts: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BundleConfig::from_yaml_str("strategy: fast"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            BundleConfig::from_yaml_str("colour: blue"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
