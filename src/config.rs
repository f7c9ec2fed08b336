//! Configuration for PathWise tiers.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `pathwise.toml` file
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `PATHWISE_LOGGING_ENABLED` - Enable logging (true/false)
//! - `PATHWISE_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
//! - `PATHWISE_TIERS_FILE` - Path to a tier table TOML file replacing the built-in table
//!
//! Loading returns an owned value; callers build the tier table from it once
//! and hand it to the resolver.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::catalog::TierTable;
use crate::errors::{TierError, TierResult};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "pathwise";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathwiseConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Tier table source
    pub tiers: TiersConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

/// Where the tier table comes from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TiersConfig {
    /// Path to a tier table file; the built-in table is used when unset
    pub source: Option<String>,
}

impl PathwiseConfig {
    /// Load configuration from `pathwise.toml` (optional) and the environment.
    pub fn load() -> TierResult<Self> {
        let builder = Self::defaults()?.add_source(File::with_name(CONFIG_FILE).required(false));
        Self::finish(builder)
    }

    /// Load configuration from a specific file and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> TierResult<Self> {
        let builder = Self::defaults()?.add_source(File::from(path.as_ref()));
        Self::finish(builder)
    }

    fn defaults() -> TierResult<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.enabled", false)?
            .set_default("logging.level", "info")?)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> TierResult<Self> {
        let settings = builder
            .set_override_option(
                "logging.enabled",
                env::var("PATHWISE_LOGGING_ENABLED")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )?
            .set_override_option("logging.level", env::var("PATHWISE_LOG_LEVEL").ok())?
            .set_override_option("tiers.source", env::var("PATHWISE_TIERS_FILE").ok())?
            .build()?;

        let config: PathwiseConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> TierResult<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(TierError::InvalidConfig(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        if let Some(source) = &self.tiers.source {
            if source.trim().is_empty() {
                return Err(TierError::InvalidConfig(
                    "tiers.source cannot be empty when set".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Build the tier table this configuration points at.
    pub fn tier_table(&self) -> TierResult<TierTable> {
        match &self.tiers.source {
            Some(path) => TierTable::from_path(path),
            None => Ok(TierTable::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PathwiseConfig::default();
        config.validate().unwrap();
        assert!(!config.logging.enabled);
        assert_eq!(config.logging.level, "info");
        assert!(config.tiers.source.is_none());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut config = PathwiseConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(config.validate(), Err(TierError::InvalidConfig(_))));
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut config = PathwiseConfig::default();
        config.tiers.source = Some(" ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn no_source_means_builtin_table() {
        let table = PathwiseConfig::default().tier_table().unwrap();
        assert_eq!(table, TierTable::builtin());
    }
}
