//! Error types for PathWise tiers.
//!
//! The resolver itself never fails: unknown tiers and features get the most
//! restrictive answer. Errors only surface on startup paths such as
//! loading configuration, loading a tier table, or parsing a session payload.

use thiserror::Error;

use crate::tiers::{LimitKey, Tier};

/// Result alias used across the crate.
pub type TierResult<T> = Result<T, TierError>;

#[derive(Debug, Error)]
pub enum TierError {
    /// The `config` crate failed to build or deserialize a source.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A configuration value was readable but not acceptable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown tier '{0}'")]
    UnknownTier(String),

    #[error("unknown limit key '{0}'")]
    UnknownLimitKey(String),

    /// Limits are non-negative, or `-1` for unlimited.
    #[error("invalid limit {0}: expected a non-negative count or -1 for unlimited")]
    InvalidLimit(i64),

    #[error("invalid feature id '{0}': expected lowercase snake_case")]
    InvalidFeatureId(String),

    #[error("duplicate feature id '{0}'")]
    DuplicateFeature(String),

    /// A boolean feature granted at a lower tier is withheld at `tier`.
    #[error("feature '{feature_id}' is withheld at tier '{tier}' but granted below it")]
    FeatureRegression { feature_id: String, tier: Tier },

    /// The feature matrix and the limits table disagree.
    #[error("feature matrix disagrees with tier limits: {0}")]
    InconsistentLimit(String),

    #[error("malformed session payload: {0}")]
    Session(#[from] serde_json::Error),

    /// A known usage counter was not a non-negative integer.
    #[error("invalid usage count for '{key}': {value}")]
    InvalidUsage { key: LimitKey, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_error_names_feature_and_tier() {
        let err = TierError::FeatureRegression {
            feature_id: "analytics".to_string(),
            tier: Tier::Premium,
        };
        let display = err.to_string();
        assert!(display.contains("analytics"));
        assert!(display.contains("premium"));
    }

    #[test]
    fn session_error_converts_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TierError = parse_err.into();
        assert!(matches!(err, TierError::Session(_)));
    }
}
