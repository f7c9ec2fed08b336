use std::env;

use serial_test::serial;

use pathwise_tiers::catalog::TierTable;
use pathwise_tiers::config::PathwiseConfig;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/pathwise.toml");
const TIERS_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/docs/tiers.toml");

fn clear_env() {
    env::remove_var("PATHWISE_LOGGING_ENABLED");
    env::remove_var("PATHWISE_LOG_LEVEL");
    env::remove_var("PATHWISE_TIERS_FILE");
}

#[test]
#[serial]
fn file_values_are_loaded() {
    clear_env();
    let config = PathwiseConfig::load_from(FIXTURE).unwrap();
    assert!(config.logging.enabled);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.tiers.source.as_deref(), Some("docs/tiers.toml"));
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    env::set_var("PATHWISE_LOG_LEVEL", "warn");
    env::set_var("PATHWISE_LOGGING_ENABLED", "false");
    env::set_var("PATHWISE_TIERS_FILE", TIERS_FILE);

    let config = PathwiseConfig::load_from(FIXTURE).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert!(!config.logging.enabled);
    assert_eq!(config.tiers.source.as_deref(), Some(TIERS_FILE));
    assert_eq!(config.tier_table().unwrap(), TierTable::builtin());

    clear_env();
}

#[test]
#[serial]
fn invalid_log_level_from_env_is_rejected() {
    clear_env();
    env::set_var("PATHWISE_LOG_LEVEL", "loud");
    assert!(PathwiseConfig::load_from(FIXTURE).is_err());
    clear_env();
}

#[test]
#[serial]
fn missing_default_file_uses_defaults() {
    clear_env();
    // No pathwise.toml at the package root, so only defaults apply.
    let config = PathwiseConfig::load().unwrap();
    assert!(!config.logging.enabled);
    assert_eq!(config.logging.level, "info");
    assert!(config.tiers.source.is_none());
}
