//! Logging setup and structured gate events.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pathwise_tiers::config::PathwiseConfig;
//! use pathwise_tiers::logging::init_logging;
//!
//! let config = PathwiseConfig::load()?;
//! init_logging(&config.logging);
//! ```

use tracing::{info, info_span, Level};

use crate::config::LoggingConfig;

/// Install a `tracing` fmt subscriber writing to stderr.
///
/// Does nothing when logging is disabled. Safe to call more than once; only
/// the first call installs a subscriber.
pub fn init_logging(config: &LoggingConfig) {
    if !config.enabled {
        return;
    }

    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Outcome of a feature gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    Granted,
    Locked,
}

impl std::fmt::Display for GateEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GateEvent::Granted => "granted",
            GateEvent::Locked => "locked",
        };
        write!(f, "{}", s)
    }
}

/// Log a gate decision.
///
/// # Arguments
///
/// * `event` - Whether the gate opened
/// * `tier` - The tier the decision was made for
/// * `feature_id` - The gated feature
/// * `reason` - Why the gate stayed locked, if it did
pub fn log_gate_event(event: GateEvent, tier: &str, feature_id: &str, reason: Option<&str>) {
    let span = info_span!(
        "gate_event",
        event = %event,
        tier = %tier,
        feature_id = %feature_id,
    );
    let _enter = span.enter();

    if let Some(r) = reason {
        info!(reason = %r, "Feature gate checked");
    } else {
        info!("Feature gate checked");
    }
}
