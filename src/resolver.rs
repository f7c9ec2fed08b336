//! Tier/feature resolver.
//!
//! Pure decision functions over a shared [`TierTable`]. Every operation
//! accepts the tier either as a [`Tier`] or as the raw string a session
//! carries, and none of them can fail. An unrecognized tier is denied every
//! feature and gets no upgrade path, but its config and limits are those of
//! `free`. An unknown feature is denied.
//!
//! # Usage
//!
//! ```rust
//! use pathwise_tiers::resolver::Resolver;
//! use pathwise_tiers::tiers::LimitKey;
//!
//! let resolver = Resolver::builtin();
//!
//! assert!(resolver.can_access_feature("standard", "interview_pressure"));
//! assert!(resolver.is_within_limit("free", LimitKey::Roadmaps, 0));
//! assert!(!resolver.is_within_limit("free", LimitKey::Roadmaps, 1));
//! assert_eq!(
//!     resolver.upgrade_message("free", "analytics"),
//!     "Upgrade to Standard or Premium to unlock Progress Analytics"
//! );
//! ```

use std::sync::Arc;
use tracing::warn;

use crate::catalog::TierTable;
use crate::tiers::{Limit, LimitKey, Tier, TierConfig};

/// Answers access and limit questions against one tier table.
#[derive(Debug, Clone)]
pub struct Resolver {
    table: Arc<TierTable>,
}

impl Resolver {
    pub fn new(table: Arc<TierTable>) -> Self {
        Self { table }
    }

    /// A resolver over the compiled-in PathWise table.
    pub fn builtin() -> Self {
        Self::new(Arc::new(TierTable::builtin()))
    }

    pub fn table(&self) -> &TierTable {
        &self.table
    }

    /// Resolve a raw tier, falling back to `free` when it is not recognized.
    pub fn resolve_tier(&self, tier: impl AsRef<str>) -> Tier {
        let raw = tier.as_ref();
        raw.parse().unwrap_or_else(|_| {
            warn!(tier = %raw, "Unrecognized tier, falling back to free");
            Tier::Free
        })
    }

    /// Configuration for `tier`, or the `free` configuration if unrecognized.
    pub fn tier_config(&self, tier: impl AsRef<str>) -> &TierConfig {
        self.table.tier(self.resolve_tier(tier))
    }

    /// Whether `tier` may use `feature_id`.
    ///
    /// Unknown features and unrecognized tiers are denied.
    pub fn can_access_feature(&self, tier: impl AsRef<str>, feature_id: &str) -> bool {
        let raw = tier.as_ref();
        let Ok(tier) = raw.parse::<Tier>() else {
            warn!(tier = %raw, feature_id = %feature_id, "Unrecognized tier, denying feature");
            return false;
        };
        self.table
            .features
            .find(feature_id)
            .map(|entry| entry.value(tier).grants_access())
            .unwrap_or(false)
    }

    pub fn feature_limit(&self, tier: impl AsRef<str>, key: LimitKey) -> Limit {
        self.tier_config(tier).limit(key)
    }

    /// Whether one more action is allowed with `usage` already consumed.
    pub fn is_within_limit(&self, tier: impl AsRef<str>, key: LimitKey, usage: u64) -> bool {
        self.feature_limit(tier, key).allows(usage)
    }

    /// Actions left before the limit, or `None` when unlimited.
    pub fn remaining(&self, tier: impl AsRef<str>, key: LimitKey, usage: u64) -> Option<u64> {
        match self.feature_limit(tier, key) {
            Limit::Unlimited => None,
            Limit::Max(n) => Some(u64::from(n).saturating_sub(usage)),
        }
    }

    /// Copy suggesting the tiers that unlock `feature_id`.
    ///
    /// Empty for premium, for an unrecognized tier, and for an unknown feature.
    pub fn upgrade_message(&self, tier: impl AsRef<str>, feature_id: &str) -> String {
        let Ok(tier) = tier.as_ref().parse::<Tier>() else {
            return String::new();
        };
        let Some(feature) = self.table.features.find(feature_id) else {
            return String::new();
        };

        let targets: Vec<&str> = tier
            .higher()
            .map(|t| self.table.tier(t).name.as_str())
            .collect();
        if targets.is_empty() {
            return String::new();
        }

        format!(
            "Upgrade to {} to unlock {}",
            targets.join(" or "),
            feature.name
        )
    }

    /// The tier to suggest next; `None` for premium and unrecognized tiers.
    pub fn next_tier(&self, tier: impl AsRef<str>) -> Option<Tier> {
        tier.as_ref().parse::<Tier>().ok().and_then(|t| t.next())
    }
}
