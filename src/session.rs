//! User context from backend session payloads.
//!
//! The backend reports a user's tier and usage counters as:
//!
//! ```json
//! {
//!   "data": {
//!     "user": { "tier": "standard" },
//!     "usage": { "roadmaps": 2, "aiMentorMessages": 14 }
//!   }
//! }
//! ```
//!
//! The tier string is kept as-is; the resolver decides what an unrecognized
//! tier means. Usage entries the crate does not know are skipped whatever
//! their value, but a known counter must be a non-negative integer.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::errors::{TierError, TierResult};
use crate::gate::{GateDecision, GateRequest};
use crate::resolver::Resolver;
use crate::tiers::{LimitKey, Tier};

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    data: SessionData,
}

#[derive(Debug, Deserialize)]
struct SessionData {
    #[serde(default)]
    user: SessionUser,
    #[serde(default)]
    usage: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionUser {
    #[serde(default)]
    tier: Option<String>,
}

/// A user's tier and current usage counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    /// Raw tier as reported by the backend
    pub tier: String,
    usage: HashMap<LimitKey, u64>,
}

impl UserContext {
    pub fn new(tier: impl Into<String>) -> Self {
        Self {
            tier: tier.into(),
            usage: HashMap::new(),
        }
    }

    pub fn with_usage(mut self, key: LimitKey, count: u64) -> Self {
        self.usage.insert(key, count);
        self
    }

    /// Parse a session payload. A missing tier means `free`.
    pub fn from_json(payload: &str) -> TierResult<Self> {
        let envelope: SessionEnvelope = serde_json::from_str(payload)?;
        let data = envelope.data;

        let mut usage = HashMap::new();
        for (name, value) in data.usage {
            let Ok(key) = name.parse::<LimitKey>() else {
                debug!(key = %name, "Ignoring unknown usage counter");
                continue;
            };
            let count = value.as_u64().ok_or_else(|| TierError::InvalidUsage {
                key,
                value: value.to_string(),
            })?;
            usage.insert(key, count);
        }

        Ok(Self {
            tier: data
                .user
                .tier
                .unwrap_or_else(|| Tier::Free.as_str().to_string()),
            usage,
        })
    }

    /// Current count for `key`; counters the backend omitted are zero.
    pub fn usage(&self, key: LimitKey) -> u64 {
        self.usage.get(&key).copied().unwrap_or(0)
    }

    pub fn is_within_limit(&self, resolver: &Resolver, key: LimitKey) -> bool {
        resolver.is_within_limit(&self.tier, key, self.usage(key))
    }

    /// Gate `feature_id`, optionally bounded by this user's `limit` counter.
    pub fn gate(
        &self,
        resolver: &Resolver,
        feature_id: &str,
        limit: Option<LimitKey>,
    ) -> GateDecision {
        let mut request = GateRequest::feature(&self.tier, feature_id);
        if let Some(key) = limit {
            request = request.with_usage(key, self.usage(key));
        }
        resolver.check_gate(&request)
    }
}
