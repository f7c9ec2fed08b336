//! Feature gates and usage meters.
//!
//! A gate combines a feature check with an optional usage check and, when it
//! stays locked, carries everything needed to render an upgrade prompt. A
//! usage meter describes how close a counter is to its tier's limit.

use std::fmt;

use crate::logging::{log_gate_event, GateEvent};
use crate::resolver::Resolver;
use crate::tiers::{Limit, LimitKey, Tier};

/// Percentage at which a meter is considered near its limit.
pub const NEAR_LIMIT_PERCENT: f64 = 80.0;

/// A gate check for one feature, optionally bounded by a usage counter.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub tier: &'a str,
    pub feature_id: &'a str,
    pub usage: Option<(LimitKey, u64)>,
}

impl<'a> GateRequest<'a> {
    pub fn feature(tier: &'a str, feature_id: &'a str) -> Self {
        Self {
            tier,
            feature_id,
            usage: None,
        }
    }

    pub fn with_usage(mut self, key: LimitKey, usage: u64) -> Self {
        self.usage = Some((key, usage));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockReason {
    /// The tier does not include the feature at all
    FeatureUnavailable,
    /// The tier includes the feature but the counter is used up
    LimitReached {
        key: LimitKey,
        limit: Limit,
        usage: u64,
    },
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockReason::FeatureUnavailable => f.write_str("feature not included in tier"),
            LockReason::LimitReached { key, limit, usage } => {
                write!(f, "{key} limit reached ({usage} of {limit})")
            }
        }
    }
}

/// What to show in place of locked content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradePrompt {
    pub reason: LockReason,
    pub headline: &'static str,
    /// Empty when there is nothing to suggest
    pub message: String,
    pub target: Option<Tier>,
    pub target_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Granted,
    Locked(UpgradePrompt),
}

impl GateDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GateDecision::Granted)
    }
}

/// How full a usage meter is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterLevel {
    Normal,
    NearLimit,
    AtLimit,
    Unlimited,
}

/// Usage of one counter against its tier limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageMeter {
    pub key: LimitKey,
    pub usage: u64,
    pub limit: Limit,
}

impl UsageMeter {
    /// Percentage of the limit used, capped at 100, or `None` when unlimited.
    pub fn percentage(&self) -> Option<f64> {
        match self.limit {
            Limit::Unlimited => None,
            Limit::Max(0) => Some(100.0),
            Limit::Max(n) => {
                // Usage is clamped to the limit, so the conversion is exact.
                let used = u32::try_from(self.usage).map_or(n, |u| u.min(n));
                Some(f64::from(used) / f64::from(n) * 100.0)
            }
        }
    }

    pub fn level(&self) -> MeterLevel {
        match self.percentage() {
            None => MeterLevel::Unlimited,
            Some(p) if p >= 100.0 => MeterLevel::AtLimit,
            Some(p) if p >= NEAR_LIMIT_PERCENT => MeterLevel::NearLimit,
            Some(_) => MeterLevel::Normal,
        }
    }
}

impl fmt::Display for UsageMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit {
            Limit::Unlimited => write!(f, "{} / ∞", self.usage),
            Limit::Max(n) => write!(f, "{} / {}", self.usage, n),
        }
    }
}

impl Resolver {
    /// Decide whether gated content may be shown.
    ///
    /// An unrecognized tier is always locked, with no upgrade target or copy.
    pub fn check_gate(&self, request: &GateRequest<'_>) -> GateDecision {
        let tier = request.tier.parse::<Tier>().ok();

        let reason = if !self.can_access_feature(request.tier, request.feature_id) {
            Some(LockReason::FeatureUnavailable)
        } else {
            request.usage.and_then(|(key, usage)| {
                let limit = self.feature_limit(request.tier, key);
                (!limit.allows(usage)).then_some(LockReason::LimitReached { key, limit, usage })
            })
        };

        let Some(reason) = reason else {
            log_gate_event(GateEvent::Granted, request.tier, request.feature_id, None);
            return GateDecision::Granted;
        };

        let reason_text = reason.to_string();
        log_gate_event(
            GateEvent::Locked,
            request.tier,
            request.feature_id,
            Some(&reason_text),
        );

        let target = tier.and_then(|t| t.next());
        GateDecision::Locked(UpgradePrompt {
            reason,
            headline: match tier {
                Some(Tier::Standard) | Some(Tier::Premium) => "Premium Feature",
                Some(Tier::Free) | None => "Upgrade Required",
            },
            message: self.upgrade_message(request.tier, request.feature_id),
            target,
            target_name: target.map(|t| self.table().tier(t).name.clone()),
        })
    }

    pub fn usage_meter(&self, tier: impl AsRef<str>, key: LimitKey, usage: u64) -> UsageMeter {
        UsageMeter {
            key,
            usage,
            limit: self.feature_limit(tier, key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_when_feature_and_usage_allow() {
        let resolver = Resolver::builtin();
        let request = GateRequest::feature("free", "roadmaps").with_usage(LimitKey::Roadmaps, 0);
        assert!(resolver.check_gate(&request).is_granted());
    }

    #[test]
    fn locked_at_limit() {
        let resolver = Resolver::builtin();
        let request = GateRequest::feature("free", "roadmaps").with_usage(LimitKey::Roadmaps, 1);
        match resolver.check_gate(&request) {
            GateDecision::Locked(prompt) => {
                assert_eq!(
                    prompt.reason,
                    LockReason::LimitReached {
                        key: LimitKey::Roadmaps,
                        limit: Limit::Max(1),
                        usage: 1,
                    }
                );
                assert_eq!(prompt.headline, "Upgrade Required");
                assert_eq!(prompt.target, Some(Tier::Standard));
                assert_eq!(prompt.target_name.as_deref(), Some("Standard"));
                assert_eq!(
                    prompt.message,
                    "Upgrade to Standard or Premium to unlock Active Roadmaps"
                );
            }
            GateDecision::Granted => panic!("Expected the gate to be locked"),
        }
    }

    #[test]
    fn missing_feature_wins_over_usage() {
        let resolver = Resolver::builtin();
        let request = GateRequest::feature("standard", "resume_review")
            .with_usage(LimitKey::Roadmaps, 99);
        match resolver.check_gate(&request) {
            GateDecision::Locked(prompt) => {
                assert_eq!(prompt.reason, LockReason::FeatureUnavailable);
                assert_eq!(prompt.headline, "Premium Feature");
                assert_eq!(prompt.target, Some(Tier::Premium));
            }
            GateDecision::Granted => panic!("Expected the gate to be locked"),
        }
    }

    #[test]
    fn premium_lock_has_no_target() {
        let resolver = Resolver::builtin();
        match resolver.check_gate(&GateRequest::feature("premium", "unknown_feature")) {
            GateDecision::Locked(prompt) => {
                assert_eq!(prompt.target, None);
                assert_eq!(prompt.target_name, None);
                assert!(prompt.message.is_empty());
            }
            GateDecision::Granted => panic!("Unknown features must stay locked"),
        }
    }

    #[test]
    fn unknown_tier_is_locked_without_target() {
        let resolver = Resolver::builtin();
        for feature_id in ["analytics", "roadmaps", "ai_mentor"] {
            match resolver.check_gate(&GateRequest::feature("platinum", feature_id)) {
                GateDecision::Locked(prompt) => {
                    assert_eq!(prompt.reason, LockReason::FeatureUnavailable);
                    assert_eq!(prompt.headline, "Upgrade Required");
                    assert_eq!(prompt.target, None);
                    assert_eq!(prompt.target_name, None);
                    assert!(prompt.message.is_empty());
                }
                GateDecision::Granted => panic!("Expected {feature_id} to be locked"),
            }
        }
    }

    #[test]
    fn meter_levels() {
        let resolver = Resolver::builtin();
        let normal = resolver.usage_meter("free", LimitKey::AiMentorMessages, 5);
        assert_eq!(normal.level(), MeterLevel::Normal);
        assert_eq!(normal.percentage(), Some(50.0));
        assert_eq!(normal.to_string(), "5 / 10");

        let near = resolver.usage_meter("free", LimitKey::AiMentorMessages, 8);
        assert_eq!(near.level(), MeterLevel::NearLimit);

        let at = resolver.usage_meter("free", LimitKey::AiMentorMessages, 10);
        assert_eq!(at.level(), MeterLevel::AtLimit);

        let unlimited = resolver.usage_meter("premium", LimitKey::AiMentorMessages, 500);
        assert_eq!(unlimited.level(), MeterLevel::Unlimited);
        assert_eq!(unlimited.percentage(), None);
        assert_eq!(unlimited.to_string(), "500 / ∞");
    }

    #[test]
    fn huge_usage_caps_at_full() {
        let meter = UsageMeter {
            key: LimitKey::AiMentorMessages,
            usage: u64::MAX,
            limit: Limit::Max(10),
        };
        assert_eq!(meter.percentage(), Some(100.0));
        assert_eq!(meter.level(), MeterLevel::AtLimit);

        let over = UsageMeter {
            key: LimitKey::AiMentorMessages,
            usage: 12,
            limit: Limit::Max(10),
        };
        assert_eq!(over.percentage(), Some(100.0));
    }

    #[test]
    fn zero_limit_meter_is_full() {
        let meter = UsageMeter {
            key: LimitKey::StudyGroups,
            usage: 0,
            limit: Limit::Max(0),
        };
        assert_eq!(meter.level(), MeterLevel::AtLimit);
    }
}
