//! Subscription tiers, limit keys and per-tier limits.
//!
//! PathWise has three tiers, ordered `free < standard < premium`. Each tier
//! carries a [`TierConfig`] with display copy, prices and a [`TierLimits`]
//! record holding one [`Limit`] for every [`LimitKey`].
//!
//! # Configuration
//!
//! Tier tables can be loaded from TOML (see [`crate::catalog::TierTable`]).
//! Limits use `-1` for unlimited:
//!
//! ```toml
//! [tiers.free]
//! name = "Free"
//! price_cents = 0
//! price_yearly_cents = 0
//!
//! [tiers.free.limits]
//! roadmaps = 1
//! ai_mentor_messages = 10
//! study_groups = 2
//! # ...
//!
//! [tiers.premium.limits]
//! roadmaps = -1  # unlimited
//! ```

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{TierError, TierResult};

/// Raw limit value meaning "no limit".
pub const UNLIMITED: i64 = -1;

/// A subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Standard,
    Premium,
}

impl Tier {
    /// All tiers, lowest first.
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Standard, Tier::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Standard => "standard",
            Tier::Premium => "premium",
        }
    }

    /// The tier directly above this one, if any.
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Free => Some(Tier::Standard),
            Tier::Standard => Some(Tier::Premium),
            Tier::Premium => None,
        }
    }

    /// Every tier above this one, lowest first.
    pub fn higher(self) -> impl Iterator<Item = Tier> {
        Tier::ALL.into_iter().filter(move |t| *t > self)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = TierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Tier::Free),
            "standard" => Ok(Tier::Standard),
            "premium" => Ok(Tier::Premium),
            other => Err(TierError::UnknownTier(other.to_string())),
        }
    }
}

impl AsRef<str> for Tier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// One value per tier.
///
/// Used for both tier configs and feature-matrix cells so that a table can
/// never be missing a tier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PerTier<T> {
    pub free: T,
    pub standard: T,
    pub premium: T,
}

impl<T> PerTier<T> {
    pub fn get(&self, tier: Tier) -> &T {
        match tier {
            Tier::Free => &self.free,
            Tier::Standard => &self.standard,
            Tier::Premium => &self.premium,
        }
    }

    /// Iterate over `(tier, value)` pairs, lowest tier first.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &T)> {
        Tier::ALL.into_iter().map(move |t| (t, self.get(t)))
    }
}

/// A usage counter that tiers limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitKey {
    Roadmaps,
    #[serde(alias = "ai_mentor_messages")]
    AiMentorMessages,
    #[serde(alias = "interview_sessions")]
    InterviewSessions,
    #[serde(alias = "portfolio_generations")]
    PortfolioGenerations,
    #[serde(alias = "project_generations")]
    ProjectGenerations,
    #[serde(alias = "study_groups")]
    StudyGroups,
    #[serde(alias = "resources_per_skill")]
    ResourcesPerSkill,
}

impl LimitKey {
    pub const ALL: [LimitKey; 7] = [
        LimitKey::Roadmaps,
        LimitKey::AiMentorMessages,
        LimitKey::InterviewSessions,
        LimitKey::PortfolioGenerations,
        LimitKey::ProjectGenerations,
        LimitKey::StudyGroups,
        LimitKey::ResourcesPerSkill,
    ];

    /// The camelCase name used in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitKey::Roadmaps => "roadmaps",
            LimitKey::AiMentorMessages => "aiMentorMessages",
            LimitKey::InterviewSessions => "interviewSessions",
            LimitKey::PortfolioGenerations => "portfolioGenerations",
            LimitKey::ProjectGenerations => "projectGenerations",
            LimitKey::StudyGroups => "studyGroups",
            LimitKey::ResourcesPerSkill => "resourcesPerSkill",
        }
    }

    fn snake_name(&self) -> &'static str {
        match self {
            LimitKey::Roadmaps => "roadmaps",
            LimitKey::AiMentorMessages => "ai_mentor_messages",
            LimitKey::InterviewSessions => "interview_sessions",
            LimitKey::PortfolioGenerations => "portfolio_generations",
            LimitKey::ProjectGenerations => "project_generations",
            LimitKey::StudyGroups => "study_groups",
            LimitKey::ResourcesPerSkill => "resources_per_skill",
        }
    }

    /// How often the counter behind this key resets.
    pub fn period(&self) -> UsagePeriod {
        match self {
            LimitKey::AiMentorMessages => UsagePeriod::Daily,
            LimitKey::InterviewSessions
            | LimitKey::PortfolioGenerations
            | LimitKey::ProjectGenerations => UsagePeriod::Monthly,
            LimitKey::Roadmaps | LimitKey::StudyGroups | LimitKey::ResourcesPerSkill => {
                UsagePeriod::Lifetime
            }
        }
    }
}

impl fmt::Display for LimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimitKey {
    type Err = TierError;

    /// Accepts both the camelCase and snake_case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LimitKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.snake_name() == s)
            .ok_or_else(|| TierError::UnknownLimitKey(s.to_string()))
    }
}

/// Reset window of a usage counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsagePeriod {
    Daily,
    Monthly,
    /// Counts currently active items; never resets.
    Lifetime,
}

impl UsagePeriod {
    /// Start of the window containing `now`, or `None` for lifetime counters.
    pub fn window_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let day = match self {
            UsagePeriod::Daily => now.date_naive(),
            UsagePeriod::Monthly => now.date_naive().with_day(1)?,
            UsagePeriod::Lifetime => return None,
        };
        Some(day.and_hms_opt(0, 0, 0)?.and_utc())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UsagePeriod::Daily => "daily",
            UsagePeriod::Monthly => "monthly",
            UsagePeriod::Lifetime => "lifetime",
        }
    }
}

impl fmt::Display for UsagePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric limit on a usage counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Unlimited,
    Max(u32),
}

impl Limit {
    /// Convert from the raw table form, where `-1` means unlimited.
    pub fn from_raw(raw: i64) -> TierResult<Self> {
        match raw {
            UNLIMITED => Ok(Limit::Unlimited),
            n => u32::try_from(n)
                .map(Limit::Max)
                .map_err(|_| TierError::InvalidLimit(n)),
        }
    }

    /// The raw table form: `-1` for unlimited, otherwise the count.
    pub fn as_raw(&self) -> i64 {
        match self {
            Limit::Unlimited => UNLIMITED,
            Limit::Max(n) => i64::from(*n),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    /// Whether one more action is allowed at `usage`.
    ///
    /// Usage equal to the limit is already at the limit.
    pub fn allows(&self, usage: u64) -> bool {
        match self {
            Limit::Unlimited => true,
            Limit::Max(n) => usage < u64::from(*n),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Unlimited => f.write_str("unlimited"),
            Limit::Max(n) => write!(f, "{n}"),
        }
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Limit::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

/// One limit per [`LimitKey`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TierLimits {
    pub roadmaps: Limit,
    pub ai_mentor_messages: Limit,
    pub interview_sessions: Limit,
    pub portfolio_generations: Limit,
    pub project_generations: Limit,
    pub study_groups: Limit,
    pub resources_per_skill: Limit,
}

impl TierLimits {
    pub fn get(&self, key: LimitKey) -> Limit {
        match key {
            LimitKey::Roadmaps => self.roadmaps,
            LimitKey::AiMentorMessages => self.ai_mentor_messages,
            LimitKey::InterviewSessions => self.interview_sessions,
            LimitKey::PortfolioGenerations => self.portfolio_generations,
            LimitKey::ProjectGenerations => self.project_generations,
            LimitKey::StudyGroups => self.study_groups,
            LimitKey::ResourcesPerSkill => self.resources_per_skill,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (LimitKey, Limit)> + '_ {
        LimitKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

/// Configuration for a single tier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TierConfig {
    /// Display name, e.g. "Standard"
    pub name: String,
    /// Monthly price in cents
    pub price_cents: u32,
    /// Yearly price in cents
    pub price_yearly_cents: u32,
    #[serde(default)]
    pub description: String,
    /// Human-readable feature copy shown on pricing cards
    #[serde(default)]
    pub features: Vec<String>,
    pub limits: TierLimits,
}

impl TierConfig {
    /// Check if this tier's copy lists a specific feature line.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    pub fn limit(&self, key: LimitKey) -> Limit {
        self.limits.get(key)
    }
}
