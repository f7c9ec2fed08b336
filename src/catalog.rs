//! The tier table: per-tier configs plus the feature matrix.
//!
//! A [`TierTable`] is an immutable value built once at startup, either from
//! the compiled-in PathWise table ([`TierTable::builtin`]) or from a TOML file
//! ([`TierTable::from_path`]), and then shared by handle with the resolver.
//!
//! The limits and the feature matrix describe some of the same numbers twice
//! (the "roadmaps" limit and the "Active Roadmaps" row, for instance). Rows
//! that mirror a limit carry a `limit_key`, and loading refuses a table whose
//! two copies disagree.
//!
//! # File format
//!
//! ```toml
//! [tiers.standard]
//! name = "Standard"
//! price_cents = 999
//! price_yearly_cents = 9900
//! features = ["3 active roadmaps"]
//!
//! [tiers.standard.limits]
//! roadmaps = 3
//! study_groups = -1
//! # ... every limit key
//!
//! [[features]]
//! id = "roadmaps"
//! name = "Active Roadmaps"
//! limit_key = "roadmaps"
//! cells = { free = 1, standard = 3, premium = "Unlimited" }
//! ```

use config::{Config, File, FileFormat};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::errors::{TierError, TierResult};
use crate::features::{FeatureEntry, FeatureMatrix, FeatureValue};
use crate::tiers::{Limit, LimitKey, PerTier, Tier, TierConfig, TierLimits};

lazy_static! {
    static ref FEATURE_ID: Regex = Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid feature id pattern");
    static ref FIRST_NUMBER: Regex = Regex::new(r"\d+").expect("valid number pattern");
}

/// Tier configs and feature matrix, validated together.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TierTable {
    pub tiers: PerTier<TierConfig>,
    pub features: FeatureMatrix,
}

/// A feature-matrix cell that contradicts the tier's limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitMismatch {
    pub feature_id: String,
    pub tier: Tier,
    pub limit: Limit,
    pub cell: FeatureValue,
}

impl fmt::Display for LimitMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "feature '{}' shows '{}' for {} but the limit is {}",
            self.feature_id, self.cell, self.tier, self.limit
        )
    }
}

impl TierTable {
    pub fn tier(&self, tier: Tier) -> &TierConfig {
        self.tiers.get(tier)
    }

    /// Load and validate a table from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> TierResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading tier table");
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;
        let table: TierTable = settings.try_deserialize()?;
        table.validate()?;
        Ok(table)
    }

    /// Load and validate a table from TOML text.
    pub fn from_toml_str(toml: &str) -> TierResult<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        let table: TierTable = settings.try_deserialize()?;
        table.validate()?;
        Ok(table)
    }

    /// Check the invariants the type system does not already enforce.
    pub fn validate(&self) -> TierResult<()> {
        for (tier, config) in self.tiers.iter() {
            if config.name.trim().is_empty() {
                return Err(TierError::InvalidConfig(format!(
                    "tiers.{tier}.name cannot be empty"
                )));
            }
        }

        let mut seen = HashSet::new();
        for entry in self.features.iter() {
            if !FEATURE_ID.is_match(&entry.id) {
                return Err(TierError::InvalidFeatureId(entry.id.clone()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(TierError::DuplicateFeature(entry.id.clone()));
            }
            check_additive(entry)?;
        }

        let issues = self.consistency_issues();
        if !issues.is_empty() {
            let described: Vec<String> = issues.iter().map(ToString::to_string).collect();
            return Err(TierError::InconsistentLimit(described.join("; ")));
        }

        Ok(())
    }

    /// Rows whose cells disagree with the limits they mirror.
    pub fn consistency_issues(&self) -> Vec<LimitMismatch> {
        let mut issues = Vec::new();
        for entry in self.features.iter() {
            let Some(key) = entry.limit_key else { continue };
            for (tier, cell) in entry.cells.iter() {
                let limit = self.tier(tier).limit(key);
                if !cell_matches_limit(cell, limit) {
                    issues.push(LimitMismatch {
                        feature_id: entry.id.clone(),
                        tier,
                        limit,
                        cell: cell.clone(),
                    });
                }
            }
        }
        issues
    }

    /// The PathWise production table.
    pub fn builtin() -> Self {
        TierTable {
            tiers: PerTier {
                free: TierConfig {
                    name: "Free".to_string(),
                    price_cents: 0,
                    price_yearly_cents: 0,
                    description: "Get started with the basics".to_string(),
                    features: strings(&[
                        "1 active roadmap",
                        "10 AI Mentor messages/day",
                        "3 interview sessions/month",
                        "1 portfolio generation/month",
                        "Basic resources (3 per skill)",
                        "Community study groups",
                    ]),
                    limits: TierLimits {
                        roadmaps: Limit::Max(1),
                        ai_mentor_messages: Limit::Max(10),
                        interview_sessions: Limit::Max(3),
                        portfolio_generations: Limit::Max(1),
                        project_generations: Limit::Max(2),
                        study_groups: Limit::Max(2),
                        resources_per_skill: Limit::Max(3),
                    },
                },
                standard: TierConfig {
                    name: "Standard".to_string(),
                    price_cents: 999,
                    price_yearly_cents: 9900,
                    description: "For serious learners".to_string(),
                    features: strings(&[
                        "3 active roadmaps",
                        "50 AI Mentor messages/day",
                        "15 interview sessions/month",
                        "5 portfolio generations/month",
                        "Premium resources (8 per skill)",
                        "Create & join unlimited groups",
                        "Interview pressure mode",
                        "Progress analytics",
                    ]),
                    limits: TierLimits {
                        roadmaps: Limit::Max(3),
                        ai_mentor_messages: Limit::Max(50),
                        interview_sessions: Limit::Max(15),
                        portfolio_generations: Limit::Max(5),
                        project_generations: Limit::Max(10),
                        study_groups: Limit::Unlimited,
                        resources_per_skill: Limit::Max(8),
                    },
                },
                premium: TierConfig {
                    name: "Premium".to_string(),
                    price_cents: 1999,
                    price_yearly_cents: 19900,
                    description: "Maximum career acceleration".to_string(),
                    features: strings(&[
                        "Unlimited roadmaps",
                        "Unlimited AI Mentor",
                        "Unlimited interview sessions",
                        "Unlimited portfolio generations",
                        "All resources (15+ per skill)",
                        "Priority support",
                        "1-on-1 career coaching session",
                        "Resume review by experts",
                        "Job application tracking",
                        "Salary negotiation guide",
                    ]),
                    limits: TierLimits {
                        roadmaps: Limit::Unlimited,
                        ai_mentor_messages: Limit::Unlimited,
                        interview_sessions: Limit::Unlimited,
                        portfolio_generations: Limit::Unlimited,
                        project_generations: Limit::Unlimited,
                        study_groups: Limit::Unlimited,
                        resources_per_skill: Limit::Max(15),
                    },
                },
            },
            features: FeatureMatrix::new(vec![
                row(
                    "roadmaps",
                    "Active Roadmaps",
                    "Number of learning roadmaps you can have active",
                    Some(LimitKey::Roadmaps),
                    [
                        FeatureValue::Count(1),
                        FeatureValue::Count(3),
                        FeatureValue::label("Unlimited"),
                    ],
                ),
                row(
                    "ai_mentor",
                    "AI Mentor Messages",
                    "Daily AI mentor conversations",
                    Some(LimitKey::AiMentorMessages),
                    labels(["10/day", "50/day", "Unlimited"]),
                ),
                row(
                    "interview_sessions",
                    "Interview Practice",
                    "Monthly mock interview sessions",
                    Some(LimitKey::InterviewSessions),
                    labels(["3/month", "15/month", "Unlimited"]),
                ),
                row(
                    "portfolio",
                    "Portfolio Generation",
                    "AI-generated portfolio content",
                    Some(LimitKey::PortfolioGenerations),
                    labels(["1/month", "5/month", "Unlimited"]),
                ),
                row(
                    "resources",
                    "Learning Resources",
                    "Curated resources per skill",
                    Some(LimitKey::ResourcesPerSkill),
                    labels(["3 per skill", "8 per skill", "15+ per skill"]),
                ),
                row(
                    "study_groups",
                    "Study Groups",
                    "Create and join study groups",
                    Some(LimitKey::StudyGroups),
                    labels(["Join 2", "Unlimited", "Unlimited"]),
                ),
                row(
                    "interview_pressure",
                    "Interview Pressure Mode",
                    "Timed, high-pressure interview simulation",
                    None,
                    flags([false, true, true]),
                ),
                row(
                    "analytics",
                    "Progress Analytics",
                    "Detailed learning analytics and insights",
                    None,
                    flags([false, true, true]),
                ),
                row(
                    "career_coaching",
                    "1-on-1 Career Coaching",
                    "Personal session with career expert",
                    None,
                    [
                        FeatureValue::Bool(false),
                        FeatureValue::Bool(false),
                        FeatureValue::label("1 session/month"),
                    ],
                ),
                row(
                    "resume_review",
                    "Expert Resume Review",
                    "Professional resume feedback",
                    None,
                    flags([false, false, true]),
                ),
                row(
                    "job_tracking",
                    "Job Application Tracking",
                    "Track your job applications",
                    None,
                    flags([false, false, true]),
                ),
                row(
                    "priority_support",
                    "Priority Support",
                    "Fast response from support team",
                    None,
                    flags([false, false, true]),
                ),
            ]),
        }
    }
}

/// A boolean row may only switch on as tiers go up.
fn check_additive(entry: &FeatureEntry) -> TierResult<()> {
    let mut granted_below = false;
    for (tier, cell) in entry.cells.iter() {
        if let FeatureValue::Bool(enabled) = cell {
            if granted_below && !enabled {
                return Err(TierError::FeatureRegression {
                    feature_id: entry.id.clone(),
                    tier,
                });
            }
            granted_below |= *enabled;
        }
    }
    Ok(())
}

fn cell_matches_limit(cell: &FeatureValue, limit: Limit) -> bool {
    match (limit, cell) {
        (Limit::Unlimited, FeatureValue::Label(label)) => label.eq_ignore_ascii_case("unlimited"),
        (Limit::Unlimited, _) => false,
        (Limit::Max(n), FeatureValue::Count(m)) => *m == i64::from(n),
        (Limit::Max(n), FeatureValue::Label(label)) => FIRST_NUMBER
            .find(label)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            == Some(n),
        (Limit::Max(_), FeatureValue::Bool(_)) => false,
    }
}

fn row(
    id: &str,
    name: &str,
    description: &str,
    limit_key: Option<LimitKey>,
    [free, standard, premium]: [FeatureValue; 3],
) -> FeatureEntry {
    FeatureEntry {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        limit_key,
        cells: PerTier {
            free,
            standard,
            premium,
        },
    }
}

fn labels(values: [&str; 3]) -> [FeatureValue; 3] {
    values.map(FeatureValue::label)
}

fn flags(values: [bool; 3]) -> [FeatureValue; 3] {
    values.map(FeatureValue::Bool)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_validates() {
        let table = TierTable::builtin();
        table.validate().unwrap();
        assert!(table.consistency_issues().is_empty());
        assert_eq!(table.features.len(), 12);
    }

    #[test]
    fn builtin_limits_match_product_copy() {
        let table = TierTable::builtin();
        assert_eq!(table.tier(Tier::Free).limit(LimitKey::Roadmaps), Limit::Max(1));
        assert_eq!(
            table.tier(Tier::Standard).limit(LimitKey::StudyGroups),
            Limit::Unlimited
        );
        assert_eq!(
            table.tier(Tier::Premium).limit(LimitKey::ResourcesPerSkill),
            Limit::Max(15)
        );
    }

    #[test]
    fn label_numbers_are_matched_against_limits() {
        assert!(cell_matches_limit(&FeatureValue::label("Join 2"), Limit::Max(2)));
        assert!(cell_matches_limit(&FeatureValue::label("15+ per skill"), Limit::Max(15)));
        assert!(!cell_matches_limit(&FeatureValue::label("20/day"), Limit::Max(10)));
        assert!(!cell_matches_limit(&FeatureValue::label("Unlimited"), Limit::Max(10)));
        assert!(cell_matches_limit(&FeatureValue::label("unlimited"), Limit::Unlimited));
        assert!(!cell_matches_limit(&FeatureValue::Count(5), Limit::Unlimited));
        assert!(!cell_matches_limit(&FeatureValue::Bool(true), Limit::Max(1)));
    }

    #[test]
    fn edited_limit_is_reported() {
        let mut table = TierTable::builtin();
        table.tiers.standard.limits.roadmaps = Limit::Max(5);

        let issues = table.consistency_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].feature_id, "roadmaps");
        assert_eq!(issues[0].tier, Tier::Standard);
        assert!(matches!(table.validate(), Err(TierError::InconsistentLimit(_))));
    }

    #[test]
    fn regressing_flag_is_rejected() {
        let mut table = TierTable::builtin();
        table.features = FeatureMatrix::new(vec![row(
            "analytics",
            "Progress Analytics",
            "",
            None,
            flags([false, true, false]),
        )]);
        match table.validate() {
            Err(TierError::FeatureRegression { feature_id, tier }) => {
                assert_eq!(feature_id, "analytics");
                assert_eq!(tier, Tier::Premium);
            }
            other => panic!("Expected FeatureRegression, got {other:?}"),
        }
    }

    #[test]
    fn bad_feature_ids_are_rejected() {
        let mut table = TierTable::builtin();
        table.features = FeatureMatrix::new(vec![row(
            "Interview-Pressure",
            "Interview Pressure Mode",
            "",
            None,
            flags([false, true, true]),
        )]);
        assert!(matches!(table.validate(), Err(TierError::InvalidFeatureId(_))));

        table.features = FeatureMatrix::new(vec![
            row("analytics", "A", "", None, flags([false, true, true])),
            row("analytics", "B", "", None, flags([false, false, true])),
        ]);
        assert!(matches!(table.validate(), Err(TierError::DuplicateFeature(_))));
    }

    #[test]
    fn empty_tier_name_is_rejected() {
        let mut table = TierTable::builtin();
        table.tiers.premium.name = "  ".to_string();
        assert!(matches!(table.validate(), Err(TierError::InvalidConfig(_))));
    }
}
