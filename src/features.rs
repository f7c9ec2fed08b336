//! The feature matrix: one row per gatable feature, one cell per tier.
//!
//! Cells are a tagged [`FeatureValue`] so that the same table can drive the
//! pricing comparison copy ("10/day", "Unlimited") and the boolean access
//! gates.

use serde::Deserialize;
use std::fmt;

use crate::tiers::{LimitKey, PerTier, Tier};

/// The value of one tier's cell in the feature matrix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Feature switched on or off
    Bool(bool),
    /// A plain count, e.g. active roadmaps
    Count(i64),
    /// Display copy, e.g. "10/day" or "Unlimited"
    Label(String),
}

impl FeatureValue {
    /// Whether this cell grants access to the feature.
    ///
    /// Counts grant access when positive. Labels grant access unless empty or
    /// the literal `"0"`; any other copy (including `"0 free"`) grants it.
    pub fn grants_access(&self) -> bool {
        match self {
            FeatureValue::Bool(enabled) => *enabled,
            FeatureValue::Count(n) => *n > 0,
            FeatureValue::Label(label) => !label.is_empty() && label != "0",
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        FeatureValue::Label(text.into())
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Bool(true) => f.write_str("✓"),
            FeatureValue::Bool(false) => f.write_str("✗"),
            FeatureValue::Count(n) => write!(f, "{n}"),
            FeatureValue::Label(label) => f.write_str(label),
        }
    }
}

/// A gatable feature.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The numeric limit this row describes, when it mirrors one.
    #[serde(default)]
    pub limit_key: Option<LimitKey>,
    pub cells: PerTier<FeatureValue>,
}

impl FeatureEntry {
    pub fn value(&self, tier: Tier) -> &FeatureValue {
        self.cells.get(tier)
    }
}

/// Ordered list of feature rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FeatureMatrix {
    entries: Vec<FeatureEntry>,
}

impl FeatureMatrix {
    pub fn new(entries: Vec<FeatureEntry>) -> Self {
        Self { entries }
    }

    pub fn find(&self, id: &str) -> Option<&FeatureEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
