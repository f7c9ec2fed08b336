//! PathWise tiers - subscription tier and feature gating for PathWise
//!
//! A [`resolver::Resolver`] answers whether a tier may use a feature and
//! which usage limit applies, over an immutable [`catalog::TierTable`]
//! built once at startup and shared by handle.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pathwise_tiers::catalog::TierTable;
//! use pathwise_tiers::resolver::Resolver;
//! use pathwise_tiers::tiers::{Limit, LimitKey};
//!
//! let resolver = Resolver::new(Arc::new(TierTable::builtin()));
//!
//! assert!(!resolver.can_access_feature("free", "analytics"));
//! assert_eq!(resolver.feature_limit("standard", LimitKey::StudyGroups), Limit::Unlimited);
//! ```

// Tables and decisions
pub mod catalog;
pub mod errors;
pub mod features;
pub mod resolver;
pub mod tiers;

// Consumers of the resolver
pub mod gate;
pub mod pricing;
pub mod session;

// Ambient
pub mod cli;
pub mod config;
pub mod logging;
