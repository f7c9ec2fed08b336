//! Price quotes for the pricing page.
//!
//! Prices are kept in integer cents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TierError;
use crate::tiers::TierConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingCycle::Monthly => f.write_str("monthly"),
            BillingCycle::Yearly => f.write_str("yearly"),
        }
    }
}

impl FromStr for BillingCycle {
    type Err = TierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(BillingCycle::Monthly),
            "yearly" => Ok(BillingCycle::Yearly),
            other => Err(TierError::InvalidConfig(format!(
                "billing cycle must be 'monthly' or 'yearly', got '{other}'"
            ))),
        }
    }
}

/// What a tier costs on a given billing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub cycle: BillingCycle,
    /// Amount charged per billing period
    pub billed_cents: u32,
    /// Billed amount spread over months
    pub monthly_equivalent_cents: u32,
}

impl TierConfig {
    pub fn is_paid(&self) -> bool {
        self.price_cents > 0 || self.price_yearly_cents > 0
    }

    pub fn quote(&self, cycle: BillingCycle) -> PriceQuote {
        match cycle {
            BillingCycle::Monthly => PriceQuote {
                cycle,
                billed_cents: self.price_cents,
                monthly_equivalent_cents: self.price_cents,
            },
            BillingCycle::Yearly => PriceQuote {
                cycle,
                billed_cents: self.price_yearly_cents,
                monthly_equivalent_cents: div_round(self.price_yearly_cents, 12),
            },
        }
    }

    /// Whole percent saved by paying yearly instead of twelve monthly payments.
    pub fn yearly_savings_percent(&self) -> Option<u32> {
        let twelve_months = u64::from(self.price_cents) * 12;
        if twelve_months == 0 {
            return None;
        }
        let saved = twelve_months.saturating_sub(u64::from(self.price_yearly_cents));
        u32::try_from(div_round_u64(saved * 100, twelve_months)).ok()
    }
}

/// Format cents as dollars, e.g. `999` as `"$9.99"`.
pub fn format_cents(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

fn div_round(value: u32, divisor: u32) -> u32 {
    (value + divisor / 2) / divisor
}

fn div_round_u64(value: u64, divisor: u64) -> u64 {
    (value + divisor / 2) / divisor
}
