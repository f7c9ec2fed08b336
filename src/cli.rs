//! Command-line inspection of the tier table.
//!
//! # Supported Commands
//!
//! ```text
//! pathwise_tiers table
//! pathwise_tiers check free roadmaps --limit roadmaps --usage 1
//! pathwise_tiers limits standard
//! pathwise_tiers pricing yearly
//! ```

use std::io::Write;

use chrono::Utc;

use crate::errors::TierResult;
use crate::gate::{GateDecision, GateRequest};
use crate::pricing::{format_cents, BillingCycle};
use crate::resolver::Resolver;
use crate::tiers::{LimitKey, Tier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the feature comparison table
    Table,
    /// Check a feature gate for a tier
    Check {
        tier: String,
        feature_id: String,
        usage: Option<(LimitKey, u64)>,
    },
    /// Print a tier's limits
    Limits { tier: String },
    /// Print prices for a billing cycle
    Pricing { cycle: BillingCycle },
    /// Unknown or missing command
    Help,
}

/// Parse CLI arguments; `args[0]` is the program name.
pub fn parse_command(args: &[String]) -> Command {
    let Some(command) = args.get(1) else {
        return Command::Help;
    };

    match command.as_str() {
        "table" => Command::Table,
        "check" => {
            if args.len() < 4 {
                eprintln!("Error: check requires a tier and a feature id");
                return Command::Help;
            }

            let mut limit = None;
            let mut usage = None;
            let mut i = 4;
            while i < args.len() {
                match args[i].as_str() {
                    "--limit" | "-l" => {
                        limit = args.get(i + 1).and_then(|v| v.parse::<LimitKey>().ok());
                        i += 2;
                    }
                    "--usage" | "-u" => {
                        usage = args.get(i + 1).and_then(|v| v.parse::<u64>().ok());
                        i += 2;
                    }
                    _ => i += 1,
                }
            }

            Command::Check {
                tier: args[2].clone(),
                feature_id: args[3].clone(),
                usage: limit.zip(usage),
            }
        }
        "limits" => match args.get(2) {
            Some(tier) => Command::Limits { tier: tier.clone() },
            None => {
                eprintln!("Error: limits requires a tier");
                Command::Help
            }
        },
        "pricing" => Command::Pricing {
            cycle: args
                .get(2)
                .and_then(|c| c.parse().ok())
                .unwrap_or_default(),
        },
        _ => Command::Help,
    }
}

/// Execute a command, writing its report to `out`.
pub fn run_command<W: Write>(resolver: &Resolver, command: &Command, out: &mut W) -> TierResult<()> {
    let table = resolver.table();

    match command {
        Command::Table => {
            let names: Vec<&str> = Tier::ALL.iter().map(|t| table.tier(*t).name.as_str()).collect();
            writeln!(out, "{:<28} {:<16} {:<16} {:<16}", "Feature", names[0], names[1], names[2])?;
            for entry in table.features.iter() {
                writeln!(
                    out,
                    "{:<28} {:<16} {:<16} {:<16}",
                    entry.name,
                    entry.cells.free.to_string(),
                    entry.cells.standard.to_string(),
                    entry.cells.premium.to_string(),
                )?;
            }
        }
        Command::Check {
            tier,
            feature_id,
            usage,
        } => {
            let request = GateRequest {
                tier,
                feature_id,
                usage: *usage,
            };
            match resolver.check_gate(&request) {
                GateDecision::Granted => writeln!(out, "GRANTED {feature_id} for {tier}")?,
                GateDecision::Locked(prompt) => {
                    writeln!(out, "LOCKED {feature_id} for {tier}: {}", prompt.reason)?;
                    writeln!(out, "{}", prompt.headline)?;
                    if !prompt.message.is_empty() {
                        writeln!(out, "{}", prompt.message)?;
                    }
                }
            }
        }
        Command::Limits { tier } => {
            let config = resolver.tier_config(tier);
            let now = Utc::now();
            writeln!(out, "{} limits:", config.name)?;
            for (key, limit) in config.limits.iter() {
                let period = key.period();
                match period.window_start(now) {
                    Some(start) => writeln!(
                        out,
                        "  {:<22} {:<10} {} (window started {})",
                        key.as_str(),
                        limit.to_string(),
                        period,
                        start.format("%Y-%m-%d")
                    )?,
                    None => writeln!(
                        out,
                        "  {:<22} {:<10} {}",
                        key.as_str(),
                        limit.to_string(),
                        period
                    )?,
                }
            }
        }
        Command::Pricing { cycle } => {
            writeln!(out, "Pricing ({cycle}):")?;
            for tier in Tier::ALL {
                let config = table.tier(tier);
                let quote = config.quote(*cycle);
                write!(
                    out,
                    "  {:<10} {}/month",
                    config.name,
                    format_cents(quote.monthly_equivalent_cents)
                )?;
                if *cycle == BillingCycle::Yearly && config.is_paid() {
                    write!(out, ", billed {}/year", format_cents(quote.billed_cents))?;
                    if let Some(saved) = config.yearly_savings_percent() {
                        write!(out, ", save {saved}%")?;
                    }
                }
                writeln!(out)?;
            }
        }
        Command::Help => {
            writeln!(out, "Usage: pathwise_tiers <command>")?;
            writeln!(out, "  table")?;
            writeln!(out, "  check <tier> <feature> [--limit <key> --usage <n>]")?;
            writeln!(out, "  limits <tier>")?;
            writeln!(out, "  pricing [monthly|yearly]")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        std::iter::once("pathwise_tiers")
            .chain(values.iter().copied())
            .map(String::from)
            .collect()
    }

    fn run(command: &Command) -> String {
        let mut out = Vec::new();
        run_command(&Resolver::builtin(), command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parse_no_args_returns_help() {
        assert_eq!(parse_command(&args(&[])), Command::Help);
        assert_eq!(parse_command(&args(&["serve"])), Command::Help);
    }

    #[test]
    fn parse_check_minimal() {
        assert_eq!(
            parse_command(&args(&["check", "free", "analytics"])),
            Command::Check {
                tier: "free".to_string(),
                feature_id: "analytics".to_string(),
                usage: None,
            }
        );
    }

    #[test]
    fn parse_check_with_usage() {
        let command = parse_command(&args(&[
            "check", "free", "roadmaps", "--limit", "roadmaps", "--usage", "1",
        ]));
        match command {
            Command::Check { usage, .. } => assert_eq!(usage, Some((LimitKey::Roadmaps, 1))),
            other => panic!("Expected Check command, got {other:?}"),
        }
    }

    #[test]
    fn parse_check_without_feature_returns_help() {
        assert_eq!(parse_command(&args(&["check", "free"])), Command::Help);
    }

    #[test]
    fn parse_pricing_defaults_to_monthly() {
        assert_eq!(
            parse_command(&args(&["pricing"])),
            Command::Pricing {
                cycle: BillingCycle::Monthly
            }
        );
        assert_eq!(
            parse_command(&args(&["pricing", "yearly"])),
            Command::Pricing {
                cycle: BillingCycle::Yearly
            }
        );
    }

    #[test]
    fn table_lists_every_feature() {
        let output = run(&Command::Table);
        assert!(output.contains("Interview Pressure Mode"));
        assert!(output.contains("15+ per skill"));
        assert_eq!(output.lines().count(), 13);
    }

    #[test]
    fn check_reports_locked_gate() {
        let output = run(&Command::Check {
            tier: "free".to_string(),
            feature_id: "roadmaps".to_string(),
            usage: Some((LimitKey::Roadmaps, 1)),
        });
        assert!(output.starts_with("LOCKED roadmaps for free"));
        assert!(output.contains("Upgrade to Standard or Premium to unlock Active Roadmaps"));
    }

    #[test]
    fn limits_show_unlimited() {
        let output = run(&Command::Limits {
            tier: "premium".to_string(),
        });
        assert!(output.starts_with("Premium limits:"));
        assert!(output.contains("unlimited"));
        assert!(output.contains("resourcesPerSkill"));
    }

    #[test]
    fn yearly_pricing_shows_savings() {
        let output = run(&Command::Pricing {
            cycle: BillingCycle::Yearly,
        });
        assert!(output.contains("$8.25/month, billed $99.00/year, save 17%"));
        assert!(output.contains("Free       $0.00/month\n"));
    }
}
