use std::env;
use std::io;
use std::sync::Arc;

use pathwise_tiers::cli::{parse_command, run_command};
use pathwise_tiers::config::PathwiseConfig;
use pathwise_tiers::errors::TierResult;
use pathwise_tiers::logging::init_logging;
use pathwise_tiers::resolver::Resolver;

/// Inspect the tier table: comparison matrix, gate checks, limits and prices.
///
/// The table comes from `PATHWISE_TIERS_FILE` / `tiers.source` when set,
/// otherwise the built-in PathWise table is used.
fn main() -> TierResult<()> {
    let config = PathwiseConfig::load()?;
    init_logging(&config.logging);

    let resolver = Resolver::new(Arc::new(config.tier_table()?));

    let args: Vec<String> = env::args().collect();
    let command = parse_command(&args);
    run_command(&resolver, &command, &mut io::stdout().lock())
}
