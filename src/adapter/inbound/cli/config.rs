//! Handler for the `config` command group.

use std::path::Path;

use rust_decimal::Decimal;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    let params = config.trading_params();

    output::section("Configuration");
    output::success("Configuration is valid");
    output::field("Path", path.display());
    output::field("Target", &params.target);
    output::field(
        "Threshold",
        format!("{}%", params.profit_threshold() * Decimal::ONE_HUNDRED),
    );
    output::field(
        "Tradable",
        format!("{}%", (Decimal::ONE - params.target_min_liquidity) * Decimal::ONE_HUNDRED),
    );
    output::field("Scans", config.scan_schedule().num_scans);
    if let Some(paper) = config.paper_config() {
        output::field("Market", &paper.market_file);
    }
    Ok(())
}
