//! Handler for the `scan` command.

use std::path::Path;

use rust_decimal::Decimal;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound;
use crate::application::cycle::ArbitrageService;
use crate::application::gate::ProfitabilityGate;
use crate::application::scanner::PairScan;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct ScanRow {
    #[tabled(rename = "Pair")]
    pair: String,
    #[tabled(rename = "Forward %")]
    forward: Decimal,
    #[tabled(rename = "Reverse %")]
    reverse: Decimal,
    #[tabled(rename = "Best")]
    direction: String,
    #[tabled(rename = "Profitable")]
    profitable: bool,
}

/// Rows ordered by best yield, highest first; ties keep discovery order.
fn ranked(mut rows: Vec<PairScan>) -> Vec<PairScan> {
    rows.sort_by(|a, b| b.best_yield().cmp(&a.best_yield()));
    rows
}

/// Execute the scan command.
pub async fn execute(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    config.init_logging();

    let params = config.trading_params();
    let gate = ProfitabilityGate::new(&params);
    let venue = outbound::connect(&config)?;
    let service = ArbitrageService::bootstrap(venue, params, config.scan_schedule()).await?;
    let report = service.scan_once().await?;
    let rows = ranked(report.rows);

    if output::is_json() {
        output::emit_json_line(
            "scan",
            json!({
                "captured_at": report.captured_at,
                "elapsed_us": report.elapsed.as_micros() as u64,
                "threshold": gate.threshold(),
                "rows": rows,
                "best": report.best,
            }),
        );
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Captured", report.captured_at.to_rfc3339());
    output::field("Elapsed", format!("{:?}", report.elapsed));
    output::field("Threshold", format!("{}%", gate.threshold() * Decimal::ONE_HUNDRED));
    output::section("Triangles");

    if rows.is_empty() {
        output::warning("No triangle has usable quotes");
        return Ok(());
    }
    let table_rows: Vec<ScanRow> = rows
        .iter()
        .map(|row| ScanRow {
            pair: row.triangle.pair.to_string(),
            forward: row.forward_yield.round_dp(4),
            reverse: row.reverse_yield.round_dp(4),
            direction: row.direction.to_string(),
            profitable: gate.is_profitable(row.best_yield()),
        })
        .collect();
    output::lines(&Table::new(table_rows).to_string());
    Ok(())
}
