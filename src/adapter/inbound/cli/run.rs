//! Handler for the `run` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::outbound;
use crate::application::cycle::{ArbitrageService, CycleReport, CycleStatus};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    config.init_logging();

    let venue = outbound::connect(&config)?;
    let schedule = config.scan_schedule();
    let num_scans = args.scans.unwrap_or(schedule.num_scans);
    let mut service = ArbitrageService::bootstrap(venue, config.trading_params(), schedule).await?;

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Venue", format!("{:?}", config.venue).to_lowercase());
    output::field("Target", &config.target_asset);
    output::field("Triangles", service.scanner().triangles().len());
    output::field("Tradable", service.partition().tradable);
    output::field("Scans", num_scans);
    output::section("Cycles");

    let summary = service.run(num_scans, print_cycle).await?;

    output::section("Summary");
    output::field("Cycles", summary.cycles);
    output::field("Executed", summary.executed);
    output::field("Lost", summary.lost);
    output::field("Failed", summary.failed);
    output::field("Profit", output::signed(summary.profit));
    Ok(())
}

fn status_label(status: &CycleStatus) -> &'static str {
    match status {
        CycleStatus::SnapshotFailed(_) => "failed",
        CycleStatus::NoOpportunity => "idle",
        CycleStatus::BelowThreshold => "below",
        CycleStatus::PlanRejected(_) => "rejected",
        CycleStatus::PlanInvalid => "invalid",
        CycleStatus::Executed(outcome) if outcome.is_lost() => "lost",
        CycleStatus::Executed(_) => "executed",
    }
}

fn print_cycle(report: &CycleReport) {
    let label = status_label(&report.status);
    let best = report.scan.best.as_ref();

    if output::is_json() {
        let mut payload = json!({
            "scan_id": report.scan_id,
            "status": label,
            "pairs": report.scan.rows.len(),
            "elapsed_us": report.scan.elapsed.as_micros() as u64,
            "best": best,
            "tradable": report.partition.tradable,
        });
        match report.status {
            CycleStatus::Executed(ref outcome) => {
                payload["orders"] = json!(outcome.orders);
                payload["report"] = json!(outcome.report);
                payload["lost_reason"] = json!(outcome.lost.map(|r| r.to_string()));
            }
            CycleStatus::SnapshotFailed(ref failure) => {
                payload["attempts"] = json!(failure.attempts);
                payload["error"] = json!(failure.last.to_string());
            }
            _ => {}
        }
        output::emit_json_line("cycle", payload);
        return;
    }

    let message = match (&report.status, best) {
        (CycleStatus::Executed(outcome), _) => match outcome.lost {
            Some(reason) => format!("{reason}, {} orders placed", outcome.orders.len()),
            None => format!(
                "profit {} {} over {} orders",
                output::signed(outcome.report.profit),
                outcome.report.asset,
                outcome.orders.len()
            ),
        },
        (CycleStatus::PlanRejected(err), _) => err.to_string(),
        (CycleStatus::SnapshotFailed(failure), _) => {
            format!("no snapshot after {} attempts: {}", failure.attempts, failure.last)
        }
        (_, Some(opp)) => format!("{} {} {}%", opp.pair(), opp.direction(), opp.yield_pct().round_dp(4)),
        (_, None) => "no priced triangle".to_string(),
    };
    output::cycle(report.scan_id, label, &message);
}
