//! The scan loop: snapshot, scan, gate, plan, execute, rebalance, stop-loss.
//!
//! ```text
//! bootstrap:  pair_metadata -> PairRegistry -> discover_triangles -> BalancePartition
//!
//! each cycle: quote_snapshot (bounded retry, failure ends only this cycle)
//!                 -> OpportunityScanner::scan
//!                 -> ProfitabilityGate
//!                 -> PlanBuilder::build
//!                 -> ExecutionEngine::execute   (every leg valid)
//!                 -> BalancePartition::refreshed
//!                 -> stop-loss check
//! ```

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::execution::{CycleOutcome, ExecutionEngine};
use super::gate::ProfitabilityGate;
use super::params::TradingParams;
use super::partition::BalancePartition;
use super::planner::PlanBuilder;
use super::scanner::{discover_triangles, OpportunityScanner, ScanReport};
use crate::domain::pair::PairRegistry;
use crate::domain::quote::QuoteSnapshot;
use crate::error::{Error, PlanError, Result, VenueError};
use crate::port::outbound::venue::Venue;

/// Scan loop cadence and snapshot retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSchedule {
    pub num_scans: u64,
    /// Pause between cycles.
    pub interval: Duration,
    /// Snapshot attempts before the cycle is abandoned.
    pub snapshot_max_retries: u32,
    pub snapshot_retry_delay: Duration,
}

/// Why a cycle could not read a quote snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFailure {
    pub attempts: u32,
    /// Error returned by the final attempt.
    pub last: VenueError,
}

impl From<SnapshotFailure> for Error {
    fn from(failure: SnapshotFailure) -> Self {
        if failure.last.is_connectivity() {
            Self::SnapshotUnavailable {
                attempts: failure.attempts,
            }
        } else {
            Self::Venue(failure.last)
        }
    }
}

/// What a cycle did after scanning.
#[derive(Debug, Clone)]
pub enum CycleStatus {
    /// No snapshot could be read, so nothing was scanned.
    SnapshotFailed(SnapshotFailure),
    /// No triangle had usable quotes.
    NoOpportunity,
    /// The best cycle did not clear the profitability threshold.
    BelowThreshold,
    /// Planning failed before any order was placed.
    PlanRejected(PlanError),
    /// The plan had at least one leg failing venue size rules.
    PlanInvalid,
    Executed(CycleOutcome),
}

/// Result of one scan cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub scan_id: u64,
    pub scan: ScanReport,
    pub status: CycleStatus,
    /// Partition after the cycle, used by the next one.
    pub partition: BalancePartition,
}

/// Totals over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub executed: u64,
    pub lost: u64,
    /// Cycles abandoned because no snapshot could be read.
    pub failed: u64,
    pub profit: Decimal,
}

impl RunSummary {
    fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        match report.status {
            CycleStatus::Executed(ref outcome) => {
                self.executed += 1;
                if outcome.is_lost() {
                    self.lost += 1;
                }
                self.profit += outcome.report.profit;
            }
            CycleStatus::SnapshotFailed(_) => self.failed += 1,
            _ => {}
        }
    }
}

/// Wires the scanner, planner and engine around one venue.
pub struct ArbitrageService {
    venue: Arc<dyn Venue>,
    params: TradingParams,
    schedule: ScanSchedule,
    scanner: OpportunityScanner,
    gate: ProfitabilityGate,
    planner: PlanBuilder,
    engine: ExecutionEngine,
    partition: BalancePartition,
}

impl ArbitrageService {
    /// Load pair metadata, discover triangles and take the starting balance.
    ///
    /// # Errors
    ///
    /// Returns the venue error when metadata or the starting balance cannot be read.
    pub async fn bootstrap(venue: Arc<dyn Venue>, params: TradingParams, schedule: ScanSchedule) -> Result<Self> {
        let registry = Arc::new(PairRegistry::new(venue.pair_metadata().await?));
        let triangles = discover_triangles(venue.as_ref(), &registry, &params.target).await;
        let available = venue.available_balance(&params.target).await?;
        let partition = BalancePartition::initial(available, &params);

        info!(
            venue = venue.name(),
            pairs = registry.len(),
            triangles = triangles.len(),
            target = %params.target,
            tradable = %partition.tradable,
            reserve = %partition.reserve,
            "service ready"
        );

        Ok(Self {
            scanner: OpportunityScanner::new(triangles),
            gate: ProfitabilityGate::new(&params),
            planner: PlanBuilder::new(Arc::clone(&venue), Arc::clone(&registry), params.clone()),
            engine: ExecutionEngine::new(Arc::clone(&venue), registry, params.clone()),
            venue,
            params,
            schedule,
            partition,
        })
    }

    #[must_use]
    pub const fn partition(&self) -> &BalancePartition {
        &self.partition
    }

    #[must_use]
    pub const fn scanner(&self) -> &OpportunityScanner {
        &self.scanner
    }

    #[must_use]
    pub const fn schedule(&self) -> &ScanSchedule {
        &self.schedule
    }

    /// Fetch a snapshot and scan it without trading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SnapshotUnavailable`] when every attempt fails to connect.
    pub async fn scan_once(&self) -> Result<ScanReport> {
        let snapshot = self.snapshot().await?;
        Ok(self.scanner.scan(&snapshot))
    }

    /// Run one full cycle.
    ///
    /// Venue failures end the cycle, never the run: a failed snapshot is
    /// reported as [`CycleStatus::SnapshotFailed`] and a failed balance read
    /// keeps the previous partition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StopLossBreached`] when the target balance falls below the floor.
    pub async fn run_cycle(&mut self, scan_id: u64) -> Result<CycleReport> {
        let (scan, status) = match self.snapshot().await {
            Ok(snapshot) => {
                let scan = self.scanner.scan(&snapshot);
                let status = self.act_on(scan_id, &scan).await;
                (scan, status)
            }
            Err(failure) => {
                warn!(scan_id, attempts = failure.attempts, error = %failure.last, "cycle abandoned, no snapshot");
                (ScanReport::empty(), CycleStatus::SnapshotFailed(failure))
            }
        };

        match self.venue.available_balance(&self.params.target).await {
            Ok(available) => {
                self.partition = self.partition.refreshed(available, &self.params);
                if self.partition.stop_loss_breached(self.params.target_stop) {
                    let floor = self.partition.stop_floor(self.params.target_stop);
                    warn!(scan_id, balance = %available, floor = %floor, "stop loss breached");
                    return Err(Error::StopLossBreached {
                        balance: available,
                        floor,
                    });
                }
            }
            Err(e) => warn!(scan_id, error = %e, "balance read failed, keeping previous partition"),
        }

        Ok(CycleReport {
            scan_id,
            scan,
            status,
            partition: self.partition,
        })
    }

    /// Run up to `num_scans` cycles, calling `on_cycle` after each one.
    ///
    /// # Errors
    ///
    /// Stops only when the stop loss is breached.
    pub async fn run<F>(&mut self, num_scans: u64, mut on_cycle: F) -> Result<RunSummary>
    where
        F: FnMut(&CycleReport),
    {
        let mut summary = RunSummary::default();
        for scan_id in 1..=num_scans {
            let report = self.run_cycle(scan_id).await?;
            summary.record(&report);
            on_cycle(&report);
            if scan_id < num_scans {
                tokio::time::sleep(self.schedule.interval).await;
            }
        }
        info!(
            cycles = summary.cycles,
            executed = summary.executed,
            lost = summary.lost,
            failed = summary.failed,
            profit = %summary.profit,
            "run finished"
        );
        Ok(summary)
    }

    async fn act_on(&self, scan_id: u64, scan: &ScanReport) -> CycleStatus {
        let Some(ref best) = scan.best else {
            debug!(scan_id, "no triangle with usable quotes");
            return CycleStatus::NoOpportunity;
        };
        if !self.gate.is_profitable(best.yield_pct()) {
            debug!(scan_id, pair = %best.pair(), yield_pct = %best.yield_pct(), "best cycle below threshold");
            return CycleStatus::BelowThreshold;
        }

        let plan = match self.planner.build(scan_id, best, self.partition.tradable).await {
            Ok(plan) => plan,
            Err(e) => {
                info!(scan_id, pair = %best.pair(), error = %e, "plan rejected");
                return CycleStatus::PlanRejected(e);
            }
        };
        if !plan.is_executable() {
            return CycleStatus::PlanInvalid;
        }
        CycleStatus::Executed(self.engine.execute(&plan).await)
    }

    /// Only connectivity failures are retried.
    async fn snapshot(&self) -> std::result::Result<QuoteSnapshot, SnapshotFailure> {
        let max = self.schedule.snapshot_max_retries.max(1);
        let mut attempt = 1;
        loop {
            match self.venue.quote_snapshot().await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) if e.is_connectivity() && attempt < max => {
                    warn!(attempt, max, error = %e, "quote snapshot failed");
                    tokio::time::sleep(self.schedule.snapshot_retry_delay).await;
                    attempt += 1;
                }
                Err(last) => return Err(SnapshotFailure { attempts: attempt, last }),
            }
        }
    }
}
