//! Opportunity scanning.
//!
//! Triangle discovery runs once at startup. Each scan then prices both cycle
//! directions for every triangle against one quote snapshot and keeps the
//! single best.
//!
//! ```text
//! PairRegistry --discover_triangles--> [Triangle]
//!                                          |
//!                  QuoteSnapshot --> OpportunityScanner::scan
//!                                          |
//!                                          v
//!                             ScanReport { rows, best }
//! ```

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::id::Asset;
use crate::domain::opportunity::{Opportunity, Triangle};
use crate::domain::pair::PairRegistry;
use crate::domain::quote::QuoteSnapshot;
use crate::domain::rate::{self, CycleRates, Direction};
use crate::port::outbound::venue::Venue;

/// Triangles that can be formed from the registry, in registry order.
///
/// A pair `Left/Right` qualifies when `Left/Target` and `Right/Target` are
/// both listed. Pairs already quoted in the target asset never qualify.
#[must_use]
pub fn candidate_triangles(registry: &PairRegistry, target: &Asset) -> Vec<Triangle> {
    registry
        .iter()
        .filter(|pair| pair.base != *target && pair.quote != *target)
        .filter_map(|pair| {
            let left_target = registry.find(&pair.base, target)?;
            let right_target = registry.find(&pair.quote, target)?;
            Some(Triangle {
                left: pair.base.clone(),
                right: pair.quote.clone(),
                target: target.clone(),
                pair: pair.symbol.clone(),
                left_target: left_target.symbol.clone(),
                right_target: right_target.symbol.clone(),
            })
        })
        .collect()
}

/// Candidate triangles whose cross pair currently has a two-sided book.
///
/// A book that cannot be fetched marks the pair as untradeable rather than
/// failing discovery.
pub async fn discover_triangles(
    venue: &dyn Venue,
    registry: &PairRegistry,
    target: &Asset,
) -> Vec<Triangle> {
    let mut eligible = Vec::new();
    for triangle in candidate_triangles(registry, target) {
        match venue.order_book(&triangle.pair, 1).await {
            Ok(book) if book.is_two_sided() => eligible.push(triangle),
            Ok(_) => debug!(pair = %triangle.pair, "skipping pair with one-sided book"),
            Err(e) => warn!(pair = %triangle.pair, error = %e, "skipping untradeable pair"),
        }
    }
    info!(
        venue = venue.name(),
        target = %target,
        pairs = eligible.len(),
        "discovered triangles"
    );
    eligible
}

/// Both directions priced for one triangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairScan {
    pub triangle: Triangle,
    pub forward_yield: Decimal,
    pub reverse_yield: Decimal,
    /// The larger of the two; forward on a tie.
    pub direction: Direction,
    /// Prices used by `direction`.
    pub rates: CycleRates,
}

impl PairScan {
    /// Yield of the best direction, in percent.
    #[must_use]
    pub fn best_yield(&self) -> Decimal {
        match self.direction {
            Direction::Forward => self.forward_yield,
            Direction::Reverse => self.reverse_yield,
        }
    }
}

/// Result of one scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub rows: Vec<PairScan>,
    pub best: Option<Opportunity>,
    pub captured_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl ScanReport {
    /// Report for a cycle that never got a snapshot to scan.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            best: None,
            captured_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }
}

/// Prices every triangle against a snapshot and selects the best cycle.
#[derive(Debug, Clone, Default)]
pub struct OpportunityScanner {
    triangles: Vec<Triangle>,
}

impl OpportunityScanner {
    #[must_use]
    pub const fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Evaluate every triangle and pick the global maximum yield.
    ///
    /// Triangles with a missing or zero quote on any leg are skipped. On an
    /// exact tie the first triangle in discovery order wins.
    #[must_use]
    pub fn scan(&self, snapshot: &QuoteSnapshot) -> ScanReport {
        let start = Instant::now();
        let rows: Vec<PairScan> = self
            .triangles
            .par_iter()
            .filter_map(|triangle| evaluate(triangle, snapshot))
            .collect();

        let mut best: Option<&PairScan> = None;
        for row in &rows {
            if best.map_or(true, |b| row.best_yield() > b.best_yield()) {
                best = Some(row);
            }
        }

        let best = best.map(|row| {
            Opportunity::new(
                row.triangle.clone(),
                row.direction,
                row.rates,
                row.best_yield(),
                snapshot.captured_at(),
            )
        });
        let elapsed = start.elapsed();

        if let Some(ref opp) = best {
            debug!(
                pair = %opp.pair(),
                direction = %opp.direction(),
                yield_pct = %opp.yield_pct(),
                evaluated = rows.len(),
                "scan complete"
            );
        }

        ScanReport {
            rows,
            best,
            captured_at: snapshot.captured_at(),
            elapsed,
        }
    }
}

fn evaluate(triangle: &Triangle, snapshot: &QuoteSnapshot) -> Option<PairScan> {
    let lt = snapshot.get(&triangle.left_target)?;
    let rt = snapshot.get(&triangle.right_target)?;
    let lr = snapshot.get(&triangle.pair)?;
    if !(lt.is_usable() && rt.is_usable() && lr.is_usable()) {
        return None;
    }

    let forward = CycleRates {
        left_target: lt.bid,
        right_target: rt.ask,
        left_right: lr.ask,
    };
    let reverse = CycleRates {
        left_target: lt.ask,
        right_target: rt.bid,
        left_right: lr.bid,
    };
    let forward_yield = rate::cycle_yield(Direction::Forward, &forward);
    let reverse_yield = rate::cycle_yield(Direction::Reverse, &reverse);

    let (direction, rates) = if forward_yield >= reverse_yield {
        (Direction::Forward, forward)
    } else {
        (Direction::Reverse, reverse)
    };

    Some(PairScan {
        triangle: triangle.clone(),
        forward_yield,
        reverse_yield,
        direction,
        rates,
    })
}
