//! Drives a trade plan through the venue, one leg at a time.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::state::{Command, LegEvent, LegLimits, LegMachine, LegResolution, LegSpec, LossReason};
use crate::application::params::TradingParams;
use crate::domain::money::Quantity;
use crate::domain::order::{ExecutedOrder, OrderSide, ProfitReport};
use crate::domain::pair::PairRegistry;
use crate::domain::plan::{PlanLeg, TradePlan};
use crate::domain::validation::{self, round_down};
use crate::port::outbound::venue::Venue;

/// Everything one plan execution produced.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// One row per order placed, with its latest known status.
    pub orders: Vec<ExecutedOrder>,
    pub report: ProfitReport,
    /// Set when the cycle was abandoned.
    pub lost: Option<LossReason>,
}

impl CycleOutcome {
    #[must_use]
    pub const fn is_lost(&self) -> bool {
        self.lost.is_some()
    }
}

/// Executes plans leg by leg, rescaling each leg to what the previous one
/// actually produced.
pub struct ExecutionEngine {
    venue: Arc<dyn Venue>,
    registry: Arc<PairRegistry>,
    params: TradingParams,
}

impl ExecutionEngine {
    #[must_use]
    pub fn new(venue: Arc<dyn Venue>, registry: Arc<PairRegistry>, params: TradingParams) -> Self {
        Self {
            venue,
            registry,
            params,
        }
    }

    /// Run all three legs of `plan`.
    ///
    /// A lost leg ends the cycle immediately; no further leg is submitted
    /// and the report carries zero profit.
    pub async fn execute(&self, plan: &TradePlan) -> CycleOutcome {
        let scan_id = plan.scan_id();
        let mut orders = Vec::new();
        let mut next: PlanLeg = plan.legs()[0].clone();
        let mut realized = Quantity::ZERO;

        info!(
            scan_id,
            pair = %plan.opportunity().pair(),
            direction = %plan.opportunity().direction(),
            yield_pct = %plan.yield_pct(),
            tradable = %plan.tradable(),
            "executing plan"
        );

        for index in 0..3 {
            let planned = &plan.legs()[index];
            match self.run_leg(scan_id, &next, &mut orders).await {
                LegResolution::Resolved { realized: got } => realized = got,
                LegResolution::Lost(reason) => return self.lost(plan, orders, reason),
            }
            debug!(scan_id, leg = index, realized = %realized, "leg resolved");

            if index == 2 {
                break;
            }
            if realized.is_zero() {
                info!(scan_id, leg = index, "leg produced nothing, arbitrage lost");
                return self.lost(plan, orders, LossReason::NothingRealized);
            }

            let following = plan.legs()[index + 1].clone();
            match self.rescale(planned, following, realized) {
                Some(leg) => next = leg,
                None => return self.lost(plan, orders, LossReason::InvalidAfterAdjustment),
            }
        }

        let ending = realized + plan.unused_target();
        let report = ProfitReport::completed(
            scan_id,
            plan.tradable(),
            ending,
            self.params.target.clone(),
        );
        info!(
            scan_id,
            starting = %report.starting_qty,
            ending = %ending,
            profit = %report.profit,
            asset = %report.asset,
            "cycle complete"
        );
        CycleOutcome {
            orders,
            report,
            lost: None,
        }
    }

    fn lost(&self, plan: &TradePlan, orders: Vec<ExecutedOrder>, reason: LossReason) -> CycleOutcome {
        warn!(scan_id = plan.scan_id(), %reason, "arbitrage lost");
        CycleOutcome {
            orders,
            report: ProfitReport::lost(
                plan.scan_id(),
                plan.tradable(),
                self.params.target.clone(),
            ),
            lost: Some(reason),
        }
    }

    /// Scale `following` by how far `realized` strayed from what `planned`
    /// was expected to produce. Returns `None` when the scaled leg fails
    /// validation.
    fn rescale(&self, planned: &PlanLeg, mut following: PlanLeg, realized: Quantity) -> Option<PlanLeg> {
        let meta = self.registry.get(&planned.pair)?;
        let expected = match planned.side {
            OrderSide::Buy => round_down(planned.quantity, meta.qty_precision),
            OrderSide::Sell => round_down(planned.quantity * planned.price, meta.quote_precision),
        };
        if expected.is_zero() || expected == realized {
            return Some(following);
        }

        let next_meta = self.registry.get(&following.pair)?;
        let scaled = following.quantity * realized / expected;
        let checked = validation::validate(next_meta, following.price, scaled);
        debug!(
            leg = following.index,
            expected = %expected,
            realized = %realized,
            qty = %checked.quantity,
            "rescaled next leg"
        );
        if !checked.valid {
            info!(leg = following.index, qty = %checked.quantity, "rescaled leg fails size rules");
            return None;
        }
        following.quantity = checked.quantity;
        following.price = checked.price;
        Some(following)
    }

    async fn run_leg(&self, scan_id: u64, leg: &PlanLeg, orders: &mut Vec<ExecutedOrder>) -> LegResolution {
        let Some(meta) = self.registry.get(&leg.pair).cloned() else {
            warn!(pair = %leg.pair, "leg pair missing from registry");
            return LegResolution::Lost(LossReason::Interrupted);
        };
        let spec = LegSpec {
            index: leg.index,
            meta,
            side: leg.side,
            price: leg.price,
            quantity: leg.quantity,
            depth: leg.depth,
        };
        let limits = LegLimits {
            max_attempts: self.params.max_leg_attempts,
            reserve_factor: self.params.reserve_factor(spec.spend_asset()),
        };

        let (mut machine, mut command) = LegMachine::new(spec, limits).start();
        loop {
            let event = match command {
                Command::None => break,
                Command::Submit(request) => {
                    debug!(leg = leg.index, pair = %request.pair, side = %request.side, qty = %request.quantity, price = %request.price, "submitting order");
                    match self.venue.place_limit_order(&request).await {
                        Ok(id) => {
                            orders.push(ExecutedOrder::placed(scan_id, leg.index, id.clone(), &request));
                            LegEvent::Placed(id)
                        }
                        Err(e) => LegEvent::Rejected(e),
                    }
                }
                Command::Query(id) => match self.venue.order_status(&id).await {
                    Ok(status) => {
                        let row = ExecutedOrder::from_status(scan_id, leg.index, &status);
                        match orders.iter_mut().rev().find(|o| o.order_id == id) {
                            Some(existing) => *existing = row,
                            None => orders.push(row),
                        }
                        LegEvent::Status(status)
                    }
                    Err(e) => LegEvent::VenueFailed(e),
                },
                Command::Cancel(id) => {
                    tokio::time::sleep(self.params.settle_delay).await;
                    match self.venue.cancel_order(&id).await {
                        Ok(cancelled) => LegEvent::CancelResult(cancelled),
                        Err(e) => {
                            debug!(order_id = %id, error = %e, "cancel failed");
                            LegEvent::CancelResult(false)
                        }
                    }
                }
                Command::RefreshBook(pair) => match self.venue.order_book(&pair, self.params.book_depth).await {
                    Ok(book) => LegEvent::Book(book),
                    Err(e) => LegEvent::VenueFailed(e),
                },
                Command::FetchBalance(asset) => match self.venue.available_balance(&asset).await {
                    Ok(free) => LegEvent::Balance(free),
                    Err(e) => LegEvent::VenueFailed(e),
                },
            };
            (machine, command) = machine.on_event(event);
        }

        machine
            .resolution()
            .unwrap_or(LegResolution::Lost(LossReason::Interrupted))
    }
}
