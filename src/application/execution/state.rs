//! Per-leg order workflow as a pure state machine.
//!
//! [`LegMachine::on_event`] takes the result of the previous command and
//! returns the next state together with the next [`Command`]. The machine
//! never touches the venue; [`super::engine::ExecutionEngine`] carries out
//! each command and feeds the result back in.
//!
//! ```text
//! Idle -> Submitted -> AwaitingStatus -+-> Resolved
//!            ^   |                     |
//!            |   +-> RecoveringBalance +-> CancellingUnfilled -> Aborted
//!            |                         |
//!            |                         +-> CancellingPartial -+-> RefreshingBook
//!            |                                                |
//!            |                       RequeryingAfterCancel <--+
//!            |                                                |
//!            +------------------ RefreshingBook <-------------+
//! ```

use std::fmt;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::application::depth::find_workable_depth;
use crate::domain::book::Book;
use crate::domain::id::{Asset, OrderId, PairSymbol};
use crate::domain::money::{Price, Quantity};
use crate::domain::order::{OrderRequest, OrderSide, OrderStatus};
use crate::domain::pair::PairMetadata;
use crate::domain::validation::{self, round_down};
use crate::error::VenueError;

/// What a leg is asked to trade.
#[derive(Debug, Clone, PartialEq)]
pub struct LegSpec {
    pub index: usize,
    pub meta: PairMetadata,
    pub side: OrderSide,
    pub price: Price,
    pub quantity: Quantity,
    /// Book depth index the price came from.
    pub depth: usize,
}

impl LegSpec {
    /// Asset this leg pays with: quote for buys, base for sells.
    #[must_use]
    pub fn spend_asset(&self) -> &Asset {
        match self.side {
            OrderSide::Buy => &self.meta.quote,
            OrderSide::Sell => &self.meta.base,
        }
    }
}

/// Bounds the retry loop of one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegLimits {
    /// Resubmissions and depth escalations allowed.
    pub max_attempts: u32,
    /// Share of the spend asset's free balance usable after a rejection.
    /// The retried order never exceeds the rejected one.
    pub reserve_factor: Decimal,
}

/// Next venue interaction the engine must perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Submit(OrderRequest),
    Query(OrderId),
    Cancel(OrderId),
    RefreshBook(PairSymbol),
    FetchBalance(Asset),
    /// The leg has reached a terminal state.
    None,
}

/// Result of the previous command.
#[derive(Debug, Clone)]
pub enum LegEvent {
    Placed(OrderId),
    Rejected(VenueError),
    Status(OrderStatus),
    /// `true` only on confirmed cancellation.
    CancelResult(bool),
    Book(Book),
    Balance(Quantity),
    /// A status, book or balance read failed.
    VenueFailed(VenueError),
}

/// Why a leg, and with it the whole cycle, was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    /// Leg 0 filled nothing and was cancelled.
    FirstLegUnfilled,
    /// A submission was rejected again after reducing it to the free balance.
    RejectedTwice,
    /// The free balance left after the reserve cannot cover a valid order.
    NoBalance,
    /// The refreshed book has no level within the pair's size bounds.
    NoWorkableDepth,
    /// The retry cap was reached with quantity still outstanding.
    AttemptsExhausted,
    /// A venue read failed mid-leg.
    VenueUnavailable,
    /// A leg resolved without producing anything to carry forward.
    NothingRealized,
    /// The next leg no longer passes validation after rescaling.
    InvalidAfterAdjustment,
    /// The workflow received an event it had no transition for.
    Interrupted,
}

impl fmt::Display for LossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FirstLegUnfilled => "first leg unfilled and cancelled",
            Self::RejectedTwice => "order rejected after balance reduction",
            Self::NoBalance => "no balance available",
            Self::NoWorkableDepth => "no workable book depth",
            Self::AttemptsExhausted => "retry cap reached with remainder outstanding",
            Self::VenueUnavailable => "venue unavailable",
            Self::NothingRealized => "leg realized nothing",
            Self::InvalidAfterAdjustment => "next leg invalid after rescaling",
            Self::Interrupted => "leg workflow interrupted",
        };
        f.write_str(text)
    }
}

/// Terminal result of one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegResolution {
    /// The leg finished; `realized` is base filled for buys, quote proceeds for sells.
    Resolved { realized: Quantity },
    Lost(LossReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegPhase {
    Idle,
    /// Waiting for the venue to accept or reject a submission.
    Submitted,
    /// Waiting for the free balance after a rejection.
    RecoveringBalance,
    AwaitingStatus,
    /// Leg 0 filled nothing; waiting for the cancel result.
    CancellingUnfilled,
    /// Order incomplete or a remainder is outstanding; waiting for the cancel result.
    CancellingPartial,
    /// Cancel failed; waiting for the order's final status.
    RequeryingAfterCancel,
    RefreshingBook,
    Resolved,
    Aborted(LossReason),
}

/// State of one leg's order workflow.
#[derive(Debug, Clone)]
pub struct LegMachine {
    spec: LegSpec,
    limits: LegLimits,
    phase: LegPhase,
    request: OrderRequest,
    order_id: Option<OrderId>,
    /// Quantity the current order was placed for.
    order_qty: Quantity,
    order_filled: Quantity,
    /// Result already credited from the current order.
    order_realized: Quantity,
    realized: Quantity,
    /// Quantity the next order should cover.
    need: Quantity,
    /// Quantity owed that the current book level could not absorb.
    remainder: Quantity,
    depth: usize,
    partially_filled: bool,
    /// Leg 0's unfilled-cancel already failed once.
    first_leg_settled: bool,
    /// Order filled completely but a remainder is still owed.
    override_remainder: bool,
    /// Level size last found unusable at the current depth.
    invalid_seen: Option<Quantity>,
    /// Current submission already retried with the free balance.
    reduced: bool,
    attempts: u32,
}

impl LegMachine {
    #[must_use]
    pub fn new(spec: LegSpec, limits: LegLimits) -> Self {
        let request = OrderRequest {
            pair: spec.meta.symbol.clone(),
            side: spec.side,
            quantity: spec.quantity,
            price: spec.price,
        };
        Self {
            need: spec.quantity,
            depth: spec.depth,
            spec,
            limits,
            phase: LegPhase::Idle,
            request,
            order_id: None,
            order_qty: Quantity::ZERO,
            order_filled: Quantity::ZERO,
            order_realized: Quantity::ZERO,
            realized: Quantity::ZERO,
            remainder: Quantity::ZERO,
            partially_filled: false,
            first_leg_settled: false,
            override_remainder: false,
            invalid_seen: None,
            reduced: false,
            attempts: 0,
        }
    }

    /// Submit the planned order.
    #[must_use]
    pub fn start(mut self) -> (Self, Command) {
        self.phase = LegPhase::Submitted;
        let request = self.request.clone();
        (self, Command::Submit(request))
    }

    #[must_use]
    pub const fn phase(&self) -> LegPhase {
        self.phase
    }

    #[must_use]
    pub const fn spec(&self) -> &LegSpec {
        &self.spec
    }

    /// Total result credited across every order of this leg.
    #[must_use]
    pub const fn realized(&self) -> Quantity {
        self.realized
    }

    #[must_use]
    pub const fn remainder(&self) -> Quantity {
        self.remainder
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn is_partially_filled(&self) -> bool {
        self.partially_filled
    }

    #[must_use]
    pub const fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    /// Terminal outcome, once reached.
    #[must_use]
    pub const fn resolution(&self) -> Option<LegResolution> {
        match self.phase {
            LegPhase::Resolved => Some(LegResolution::Resolved {
                realized: self.realized,
            }),
            LegPhase::Aborted(reason) => Some(LegResolution::Lost(reason)),
            _ => None,
        }
    }

    /// Advance on the result of the previous command.
    #[must_use]
    pub fn on_event(mut self, event: LegEvent) -> (Self, Command) {
        match (self.phase, event) {
            (LegPhase::Submitted, LegEvent::Placed(id)) => {
                self.order_id = Some(id.clone());
                self.order_qty = self.request.quantity;
                self.order_filled = Quantity::ZERO;
                self.order_realized = Quantity::ZERO;
                self.phase = LegPhase::AwaitingStatus;
                (self, Command::Query(id))
            }
            (LegPhase::Submitted, LegEvent::Rejected(err)) => self.on_rejected(&err),
            (LegPhase::RecoveringBalance, LegEvent::Balance(available)) => self.on_balance(available),
            (LegPhase::AwaitingStatus, LegEvent::Status(status)) => {
                self.credit(&status);
                self.evaluate()
            }
            (LegPhase::CancellingUnfilled, LegEvent::CancelResult(true)) => {
                info!(leg = self.spec.index, pair = %self.request.pair, "first leg unfilled, arbitrage lost");
                self.abort(LossReason::FirstLegUnfilled)
            }
            (LegPhase::CancellingUnfilled, LegEvent::CancelResult(false)) => {
                debug!(leg = self.spec.index, "cancel failed, order likely filled concurrently");
                self.first_leg_settled = true;
                self.query_current(LegPhase::AwaitingStatus)
            }
            (LegPhase::CancellingPartial, LegEvent::CancelResult(true)) => {
                if self.override_remainder {
                    self.override_remainder = false;
                    self.need = self.remainder;
                    self.remainder = Quantity::ZERO;
                } else {
                    self.need = self.order_qty - self.order_filled;
                }
                debug!(leg = self.spec.index, need = %self.need, "order cancelled, refreshing book");
                self.refresh_book()
            }
            (LegPhase::CancellingPartial, LegEvent::CancelResult(false)) => {
                self.query_current(LegPhase::RequeryingAfterCancel)
            }
            (LegPhase::RequeryingAfterCancel, LegEvent::Status(status)) => {
                self.credit(&status);
                self.after_failed_cancel()
            }
            (LegPhase::RefreshingBook, LegEvent::Book(book)) => self.on_book(&book),
            (
                LegPhase::AwaitingStatus
                | LegPhase::RequeryingAfterCancel
                | LegPhase::RefreshingBook
                | LegPhase::RecoveringBalance,
                LegEvent::VenueFailed(err),
            ) => {
                warn!(leg = self.spec.index, pair = %self.request.pair, error = %err, "venue read failed");
                self.abort(LossReason::VenueUnavailable)
            }
            (phase, event) => {
                warn!(leg = self.spec.index, ?phase, ?event, "no transition for event");
                self.abort(LossReason::Interrupted)
            }
        }
    }

    /// Credit the result of a status report by delta, so re-querying the
    /// same order never counts its fills twice.
    fn credit(&mut self, status: &OrderStatus) {
        let produced = status.resulting_qty();
        if produced > self.order_realized {
            self.realized += produced - self.order_realized;
            self.order_realized = produced;
        }
        self.order_filled = status.filled_qty;
        self.order_qty = status.original_qty;
    }

    fn evaluate(mut self) -> (Self, Command) {
        let Some(id) = self.order_id.clone() else {
            return self.abort(LossReason::Interrupted);
        };

        if self.spec.index == 0
            && self.order_filled.is_zero()
            && !self.partially_filled
            && !self.first_leg_settled
        {
            self.phase = LegPhase::CancellingUnfilled;
            return (self, Command::Cancel(id));
        }

        if self.order_filled < self.order_qty {
            self.partially_filled = true;
            debug!(
                leg = self.spec.index,
                filled = %self.order_filled,
                requested = %self.order_qty,
                "incomplete order, cancelling"
            );
            self.phase = LegPhase::CancellingPartial;
            return (self, Command::Cancel(id));
        }

        if self.remainder > Quantity::ZERO {
            debug!(leg = self.spec.index, remainder = %self.remainder, "order filled, remainder still owed");
            self.override_remainder = true;
            self.phase = LegPhase::CancellingPartial;
            return (self, Command::Cancel(id));
        }

        self.resolve()
    }

    fn after_failed_cancel(mut self) -> (Self, Command) {
        self.override_remainder = false;
        if self.remainder.is_zero() {
            debug!(leg = self.spec.index, "order completed while cancelling");
            return self.resolve();
        }

        self.need = self.remainder;
        self.remainder = Quantity::ZERO;
        let checked = validation::validate(&self.spec.meta, self.request.price, self.need);
        if !checked.valid {
            debug!(leg = self.spec.index, need = %self.need, "remainder too small to place");
            return self.resolve();
        }
        self.refresh_book()
    }

    fn on_book(mut self, book: &Book) -> (Self, Command) {
        let levels = book.levels_for(self.spec.side);
        let Some(depth) = find_workable_depth(levels, self.depth, &self.spec.meta) else {
            info!(leg = self.spec.index, pair = %self.request.pair, "no workable depth left");
            return self.abort(LossReason::NoWorkableDepth);
        };
        self.depth = depth;
        let level = &levels[depth];
        let available = level.size();

        if self.invalid_seen == Some(available) {
            self.invalid_seen = None;
            self.depth += 1;
            debug!(leg = self.spec.index, depth = self.depth, "same unusable level, escalating depth");
            return self.retry_book();
        }

        if self.need > available {
            self.remainder += self.need - available;
            self.need = available;
        } else if available >= self.need + self.remainder {
            self.need += self.remainder;
            self.remainder = Quantity::ZERO;
        } else {
            let absorbed = available - self.need;
            self.remainder -= absorbed;
            self.need = available;
        }

        let checked = validation::validate(&self.spec.meta, level.price(), self.need);
        if !checked.valid {
            self.invalid_seen = Some(available);
            if self.remainder.is_zero() {
                debug!(leg = self.spec.index, need = %self.need, "resubmission invalid, nothing owed");
                return self.resolve();
            }
            return self.retry_book();
        }

        if !self.count_attempt() {
            return self.abort(LossReason::AttemptsExhausted);
        }
        self.need = checked.quantity;
        self.request = OrderRequest {
            pair: self.spec.meta.symbol.clone(),
            side: self.spec.side,
            quantity: checked.quantity,
            price: checked.price,
        };
        self.reduced = false;
        self.phase = LegPhase::Submitted;
        info!(
            leg = self.spec.index,
            pair = %self.request.pair,
            qty = %self.request.quantity,
            price = %self.request.price,
            remainder = %self.remainder,
            "resubmitting"
        );
        let request = self.request.clone();
        (self, Command::Submit(request))
    }

    fn on_rejected(mut self, err: &VenueError) -> (Self, Command) {
        if !self.reduced {
            info!(leg = self.spec.index, error = %err, "order rejected, retrying with free balance");
            self.reduced = true;
            self.phase = LegPhase::RecoveringBalance;
            let asset = self.spec.spend_asset().clone();
            return (self, Command::FetchBalance(asset));
        }
        if *err == VenueError::BelowMinimumSize {
            info!(leg = self.spec.index, "order below minimum size, continuing");
            return self.resolve();
        }
        warn!(leg = self.spec.index, error = %err, "reduced order rejected");
        self.abort(LossReason::RejectedTwice)
    }

    fn on_balance(mut self, available: Quantity) -> (Self, Command) {
        let in_base = match self.spec.side {
            OrderSide::Sell => available,
            OrderSide::Buy if self.request.price > Price::ZERO => available / self.request.price,
            OrderSide::Buy => Quantity::ZERO,
        };
        let affordable = round_down(in_base * self.limits.reserve_factor, self.spec.meta.qty_precision);
        let quantity = self.request.quantity.min(affordable);
        if quantity <= Quantity::ZERO {
            warn!(leg = self.spec.index, asset = %self.spec.spend_asset(), "no free balance to retry with");
            return self.abort(LossReason::NoBalance);
        }

        let checked = validation::validate(&self.spec.meta, self.request.price, quantity);
        if !checked.valid {
            if self.realized > Quantity::ZERO && self.remainder.is_zero() {
                debug!(leg = self.spec.index, qty = %checked.quantity, "reduced order too small, keeping realized");
                return self.resolve();
            }
            warn!(leg = self.spec.index, qty = %checked.quantity, "reduced order fails size rules");
            return self.abort(LossReason::NoBalance);
        }
        debug!(leg = self.spec.index, qty = %checked.quantity, "retrying with reduced quantity");
        self.request.quantity = checked.quantity;
        self.request.price = checked.price;
        self.phase = LegPhase::Submitted;
        let request = self.request.clone();
        (self, Command::Submit(request))
    }

    fn count_attempt(&mut self) -> bool {
        self.attempts += 1;
        self.attempts <= self.limits.max_attempts
    }

    fn retry_book(mut self) -> (Self, Command) {
        if !self.count_attempt() {
            warn!(leg = self.spec.index, attempts = self.attempts, "retry cap reached");
            return self.abort(LossReason::AttemptsExhausted);
        }
        self.refresh_book()
    }

    fn refresh_book(mut self) -> (Self, Command) {
        self.phase = LegPhase::RefreshingBook;
        let pair = self.spec.meta.symbol.clone();
        (self, Command::RefreshBook(pair))
    }

    fn query_current(mut self, phase: LegPhase) -> (Self, Command) {
        match self.order_id.clone() {
            Some(id) => {
                self.phase = phase;
                (self, Command::Query(id))
            }
            None => self.abort(LossReason::Interrupted),
        }
    }

    fn resolve(mut self) -> (Self, Command) {
        self.phase = LegPhase::Resolved;
        (self, Command::None)
    }

    fn abort(mut self, reason: LossReason) -> (Self, Command) {
        self.phase = LegPhase::Aborted(reason);
        (self, Command::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::PriceLevel;
    use crate::testkit::domain::{order_status, pair_meta};
    use rust_decimal_macros::dec;

    fn spec(index: usize, side: OrderSide, qty: Quantity) -> LegSpec {
        LegSpec {
            index,
            meta: pair_meta("ETHBTC", "ETH", "BTC"),
            side,
            price: dec!(0.0668),
            quantity: qty,
            depth: 0,
        }
    }

    fn limits() -> LegLimits {
        LegLimits {
            max_attempts: 5,
            reserve_factor: dec!(0.995),
        }
    }

    fn placed(leg: usize, side: OrderSide, qty: Quantity) -> LegMachine {
        let (m, _) = LegMachine::new(spec(leg, side, qty), limits()).start();
        let (m, cmd) = m.on_event(LegEvent::Placed(OrderId::new("o-1")));
        assert_eq!(cmd, Command::Query(OrderId::new("o-1")));
        m
    }

    fn ask_book(levels: &[(Decimal, Decimal)]) -> Book {
        Book::with_levels(
            PairSymbol::new("ETHBTC"),
            vec![PriceLevel::new(dec!(0.0667), dec!(100))],
            levels.iter().map(|&(p, s)| PriceLevel::new(p, s)).collect(),
        )
    }

    #[test]
    fn start_submits_planned_order() {
        let (m, cmd) = LegMachine::new(spec(0, OrderSide::Buy, dec!(10)), limits()).start();
        assert_eq!(m.phase(), LegPhase::Submitted);
        match cmd {
            Command::Submit(req) => {
                assert_eq!(req.quantity, dec!(10));
                assert_eq!(req.price, dec!(0.0668));
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn full_fill_resolves_with_realized_base() {
        let m = placed(1, OrderSide::Buy, dec!(10));
        let (m, cmd) = m.on_event(LegEvent::Status(order_status("o-1", OrderSide::Buy, dec!(10), dec!(10))));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.resolution(), Some(LegResolution::Resolved { realized: dec!(10) }));
    }

    #[test]
    fn unfilled_first_leg_is_lost_when_cancel_succeeds() {
        let m = placed(0, OrderSide::Buy, dec!(10));
        let (m, cmd) = m.on_event(LegEvent::Status(order_status("o-1", OrderSide::Buy, dec!(10), dec!(0))));
        assert_eq!(cmd, Command::Cancel(OrderId::new("o-1")));
        let (m, cmd) = m.on_event(LegEvent::CancelResult(true));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.resolution(), Some(LegResolution::Lost(LossReason::FirstLegUnfilled)));
    }

    #[test]
    fn failed_first_leg_cancel_uses_latest_status_once() {
        let m = placed(0, OrderSide::Buy, dec!(10));
        let (m, _) = m.on_event(LegEvent::Status(order_status("o-1", OrderSide::Buy, dec!(10), dec!(0))));
        let (m, cmd) = m.on_event(LegEvent::CancelResult(false));
        assert_eq!(cmd, Command::Query(OrderId::new("o-1")));
        let (m, cmd) = m.on_event(LegEvent::Status(order_status("o-1", OrderSide::Buy, dec!(10), dec!(10))));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.realized(), dec!(10));
    }

    #[test]
    fn partial_fill_cancels_refreshes_and_resubmits_remainder() {
        let m = placed(0, OrderSide::Buy, dec!(10));
        let (m, cmd) = m.on_event(LegEvent::Status(order_status("o-1", OrderSide::Buy, dec!(10), dec!(6))));
        assert_eq!(cmd, Command::Cancel(OrderId::new("o-1")));
        assert!(m.is_partially_filled());
        let (m, cmd) = m.on_event(LegEvent::CancelResult(true));
        assert_eq!(cmd, Command::RefreshBook(PairSymbol::new("ETHBTC")));
        let (m, cmd) = m.on_event(LegEvent::Book(ask_book(&[(dec!(0.0669), dec!(50))])));
        match cmd {
            Command::Submit(req) => {
                assert_eq!(req.quantity, dec!(4));
                assert_eq!(req.price, dec!(0.0669));
            }
            other => panic!("expected resubmit, got {other:?}"),
        }
        let (m, _) = m.on_event(LegEvent::Placed(OrderId::new("o-2")));
        let (m, cmd) = m.on_event(LegEvent::Status(order_status("o-2", OrderSide::Buy, dec!(4), dec!(4))));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.resolution(), Some(LegResolution::Resolved { realized: dec!(10) }));
    }

    #[test]
    fn thin_level_carries_remainder_into_next_order() {
        let m = placed(1, OrderSide::Buy, dec!(10));
        let (m, _) = m.on_event(LegEvent::Status(order_status("o-1", OrderSide::Buy, dec!(10), dec!(4))));
        let (m, _) = m.on_event(LegEvent::CancelResult(true));
        let (m, cmd) = m.on_event(LegEvent::Book(ask_book(&[(dec!(0.0669), dec!(2))])));
        assert!(matches!(cmd, Command::Submit(ref r) if r.quantity == dec!(2)));
        assert_eq!(m.remainder(), dec!(4));

        let (m, _) = m.on_event(LegEvent::Placed(OrderId::new("o-2")));
        let (m, cmd) = m.on_event(LegEvent::Status(order_status("o-2", OrderSide::Buy, dec!(2), dec!(2))));
        // filled, but 4 still owed
        assert_eq!(cmd, Command::Cancel(OrderId::new("o-2")));
        let (m, cmd) = m.on_event(LegEvent::CancelResult(false));
        assert_eq!(cmd, Command::Query(OrderId::new("o-2")));
        let (m, cmd) = m.on_event(LegEvent::Status(order_status("o-2", OrderSide::Buy, dec!(2), dec!(2))));
        assert_eq!(cmd, Command::RefreshBook(PairSymbol::new("ETHBTC")));
        let (m, cmd) = m.on_event(LegEvent::Book(ask_book(&[(dec!(0.0669), dec!(50))])));
        assert!(matches!(cmd, Command::Submit(ref r) if r.quantity == dec!(4)));
        assert_eq!(m.remainder(), Decimal::ZERO);
        assert_eq!(m.realized(), dec!(6));
    }

    fn notional_limited(max_attempts: u32) -> LegMachine {
        let mut leg = spec(1, OrderSide::Buy, dec!(10));
        leg.meta.min_notional = Some(dec!(0.3));
        let limits = LegLimits {
            max_attempts,
            reserve_factor: Decimal::ONE,
        };
        let (m, _) = LegMachine::new(leg, limits).start();
        let (m, _) = m.on_event(LegEvent::Placed(OrderId::new("o-1")));
        m
    }

    #[test]
    fn invalid_resubmission_with_nothing_owed_resolves() {
        let m = notional_limited(5);
        let (m, _) = m.on_event(LegEvent::Status(order_status("o-1", OrderSide::Buy, dec!(10), dec!(9.5))));
        let (m, _) = m.on_event(LegEvent::CancelResult(true));
        // 0.5 at 0.0669 is below the 0.3 minimum notional
        let (m, cmd) = m.on_event(LegEvent::Book(ask_book(&[(dec!(0.0669), dec!(3))])));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.resolution(), Some(LegResolution::Resolved { realized: dec!(9.5) }));
    }

    #[test]
    fn unchanged_invalid_level_escalates_depth() {
        let m = notional_limited(5);
        let (m, _) = m.on_event(LegEvent::Status(order_status("o-1", OrderSide::Buy, dec!(10), dec!(5))));
        let (m, cmd) = m.on_event(LegEvent::CancelResult(true));
        assert_eq!(cmd, Command::RefreshBook(PairSymbol::new("ETHBTC")));

        let thin = ask_book(&[(dec!(0.0669), dec!(2)), (dec!(0.0671), dec!(20))]);
        // Level 0 takes 2 of the 5 owed, which is below the minimum notional.
        let (m, cmd) = m.on_event(LegEvent::Book(thin.clone()));
        assert_eq!(cmd, Command::RefreshBook(PairSymbol::new("ETHBTC")));
        assert_eq!(m.depth(), 0);
        assert_eq!(m.remainder(), dec!(3));

        // Same level again: move one level deeper instead of resubmitting.
        let (m, cmd) = m.on_event(LegEvent::Book(thin.clone()));
        assert_eq!(cmd, Command::RefreshBook(PairSymbol::new("ETHBTC")));
        assert_eq!(m.depth(), 1);

        let (m, cmd) = m.on_event(LegEvent::Book(thin));
        assert!(matches!(cmd, Command::Submit(ref r) if r.quantity == dec!(5) && r.price == dec!(0.0671)));
        assert_eq!(m.remainder(), Decimal::ZERO);
        assert_eq!(m.attempts(), 3);
    }

    #[test]
    fn retry_cap_loses_leg_with_remainder_outstanding() {
        let m = notional_limited(1);
        let (m, _) = m.on_event(LegEvent::Status(order_status("o-1", OrderSide::Buy, dec!(10), dec!(5))));
        let (m, _) = m.on_event(LegEvent::CancelResult(true));
        let thin = ask_book(&[(dec!(0.0669), dec!(2))]);
        let (m, cmd) = m.on_event(LegEvent::Book(thin.clone()));
        assert_eq!(cmd, Command::RefreshBook(PairSymbol::new("ETHBTC")));
        let (m, cmd) = m.on_event(LegEvent::Book(thin));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.resolution(), Some(LegResolution::Lost(LossReason::AttemptsExhausted)));
    }

    #[test]
    fn rejection_retries_once_with_reserved_balance() {
        let (m, _) = LegMachine::new(spec(2, OrderSide::Sell, dec!(10)), limits()).start();
        let (m, cmd) = m.on_event(LegEvent::Rejected(VenueError::InsufficientBalance {
            asset: "ETH".into(),
        }));
        assert_eq!(cmd, Command::FetchBalance(Asset::new("ETH")));
        let (m, cmd) = m.on_event(LegEvent::Balance(dec!(8)));
        // 8 * 0.995 = 7.96, rounded down to 4 places
        assert!(matches!(cmd, Command::Submit(ref r) if r.quantity == dec!(7.96)));
        let (m, cmd) = m.on_event(LegEvent::Rejected(VenueError::Rejected("nope".into())));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.resolution(), Some(LegResolution::Lost(LossReason::RejectedTwice)));
    }

    #[test]
    fn rejection_retry_never_exceeds_rejected_quantity() {
        let (m, _) = LegMachine::new(spec(1, OrderSide::Sell, dec!(10)), limits()).start();
        let (m, cmd) = m.on_event(LegEvent::Rejected(VenueError::Rejected("transient".into())));
        assert_eq!(cmd, Command::FetchBalance(Asset::new("ETH")));
        let (_, cmd) = m.on_event(LegEvent::Balance(dec!(5000)));
        assert!(matches!(cmd, Command::Submit(ref r) if r.quantity == dec!(10)));
    }

    #[test]
    fn reduced_quantity_failing_size_rules_loses_leg() {
        let mut leg = spec(1, OrderSide::Sell, dec!(10));
        leg.meta.min_qty = dec!(1);
        let (m, _) = LegMachine::new(leg, limits()).start();
        let (m, _) = m.on_event(LegEvent::Rejected(VenueError::Rejected("x".into())));
        // 0.9 * 0.995 = 0.8955, below the 1 ETH minimum
        let (m, cmd) = m.on_event(LegEvent::Balance(dec!(0.9)));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.resolution(), Some(LegResolution::Lost(LossReason::NoBalance)));
    }

    #[test]
    fn failed_cancel_with_unplaceable_remainder_resolves_with_realized() {
        let mut leg = spec(1, OrderSide::Buy, dec!(10));
        leg.meta.min_qty = dec!(1);
        let (m, _) = LegMachine::new(leg, limits()).start();
        let (m, _) = m.on_event(LegEvent::Placed(OrderId::new("o-1")));
        let (m, _) = m.on_event(LegEvent::Status(order_status("o-1", OrderSide::Buy, dec!(10), dec!(4))));
        let (m, _) = m.on_event(LegEvent::CancelResult(true));
        // the level holds 5.5 of the 6 owed
        let (m, cmd) = m.on_event(LegEvent::Book(ask_book(&[(dec!(0.0669), dec!(5.5))])));
        assert!(matches!(cmd, Command::Submit(ref r) if r.quantity == dec!(5.5)));
        assert_eq!(m.remainder(), dec!(0.5));

        let (m, _) = m.on_event(LegEvent::Placed(OrderId::new("o-2")));
        let (m, cmd) = m.on_event(LegEvent::Status(order_status("o-2", OrderSide::Buy, dec!(5.5), dec!(5))));
        assert_eq!(cmd, Command::Cancel(OrderId::new("o-2")));
        let (m, cmd) = m.on_event(LegEvent::CancelResult(false));
        assert_eq!(cmd, Command::Query(OrderId::new("o-2")));

        // 0.5 still owed is below the 1 ETH minimum
        let (m, cmd) = m.on_event(LegEvent::Status(order_status("o-2", OrderSide::Buy, dec!(5.5), dec!(5))));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.resolution(), Some(LegResolution::Resolved { realized: dec!(9) }));
        assert_eq!(m.remainder(), Decimal::ZERO);
    }

    #[test]
    fn second_below_minimum_rejection_is_a_no_op() {
        let (m, _) = LegMachine::new(spec(2, OrderSide::Sell, dec!(10)), limits()).start();
        let (m, _) = m.on_event(LegEvent::Rejected(VenueError::BelowMinimumSize));
        let (m, _) = m.on_event(LegEvent::Balance(dec!(0.5)));
        let (m, cmd) = m.on_event(LegEvent::Rejected(VenueError::BelowMinimumSize));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.resolution(), Some(LegResolution::Resolved { realized: Decimal::ZERO }));
    }

    #[test]
    fn empty_balance_loses_leg() {
        let (m, _) = LegMachine::new(spec(1, OrderSide::Buy, dec!(10)), limits()).start();
        let (m, cmd) = m.on_event(LegEvent::Rejected(VenueError::Rejected("x".into())));
        assert_eq!(cmd, Command::FetchBalance(Asset::new("BTC")));
        let (m, _) = m.on_event(LegEvent::Balance(Decimal::ZERO));
        assert_eq!(m.resolution(), Some(LegResolution::Lost(LossReason::NoBalance)));
    }

    #[test]
    fn repeated_status_is_not_double_counted() {
        let m = placed(1, OrderSide::Sell, dec!(10));
        let mut status = order_status("o-1", OrderSide::Sell, dec!(10), dec!(6));
        status.realized_proceeds = dec!(0.4);
        let (m, _) = m.on_event(LegEvent::Status(status.clone()));
        let (m, _) = m.on_event(LegEvent::CancelResult(false));
        status.realized_proceeds = dec!(0.5);
        status.filled_qty = dec!(7);
        let (m, cmd) = m.on_event(LegEvent::Status(status));
        assert_eq!(cmd, Command::None);
        assert_eq!(m.realized(), dec!(0.5));
    }

    #[test]
    fn venue_failure_mid_leg_is_lost() {
        let m = placed(1, OrderSide::Buy, dec!(10));
        let (m, _) = m.on_event(LegEvent::VenueFailed(VenueError::Connectivity("timeout".into())));
        assert_eq!(m.resolution(), Some(LegResolution::Lost(LossReason::VenueUnavailable)));
    }
}
