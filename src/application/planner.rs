//! Turns an opportunity into a sized, validated three-leg plan.
//!
//! The builder refetches each leg's book, picks the first workable depth
//! level per leg, re-prices the cycle and re-applies the profitability gate.
//! Quantities are then bounded by the scarcest leg's liquidity and by the
//! tradable settlement balance.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::depth::find_workable_depth;
use super::gate::ProfitabilityGate;
use super::params::TradingParams;
use crate::domain::id::PairSymbol;
use crate::domain::money::{Price, Quantity};
use crate::domain::opportunity::{Opportunity, Triangle};
use crate::domain::order::OrderSide;
use crate::domain::pair::{PairMetadata, PairRegistry};
use crate::domain::plan::{PlanLeg, TradePlan};
use crate::domain::rate::{self, CycleRates, Direction};
use crate::domain::validation;
use crate::error::PlanError;
use crate::port::outbound::venue::Venue;

/// Which triangle pair a leg trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    LeftTarget,
    RightTarget,
    LeftRight,
}

/// Leg order and sides for each direction.
fn layout(direction: Direction) -> [(Role, OrderSide); 3] {
    match direction {
        Direction::Forward => [
            (Role::RightTarget, OrderSide::Buy),
            (Role::LeftRight, OrderSide::Buy),
            (Role::LeftTarget, OrderSide::Sell),
        ],
        Direction::Reverse => [
            (Role::LeftTarget, OrderSide::Buy),
            (Role::LeftRight, OrderSide::Sell),
            (Role::RightTarget, OrderSide::Sell),
        ],
    }
}

fn symbol_for(triangle: &Triangle, role: Role) -> &PairSymbol {
    match role {
        Role::LeftTarget => &triangle.left_target,
        Role::RightTarget => &triangle.right_target,
        Role::LeftRight => &triangle.pair,
    }
}

/// Live price and size chosen for one leg.
#[derive(Debug, Clone)]
struct LegQuote {
    role: Role,
    side: OrderSide,
    meta: PairMetadata,
    price: Price,
    size: Quantity,
    depth: usize,
}

/// Per-leg quantity ceilings in each leg's own units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ceilings {
    pub left_target: Quantity,
    pub right_target: Quantity,
    pub left_right: Quantity,
}

impl Ceilings {
    fn for_role(&self, role: Role) -> Quantity {
        match role {
            Role::LeftTarget => self.left_target,
            Role::RightTarget => self.right_target,
            Role::LeftRight => self.left_right,
        }
    }
}

/// Liquidity ceiling of a cycle.
///
/// Each leg's depth size is normalised into settlement-asset terms, the
/// minimum is taken, and that figure is converted back into each leg's units.
/// `sizes` holds the depth size available on each pair, in the same layout
/// as `rates`.
#[must_use]
pub fn liquidity_ceilings(direction: Direction, rates: &CycleRates, sizes: &CycleRates) -> Ceilings {
    let rt_value = sizes.right_target * rates.right_target;
    let lr_value = sizes.left_right * rates.left_right * rates.right_target;
    let lt_value = sizes.left_target * rates.left_target;
    let ceiling = rt_value.min(lr_value).min(lt_value);

    let (left_target, right_target, left_right) = match direction {
        Direction::Forward => {
            let right_target = ceiling / rates.right_target;
            let left_right = right_target / rates.left_right;
            (left_right, right_target, left_right)
        }
        Direction::Reverse => {
            let left_target = ceiling / rates.left_target;
            let right_target = ceiling / rates.right_target;
            (left_target, right_target, left_target)
        }
    };

    // A leg never draws more than its own level offers.
    Ceilings {
        left_target: left_target.min(sizes.left_target),
        right_target: right_target.min(sizes.right_target),
        left_right: left_right.min(sizes.left_right),
    }
}

/// Builds trade plans against live order books.
pub struct PlanBuilder {
    venue: Arc<dyn Venue>,
    registry: Arc<PairRegistry>,
    params: TradingParams,
    gate: ProfitabilityGate,
}

impl PlanBuilder {
    #[must_use]
    pub fn new(venue: Arc<dyn Venue>, registry: Arc<PairRegistry>, params: TradingParams) -> Self {
        let gate = ProfitabilityGate::new(&params);
        Self {
            venue,
            registry,
            params,
            gate,
        }
    }

    /// Build a plan for `opportunity`, sizing leg 0 from `tradable`
    /// settlement-asset balance.
    ///
    /// Invalid legs are kept in the plan and flagged; callers execute only
    /// plans where [`TradePlan::is_executable`] holds.
    ///
    /// # Errors
    ///
    /// - [`PlanError::BookUnavailable`] when a leg's book cannot be fetched
    /// - [`PlanError::NoWorkableDepth`] when no level fits the pair's size bounds
    /// - [`PlanError::StaleOpportunity`] when the re-priced cycle fails the gate
    pub async fn build(
        &self,
        scan_id: u64,
        opportunity: &Opportunity,
        tradable: Quantity,
    ) -> Result<TradePlan, PlanError> {
        let direction = opportunity.direction();
        let triangle = opportunity.triangle();

        let [first, second, third] = layout(direction);
        let quotes = [
            self.quote_leg(triangle, first).await?,
            self.quote_leg(triangle, second).await?,
            self.quote_leg(triangle, third).await?,
        ];
        let rates = by_pair(direction, &quotes, |q| q.price);
        let sizes = by_pair(direction, &quotes, |q| q.size);

        let yield_pct = rate::cycle_yield(direction, &rates);
        if !self.gate.is_profitable(yield_pct) {
            info!(
                pair = %opportunity.pair(),
                scanned = %opportunity.yield_pct(),
                live = %yield_pct,
                "opportunity went stale before planning"
            );
            return Err(PlanError::StaleOpportunity {
                yield_pct,
                threshold: self.gate.threshold(),
            });
        }

        let ceilings = liquidity_ceilings(direction, &rates, &sizes);
        let legs = size_legs(direction, &quotes, &ceilings, tradable, yield_pct);

        let plan = TradePlan::new(scan_id, opportunity.clone(), legs, yield_pct, tradable);
        for leg in plan.legs() {
            debug!(
                leg = leg.index,
                pair = %leg.pair,
                side = %leg.side,
                price = %leg.price,
                qty = %leg.quantity,
                ceiling = %leg.ceiling,
                valid = leg.valid,
                "planned leg"
            );
        }
        if !plan.is_executable() {
            warn!(pair = %opportunity.pair(), "plan has invalid legs");
        }
        Ok(plan)
    }

    async fn quote_leg(
        &self,
        triangle: &Triangle,
        (role, side): (Role, OrderSide),
    ) -> Result<LegQuote, PlanError> {
        let symbol = symbol_for(triangle, role);
        let meta = self
            .registry
            .get(symbol)
            .cloned()
            .ok_or_else(|| PlanError::UnknownPair(symbol.to_string()))?;
        let book = self
            .venue
            .order_book(symbol, self.params.book_depth)
            .await
            .map_err(|e| PlanError::BookUnavailable {
                pair: symbol.to_string(),
                reason: e.to_string(),
            })?;
        let levels = book.levels_for(side);
        let depth = find_workable_depth(levels, 0, &meta).ok_or_else(|| PlanError::NoWorkableDepth {
            pair: symbol.to_string(),
        })?;
        let level = &levels[depth];
        Ok(LegQuote {
            role,
            side,
            meta,
            price: level.price(),
            size: level.size(),
            depth,
        })
    }
}

/// Regroup per-leg values by triangle pair.
fn by_pair(direction: Direction, quotes: &[LegQuote; 3], f: fn(&LegQuote) -> Decimal) -> CycleRates {
    match direction {
        Direction::Forward => CycleRates {
            left_target: f(&quotes[2]),
            right_target: f(&quotes[0]),
            left_right: f(&quotes[1]),
        },
        Direction::Reverse => CycleRates {
            left_target: f(&quotes[0]),
            right_target: f(&quotes[2]),
            left_right: f(&quotes[1]),
        },
    }
}

/// Size each leg from the previous leg's rounded quantity, cap it by its
/// ceiling and validate it.
fn size_legs(
    direction: Direction,
    quotes: &[LegQuote; 3],
    ceilings: &Ceilings,
    tradable: Quantity,
    plan_yield: Decimal,
) -> [PlanLeg; 3] {
    let sized = |index: usize, raw: Quantity| {
        let quote = &quotes[index];
        let ceiling = ceilings.for_role(quote.role);
        let checked = validation::validate(&quote.meta, quote.price, raw.min(ceiling));
        PlanLeg {
            index,
            side: quote.side,
            pair: quote.meta.symbol.clone(),
            price: checked.price,
            quantity: checked.quantity,
            ceiling,
            plan_yield,
            valid: checked.valid,
            depth: quote.depth,
        }
    };

    // Leg 0 always buys with the settlement asset.
    let leg0 = sized(0, tradable / quotes[0].price);
    let leg1 = match direction {
        Direction::Forward => sized(1, leg0.quantity / quotes[1].price),
        Direction::Reverse => sized(1, leg0.quantity),
    };
    let leg2 = match direction {
        Direction::Forward => sized(2, leg1.quantity),
        Direction::Reverse => sized(2, leg1.quantity * quotes[1].price),
    };
    [leg0, leg1, leg2]
}
