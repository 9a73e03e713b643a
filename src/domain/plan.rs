//! Sized, validated three-leg trade plans.

use rust_decimal::Decimal;
use serde::Serialize;

use super::id::PairSymbol;
use super::money::{Price, Quantity};
use super::opportunity::Opportunity;
use super::order::{OrderRequest, OrderSide};

/// One order of a plan.
///
/// Everything but `quantity` is fixed at build time; the quantity may be
/// rescaled once the previous leg has resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanLeg {
    pub index: usize,
    pub side: OrderSide,
    pub pair: PairSymbol,
    pub price: Price,
    pub quantity: Quantity,
    /// Most this leg may trade given the scarcest leg's depth, in its own units.
    pub ceiling: Quantity,
    /// End-to-end yield the plan was built with, in percent.
    pub plan_yield: Decimal,
    pub valid: bool,
    /// Book depth index the price was taken from.
    pub depth: usize,
}

impl PlanLeg {
    /// The limit order this leg submits.
    #[must_use]
    pub fn to_request(&self) -> OrderRequest {
        OrderRequest {
            pair: self.pair.clone(),
            side: self.side,
            quantity: self.quantity,
            price: self.price,
        }
    }

    /// Settlement-asset amount a buy leg spends, or proceeds a sell leg earns.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.quantity * self.price
    }
}

/// A plan ready for the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradePlan {
    scan_id: u64,
    opportunity: Opportunity,
    legs: [PlanLeg; 3],
    yield_pct: Decimal,
    /// Tradable settlement-asset balance the plan was sized against.
    tradable: Quantity,
}

impl TradePlan {
    #[must_use]
    pub const fn new(
        scan_id: u64,
        opportunity: Opportunity,
        legs: [PlanLeg; 3],
        yield_pct: Decimal,
        tradable: Quantity,
    ) -> Self {
        Self {
            scan_id,
            opportunity,
            legs,
            yield_pct,
            tradable,
        }
    }

    #[must_use]
    pub const fn scan_id(&self) -> u64 {
        self.scan_id
    }

    #[must_use]
    pub const fn opportunity(&self) -> &Opportunity {
        &self.opportunity
    }

    #[must_use]
    pub const fn legs(&self) -> &[PlanLeg; 3] {
        &self.legs
    }

    /// Yield recomputed from live depth, in percent.
    #[must_use]
    pub const fn yield_pct(&self) -> Decimal {
        self.yield_pct
    }

    #[must_use]
    pub const fn tradable(&self) -> Quantity {
        self.tradable
    }

    /// Only plans whose three legs all passed validation are executed.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.legs.iter().all(|leg| leg.valid)
    }

    /// Settlement asset deliberately left out of the cycle by the sizing step.
    #[must_use]
    pub fn unused_target(&self) -> Quantity {
        (self.tradable - self.legs[0].notional()).max(Quantity::ZERO)
    }
}
