//! Immutable trading parameters shared by the planner and the execution engine.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::id::Asset;

/// Fee table, margin, reserve rules and execution tuning for one run.
///
/// Built once from configuration and handed to each component at
/// construction; nothing reads these values from global state.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingParams {
    /// Settlement asset every cycle starts and ends in.
    pub target: Asset,
    /// Maker fee per leg, as a fraction.
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
    /// Asset the venue charges discounted fees in.
    pub fee_asset: Asset,
    /// Minimum margin over fees, as a fraction.
    pub min_profit: Decimal,
    /// Fraction of the target balance never traded.
    pub target_min_liquidity: Decimal,
    /// Fraction of the fee asset held back.
    pub fee_min_liquidity: Decimal,
    /// Fraction held back on `buffer_assets` for fees charged before discount.
    pub settlement_buffer: Decimal,
    pub buffer_assets: Vec<Asset>,
    /// Fraction of the starting target balance that may be lost before the run stops.
    pub target_stop: Decimal,
    /// Pause before cancelling an order that has not completed.
    pub settle_delay: Duration,
    /// Book levels requested per side.
    pub book_depth: usize,
    /// Resubmissions and depth escalations allowed per leg.
    pub max_leg_attempts: u32,
}

impl TradingParams {
    /// Fractional yield a cycle must beat: one maker fee per leg plus margin.
    #[must_use]
    pub fn profit_threshold(&self) -> Decimal {
        self.maker_fee * Decimal::from(3) + self.min_profit
    }

    /// Share of an asset's free balance that may be committed after a rejection.
    #[must_use]
    pub fn reserve_factor(&self, asset: &Asset) -> Decimal {
        if *asset == self.target {
            Decimal::ONE - self.target_min_liquidity
        } else if *asset == self.fee_asset {
            Decimal::ONE - self.fee_min_liquidity
        } else if self.buffer_assets.contains(asset) {
            Decimal::ONE - self.settlement_buffer
        } else {
            Decimal::ONE
        }
    }
}
