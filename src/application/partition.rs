//! Split of the settlement balance into a tradable share and a reserve.

use rust_decimal::Decimal;
use serde::Serialize;

use super::params::TradingParams;
use crate::domain::money::Quantity;

/// Settlement-asset balance as seen at the start of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalancePartition {
    /// Share a plan may commit.
    pub tradable: Quantity,
    /// Share held back by `target_min_liquidity`.
    pub reserve: Quantity,
    /// Balance the run started with; the stop-loss floor is derived from it.
    pub starting_total: Quantity,
}

impl BalancePartition {
    /// Partition `available` with `starting_total` fixed at the first reading.
    #[must_use]
    pub fn new(available: Quantity, starting_total: Quantity, params: &TradingParams) -> Self {
        let tradable = available * (Decimal::ONE - params.target_min_liquidity);
        Self {
            tradable,
            reserve: available - tradable,
            starting_total,
        }
    }

    /// First partition of a run.
    #[must_use]
    pub fn initial(available: Quantity, params: &TradingParams) -> Self {
        Self::new(available, available, params)
    }

    /// Partition a fresh balance reading, keeping the run's starting total.
    #[must_use]
    pub fn refreshed(&self, available: Quantity, params: &TradingParams) -> Self {
        Self::new(available, self.starting_total, params)
    }

    #[must_use]
    pub fn total(&self) -> Quantity {
        self.tradable + self.reserve
    }

    /// Lowest balance tolerated before the run stops.
    #[must_use]
    pub fn stop_floor(&self, target_stop: Decimal) -> Quantity {
        self.starting_total * (Decimal::ONE - target_stop)
    }

    #[must_use]
    pub fn stop_loss_breached(&self, target_stop: Decimal) -> bool {
        self.total() < self.stop_floor(target_stop)
    }
}
