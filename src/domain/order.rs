//! Order types exchanged with a venue and the records an execution produces.
//!
//! - [`OrderRequest`] - a limit order to submit
//! - [`OrderStatus`] - what the venue reports about a placed order
//! - [`ExecutedOrder`] - one row of the execution report, per placed order
//! - [`ProfitReport`] - the aggregate outcome of one cycle
//!
//! [`ExecutedOrder`] and [`ProfitReport`] are consumed by downstream
//! reporting, so their serialized field names and order are fixed.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::{Asset, OrderId, PairSymbol};
use super::money::{Price, Quantity};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy the base asset, paying quote.
    Buy,
    /// Sell the base asset, receiving quote.
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// A limit order to be placed on a venue.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Pair to trade.
    pub pair: PairSymbol,
    /// Buy or Sell.
    pub side: OrderSide,
    /// Base-asset quantity, already rounded to the pair's precision.
    pub quantity: Quantity,
    /// Limit price, already rounded to the pair's price precision.
    pub price: Price,
}

/// Status of a placed order as reported by the venue.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStatus {
    pub order_id: OrderId,
    pub pair: PairSymbol,
    pub side: OrderSide,
    pub price: Price,
    /// Quantity originally requested.
    pub original_qty: Quantity,
    /// Base-asset quantity filled so far.
    pub filled_qty: Quantity,
    /// Quote-asset amount exchanged so far.
    pub realized_proceeds: Quantity,
    pub fee: Quantity,
    pub fee_asset: Option<Asset>,
    /// True while the order is still resting on the book.
    pub pending: bool,
}

impl OrderStatus {
    /// Quantity the order produced in the asset the side acquires:
    /// base for buys, quote proceeds for sells.
    #[must_use]
    pub fn resulting_qty(&self) -> Quantity {
        match self.side {
            OrderSide::Buy => self.filled_qty,
            OrderSide::Sell => self.realized_proceeds,
        }
    }

    /// True when nothing is left unfilled.
    #[must_use]
    pub fn is_fully_filled(&self) -> bool {
        self.filled_qty >= self.original_qty
    }
}

/// One executed-order row of a cycle report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutedOrder {
    pub scan_id: u64,
    pub leg: usize,
    pub order_id: OrderId,
    pub pair: PairSymbol,
    pub side: OrderSide,
    pub price: Price,
    pub original_qty: Quantity,
    pub filled_qty: Quantity,
    pub result_qty: Quantity,
    pub fee: Quantity,
    pub fee_asset: Option<Asset>,
    pub pending: bool,
}

impl ExecutedOrder {
    /// Row for an order the venue accepted but has not reported on yet.
    #[must_use]
    pub fn placed(scan_id: u64, leg: usize, order_id: OrderId, request: &OrderRequest) -> Self {
        Self {
            scan_id,
            leg,
            order_id,
            pair: request.pair.clone(),
            side: request.side,
            price: request.price,
            original_qty: request.quantity,
            filled_qty: Quantity::ZERO,
            result_qty: Quantity::ZERO,
            fee: Quantity::ZERO,
            fee_asset: None,
            pending: true,
        }
    }

    /// Build a report row from the latest known status of an order.
    #[must_use]
    pub fn from_status(scan_id: u64, leg: usize, status: &OrderStatus) -> Self {
        Self {
            scan_id,
            leg,
            order_id: status.order_id.clone(),
            pair: status.pair.clone(),
            side: status.side,
            price: status.price,
            original_qty: status.original_qty,
            filled_qty: status.filled_qty,
            result_qty: status.resulting_qty(),
            fee: status.fee,
            fee_asset: status.fee_asset.clone(),
            pending: status.pending,
        }
    }
}

/// Aggregate outcome of executing one plan, in settlement-asset terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitReport {
    pub scan_id: u64,
    pub starting_qty: Quantity,
    /// Absent when the arbitrage was lost before the cycle completed.
    pub ending_qty: Option<Quantity>,
    pub profit: Quantity,
    pub asset: Asset,
    pub arbitrage_lost: bool,
}

impl ProfitReport {
    /// Report for a completed cycle.
    #[must_use]
    pub fn completed(scan_id: u64, starting_qty: Quantity, ending_qty: Quantity, asset: Asset) -> Self {
        Self {
            scan_id,
            starting_qty,
            ending_qty: Some(ending_qty),
            profit: ending_qty - starting_qty,
            asset,
            arbitrage_lost: false,
        }
    }

    /// Zero-profit report for an abandoned cycle.
    #[must_use]
    pub fn lost(scan_id: u64, starting_qty: Quantity, asset: Asset) -> Self {
        Self {
            scan_id,
            starting_qty,
            ending_qty: None,
            profit: Quantity::ZERO,
            asset,
            arbitrage_lost: true,
        }
    }
}
