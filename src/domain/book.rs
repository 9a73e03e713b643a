//! Order book depth as the planner and the leg workflow read it.
//!
//! Bids are kept best (highest) first and asks best (lowest) first. Callers
//! think in terms of the order they are about to send: [`Book::levels_for`]
//! returns the side a buy or a sell would take liquidity from.
//!
//! ```
//! use triarb::domain::book::{Book, PriceLevel};
//! use triarb::domain::id::PairSymbol;
//! use triarb::domain::order::OrderSide;
//! use rust_decimal_macros::dec;
//!
//! let book = Book::with_levels(
//!     PairSymbol::new("ETHBTC"),
//!     vec![PriceLevel::new(dec!(0.0672), dec!(4))],
//!     vec![PriceLevel::new(dec!(0.0673), dec!(2))],
//! );
//!
//! assert_eq!(book.best_price(OrderSide::Sell), Some(dec!(0.0672)));
//! assert_eq!(book.levels_for(OrderSide::Buy)[0].size(), dec!(2));
//! ```

use serde::Deserialize;

use super::id::PairSymbol;
use super::money::{Price, Quantity};
use super::order::OrderSide;

/// Aggregated base quantity resting at one price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceLevel {
    price: Price,
    size: Quantity,
}

impl PriceLevel {
    #[must_use]
    pub const fn new(price: Price, size: Quantity) -> Self {
        Self { price, size }
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub const fn size(&self) -> Quantity {
        self.size
    }
}

/// Depth snapshot for one pair.
#[derive(Debug, Clone)]
pub struct Book {
    pair: PairSymbol,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

impl Book {
    /// Bids must already be sorted descending and asks ascending.
    #[must_use]
    pub const fn with_levels(pair: PairSymbol, bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self { pair, bids, asks }
    }

    #[must_use]
    pub const fn pair(&self) -> &PairSymbol {
        &self.pair
    }

    /// Levels an order of `side` trades against: asks for buys, bids for sells.
    #[must_use]
    pub fn levels_for(&self, side: OrderSide) -> &[PriceLevel] {
        match side {
            OrderSide::Buy => &self.asks,
            OrderSide::Sell => &self.bids,
        }
    }

    /// Price an order of `side` would get at the top of the book.
    #[must_use]
    pub fn best_price(&self, side: OrderSide) -> Option<Price> {
        self.levels_for(side).first().map(PriceLevel::price)
    }

    #[must_use]
    pub fn is_two_sided(&self) -> bool {
        !self.bids.is_empty() && !self.asks.is_empty()
    }

    /// The top `depth` levels of each side.
    #[must_use]
    pub fn truncated(&self, depth: usize) -> Self {
        let top = |levels: &[PriceLevel]| -> Vec<PriceLevel> { levels.iter().take(depth).cloned().collect() };
        Self::with_levels(self.pair.clone(), top(self.bids.as_slice()), top(self.asks.as_slice()))
    }

    pub(crate) fn levels_for_mut(&mut self, side: OrderSide) -> &mut Vec<PriceLevel> {
        match side {
            OrderSide::Buy => &mut self.asks,
            OrderSide::Sell => &mut self.bids,
        }
    }
}
