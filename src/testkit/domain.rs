//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`PairMetadata`], [`QuoteSnapshot`],
//! [`Book`], [`OrderStatus`] and [`TradingParams`] so tests focus on
//! assertions rather than construction boilerplate.

use std::collections::HashMap;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::application::params::TradingParams;
use crate::domain::book::{Book, PriceLevel};
use crate::domain::id::{Asset, OrderId, PairSymbol};
use crate::domain::money::{Price, Quantity};
use crate::domain::order::{OrderSide, OrderStatus};
use crate::domain::pair::PairMetadata;
use crate::domain::quote::{Quote, QuoteSnapshot};

/// Default trading parameters with no settle delay.
pub fn params() -> TradingParams {
    TradingParams {
        target: Asset::new("USDT"),
        maker_fee: dec!(0.00075),
        taker_fee: dec!(0.00075),
        fee_asset: Asset::new("BNB"),
        min_profit: dec!(0.001),
        target_min_liquidity: dec!(0.5),
        fee_min_liquidity: dec!(0.2),
        settlement_buffer: dec!(0.005),
        buffer_assets: ["BTC", "ETH", "USDC"].into_iter().map(Asset::new).collect(),
        target_stop: dec!(0.1),
        settle_delay: Duration::ZERO,
        book_depth: 20,
        max_leg_attempts: 25,
    }
}

/// Pair with 4 quantity decimals, 8 price and quote decimals, size bounds
/// `[0.0001, 1000]` and no minimum notional.
pub fn pair_meta(symbol: &str, base: &str, quote: &str) -> PairMetadata {
    PairMetadata {
        symbol: PairSymbol::new(symbol),
        base: Asset::new(base),
        quote: Asset::new(quote),
        qty_precision: 4,
        quote_precision: 8,
        price_precision: 8,
        min_qty: dec!(0.0001),
        max_qty: dec!(1000),
        min_notional: None,
    }
}

/// The ETH/BTC/USDT triangle, in listing order.
pub fn eth_btc_usdt() -> Vec<PairMetadata> {
    vec![
        pair_meta("ETHUSDT", "ETH", "USDT"),
        pair_meta("BTCUSDT", "BTC", "USDT"),
        pair_meta("ETHBTC", "ETH", "BTC"),
    ]
}

/// Snapshot from `(symbol, bid, ask)` rows.
pub fn snapshot(rows: &[(&str, Price, Price)]) -> QuoteSnapshot {
    let quotes: HashMap<PairSymbol, Quote> = rows
        .iter()
        .map(|&(symbol, bid, ask)| (PairSymbol::new(symbol), Quote::new(bid, ask)))
        .collect();
    QuoteSnapshot::now(quotes)
}

/// Book from `(price, size)` rows, bids best first and asks best first.
pub fn book(symbol: &str, bids: &[(Price, Quantity)], asks: &[(Price, Quantity)]) -> Book {
    let levels = |rows: &[(Price, Quantity)]| -> Vec<PriceLevel> {
        rows.iter().map(|&(p, s)| PriceLevel::new(p, s)).collect()
    };
    Book::with_levels(PairSymbol::new(symbol), levels(bids), levels(asks))
}

/// One-level book around a mid price with `size` on each side.
pub fn tight_book(symbol: &str, bid: Price, ask: Price, size: Quantity) -> Book {
    book(symbol, &[(bid, size)], &[(ask, size)])
}

/// ETHBTC status at price 0.0668; sell proceeds are `filled * price`.
pub fn order_status(id: &str, side: OrderSide, original: Quantity, filled: Quantity) -> OrderStatus {
    let price = dec!(0.0668);
    OrderStatus {
        order_id: OrderId::new(id),
        pair: PairSymbol::new("ETHBTC"),
        side,
        price,
        original_qty: original,
        filled_qty: filled,
        realized_proceeds: filled * price,
        fee: Decimal::ZERO,
        fee_asset: None,
        pending: filled < original,
    }
}
