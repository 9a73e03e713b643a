//! Precision rounding and venue order-size rules.
//!
//! Every quantity or price sent to a venue goes through [`validate`] first.
//! Quantities are always rounded toward zero so an order never asks for more
//! than the account or the book can cover.

use rust_decimal::{Decimal, RoundingStrategy};

use super::money::{Price, Quantity};
use super::pair::PairMetadata;

/// Round `value` toward zero to `precision` decimal places.
#[must_use]
pub fn round_down(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::ToZero)
}

/// Round a limit price to `precision` decimal places, to nearest.
#[must_use]
pub fn round_price(price: Price, precision: u32) -> Price {
    price.round_dp(precision)
}

/// Passes when the venue defines no minimum notional, else requires
/// `price * qty >= min_notional`.
#[must_use]
pub fn check_min_notional(meta: &PairMetadata, price: Price, qty: Quantity) -> bool {
    meta.min_notional.map_or(true, |min| price * qty >= min)
}

/// Requires `min_qty <= qty <= max_qty`.
#[must_use]
pub fn check_qty(meta: &PairMetadata, qty: Quantity) -> bool {
    qty >= meta.min_qty && qty <= meta.max_qty
}

/// A price and quantity conformed to a pair's precision, with the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validated {
    pub price: Price,
    pub quantity: Quantity,
    pub valid: bool,
}

/// Round `qty` and `price` to the pair's precision and check the size rules.
#[must_use]
pub fn validate(meta: &PairMetadata, price: Price, qty: Quantity) -> Validated {
    let quantity = round_down(qty, meta.qty_precision);
    let price = round_price(price, meta.price_precision);
    let valid = check_min_notional(meta, price, quantity) && check_qty(meta, quantity);
    if !valid {
        tracing::debug!(
            pair = %meta.symbol,
            price = %price,
            qty = %quantity,
            min_qty = %meta.min_qty,
            max_qty = %meta.max_qty,
            "order fails venue size rules"
        );
    }
    Validated { price, quantity, valid }
}
