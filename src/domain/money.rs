//! Monetary types for price and quantity representation.

use rust_decimal::Decimal;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Quantity represented as a Decimal for precision.
pub type Quantity = Decimal;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn notional_is_exact() {
        let price: Price = dec!(0.0668);
        let qty: Quantity = dec!(3);

        assert_eq!(price * qty, dec!(0.2004));
    }
}
