//! Cycle yield arithmetic.
//!
//! A triangle is three pairs `Left/Target`, `Right/Target` and `Left/Right`.
//! Target is the settlement asset every cycle starts and ends in.
//!
//! - Forward: buy Right at the `Right/Target` ask, buy Left at the `Left/Right`
//!   ask, sell Left at the `Left/Target` bid.
//! - Reverse: buy Left at the `Left/Target` ask, sell Left at the `Left/Right`
//!   bid, sell Right at the `Right/Target` bid.
//!
//! Callers guarantee non-zero prices; nothing here divides by a bid or ask that
//! could be zero once [`crate::domain::quote::Quote::is_usable`] has passed.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::Price;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Direction a cycle is traded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Reverse => write!(f, "reverse"),
        }
    }
}

/// The three prices a cycle was priced with, one per triangle pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleRates {
    /// Price on `Left/Target`.
    pub left_target: Price,
    /// Price on `Right/Target`.
    pub right_target: Price,
    /// Price on `Left/Right`.
    pub left_right: Price,
}

/// Forward cycle yield in percent.
#[must_use]
pub fn forward_yield(bid_left_target: Price, ask_right_target: Price, ask_left_right: Price) -> Decimal {
    (bid_left_target / (ask_right_target * ask_left_right) - Decimal::ONE) * HUNDRED
}

/// Reverse cycle yield in percent.
#[must_use]
pub fn reverse_yield(ask_left_target: Price, bid_right_target: Price, bid_left_right: Price) -> Decimal {
    (bid_right_target * bid_left_right / ask_left_target - Decimal::ONE) * HUNDRED
}

/// Yield of `direction` priced with `rates`.
#[must_use]
pub fn cycle_yield(direction: Direction, rates: &CycleRates) -> Decimal {
    match direction {
        Direction::Forward => forward_yield(rates.left_target, rates.right_target, rates.left_right),
        Direction::Reverse => reverse_yield(rates.left_target, rates.right_target, rates.left_right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn forward_loses_when_cross_is_rich() {
        let y = forward_yield(dec!(2000), dec!(30001), dec!(0.0668));
        assert!(y < dec!(-0.19) && y > dec!(-0.23), "got {y}");
    }

    #[test]
    fn reverse_gains_when_cross_bid_is_rich() {
        let y = reverse_yield(dec!(2002), dec!(29990), dec!(0.0672));
        assert!(y > dec!(0.6) && y < dec!(0.7), "got {y}");
    }

    #[test]
    fn flat_prices_yield_zero() {
        assert_eq!(forward_yield(dec!(2), dec!(2), dec!(1)), Decimal::ZERO);
        assert_eq!(reverse_yield(dec!(2), dec!(2), dec!(1)), Decimal::ZERO);
    }

    #[test]
    fn back_to_back_cycles_never_profit() {
        let cases = [
            (dec!(2000), dec!(2001), dec!(30000), dec!(30001), dec!(0.0667), dec!(0.0668)),
            (dec!(1.5), dec!(1.6), dec!(0.9), dec!(0.95), dec!(1.7), dec!(1.72)),
            (dec!(10), dec!(10), dec!(5), dec!(5), dec!(2), dec!(2)),
        ];
        for (lt_bid, lt_ask, rt_bid, rt_ask, lr_bid, lr_ask) in cases {
            let fwd = Decimal::ONE + forward_yield(lt_bid, rt_ask, lr_ask) / HUNDRED;
            let rev = Decimal::ONE + reverse_yield(lt_ask, rt_bid, lr_bid) / HUNDRED;
            assert!(fwd * rev <= Decimal::ONE, "free profit at {lt_bid}/{lt_ask}");
        }
    }

    #[test]
    fn cycle_yield_dispatches_on_direction() {
        let rates = CycleRates {
            left_target: dec!(2002),
            right_target: dec!(29990),
            left_right: dec!(0.0672),
        };
        assert_eq!(
            cycle_yield(Direction::Reverse, &rates),
            reverse_yield(dec!(2002), dec!(29990), dec!(0.0672))
        );
    }
}
