//! Profitability threshold check.

use rust_decimal::Decimal;

use super::params::TradingParams;

/// Accepts a cycle only when its yield beats three maker fees plus margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfitabilityGate {
    threshold: Decimal,
}

impl ProfitabilityGate {
    #[must_use]
    pub fn new(params: &TradingParams) -> Self {
        Self {
            threshold: params.profit_threshold(),
        }
    }

    /// Fractional yield a cycle must exceed.
    #[must_use]
    pub const fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// `yield_pct` is in percent; the threshold is a fraction.
    #[must_use]
    pub fn is_profitable(&self, yield_pct: Decimal) -> bool {
        yield_pct / Decimal::ONE_HUNDRED > self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::params;
    use rust_decimal_macros::dec;

    #[test]
    fn threshold_is_exclusive() {
        let gate = ProfitabilityGate::new(&params());
        // 3 * 0.00075 + 0.001 = 0.00325 -> 0.325%
        assert!(!gate.is_profitable(dec!(0.325)));
        assert!(gate.is_profitable(dec!(0.3251)));
        assert!(!gate.is_profitable(dec!(-1)));
    }
}
