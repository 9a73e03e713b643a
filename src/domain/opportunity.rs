//! Opportunity selected by a scan.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::id::{Asset, PairSymbol};
use super::rate::{CycleRates, Direction};

/// The three pairs of one triangle, keyed on its `Left/Right` cross pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Triangle {
    pub left: Asset,
    pub right: Asset,
    pub target: Asset,
    /// The `Left/Right` pair.
    pub pair: PairSymbol,
    pub left_target: PairSymbol,
    pub right_target: PairSymbol,
}

/// Best cycle found in one snapshot. Produced by the scanner, consumed once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    triangle: Triangle,
    direction: Direction,
    rates: CycleRates,
    yield_pct: Decimal,
    captured_at: DateTime<Utc>,
}

impl Opportunity {
    #[must_use]
    pub const fn new(
        triangle: Triangle,
        direction: Direction,
        rates: CycleRates,
        yield_pct: Decimal,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            triangle,
            direction,
            rates,
            yield_pct,
            captured_at,
        }
    }

    #[must_use]
    pub const fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    /// Symbol of the cross pair the opportunity is keyed on.
    #[must_use]
    pub const fn pair(&self) -> &PairSymbol {
        &self.triangle.pair
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn rates(&self) -> &CycleRates {
        &self.rates
    }

    /// Projected yield in percent.
    #[must_use]
    pub const fn yield_pct(&self) -> Decimal {
        self.yield_pct
    }

    #[must_use]
    pub const fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}
