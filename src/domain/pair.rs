//! Trading pair metadata and the registry built from it at startup.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::id::{Asset, PairSymbol};
use super::money::Quantity;

/// Venue trading rules for one pair. Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PairMetadata {
    pub symbol: PairSymbol,
    pub base: Asset,
    pub quote: Asset,
    /// Decimal places allowed for base quantities.
    pub qty_precision: u32,
    /// Decimal places allowed for quote amounts.
    #[serde(default = "default_quote_precision")]
    pub quote_precision: u32,
    /// Decimal places allowed for prices.
    pub price_precision: u32,
    pub min_qty: Quantity,
    pub max_qty: Quantity,
    /// Minimum price x quantity; some venues define none.
    #[serde(default)]
    pub min_notional: Option<Decimal>,
}

const fn default_quote_precision() -> u32 {
    8
}

/// Decimal places implied by a venue step size, e.g. `0.00100` -> 3.
#[must_use]
pub fn precision_from_step(step: Decimal) -> u32 {
    if step >= Decimal::ONE {
        return 0;
    }
    step.normalize().scale()
}

/// All pairs a venue lists, in the order the venue reported them.
#[derive(Debug, Clone, Default)]
pub struct PairRegistry {
    pairs: Vec<PairMetadata>,
    by_symbol: HashMap<PairSymbol, usize>,
    by_assets: HashMap<(Asset, Asset), usize>,
}

impl PairRegistry {
    /// Build a registry, keeping the first entry for duplicate symbols.
    #[must_use]
    pub fn new(pairs: Vec<PairMetadata>) -> Self {
        let mut registry = Self::default();
        for pair in pairs {
            if registry.by_symbol.contains_key(&pair.symbol) {
                continue;
            }
            let idx = registry.pairs.len();
            registry.by_symbol.insert(pair.symbol.clone(), idx);
            registry
                .by_assets
                .insert((pair.base.clone(), pair.quote.clone()), idx);
            registry.pairs.push(pair);
        }
        registry
    }

    /// Look up a pair by venue symbol.
    #[must_use]
    pub fn get(&self, symbol: &PairSymbol) -> Option<&PairMetadata> {
        self.by_symbol.get(symbol).map(|&idx| &self.pairs[idx])
    }

    /// Look up the pair trading `base` against `quote`.
    #[must_use]
    pub fn find(&self, base: &Asset, quote: &Asset) -> Option<&PairMetadata> {
        self.by_assets
            .get(&(base.clone(), quote.clone()))
            .map(|&idx| &self.pairs[idx])
    }

    /// Iterate pairs in load order.
    pub fn iter(&self) -> impl Iterator<Item = &PairMetadata> {
        self.pairs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
