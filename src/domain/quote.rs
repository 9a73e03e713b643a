//! Best bid/ask snapshot across all pairs of a venue.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::id::PairSymbol;
use super::money::Price;

/// Top of book for one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub bid: Price,
    pub ask: Price,
}

impl Quote {
    #[must_use]
    pub const fn new(bid: Price, ask: Price) -> Self {
        Self { bid, ask }
    }

    /// A quote with a zero or negative side cannot be priced.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.bid > Price::ZERO && self.ask > Price::ZERO
    }
}

/// Quotes for every pair, captured at one instant. Replaced every scan.
#[derive(Debug, Clone)]
pub struct QuoteSnapshot {
    quotes: HashMap<PairSymbol, Quote>,
    captured_at: DateTime<Utc>,
}

impl QuoteSnapshot {
    #[must_use]
    pub fn new(quotes: HashMap<PairSymbol, Quote>, captured_at: DateTime<Utc>) -> Self {
        Self { quotes, captured_at }
    }

    /// Snapshot stamped with the current time.
    #[must_use]
    pub fn now(quotes: HashMap<PairSymbol, Quote>) -> Self {
        Self::new(quotes, Utc::now())
    }

    #[must_use]
    pub fn get(&self, pair: &PairSymbol) -> Option<&Quote> {
        self.quotes.get(pair)
    }

    #[must_use]
    pub const fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
