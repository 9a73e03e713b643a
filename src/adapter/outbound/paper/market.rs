//! Market file format for the paper venue.
//!
//! ```toml
//! [[pairs]]
//! symbol = "ETHBTC"
//! base = "ETH"
//! quote = "BTC"
//! qty_precision = 4
//! price_precision = 6
//! min_qty = "0.0001"
//! max_qty = "100000"
//! min_notional = "0.0001"
//!
//! [[books]]
//! pair = "ETHBTC"
//! bids = [{ price = "0.0672", size = "12" }]
//! asks = [{ price = "0.0673", size = "9" }]
//!
//! [balances]
//! USDT = "1000"
//! ```

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::book::{Book, PriceLevel};
use crate::domain::id::{Asset, PairSymbol};
use crate::domain::money::Quantity;
use crate::domain::pair::PairMetadata;
use crate::error::{ConfigError, Result};

/// Both sides of one pair's book as written in the market file.
#[derive(Debug, Clone, Deserialize)]
pub struct BookEntry {
    pub pair: PairSymbol,
    #[serde(default)]
    pub bids: Vec<PriceLevel>,
    #[serde(default)]
    pub asks: Vec<PriceLevel>,
}

impl BookEntry {
    /// Book with bids sorted best (highest) first and asks best (lowest) first.
    #[must_use]
    pub fn into_book(self) -> Book {
        let mut bids = self.bids;
        let mut asks = self.asks;
        bids.sort_by(|a, b| b.price().cmp(&a.price()));
        asks.sort_by(|a, b| a.price().cmp(&b.price()));
        Book::with_levels(self.pair, bids, asks)
    }
}

/// Contents of a paper market file.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketFile {
    pub pairs: Vec<PairMetadata>,
    #[serde(default)]
    pub books: Vec<BookEntry>,
    #[serde(default)]
    pub balances: HashMap<Asset, Quantity>,
}

impl MarketFile {
    /// Parse a market file from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed, a book names an
    /// unlisted pair or a level has a non-positive price or size.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let market: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        if let Some(orphan) = market
            .books
            .iter()
            .find(|b| !market.pairs.iter().any(|p| p.symbol == b.pair))
        {
            return Err(ConfigError::InvalidValue {
                field: "books",
                reason: format!("book for unlisted pair {}", orphan.pair),
            }
            .into());
        }
        if let Some(entry) = market.books.iter().find(|b| {
            b.bids
                .iter()
                .chain(&b.asks)
                .any(|l| l.price() <= Decimal::ZERO || l.size() <= Decimal::ZERO)
        }) {
            return Err(ConfigError::InvalidValue {
                field: "books",
                reason: format!("non-positive price or size in book for {}", entry.pair),
            }
            .into());
        }
        Ok(market)
    }

    /// Load a market file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }
}
