//! In-memory venue that fills limit orders against a static book.
//!
//! Orders cross against the opposite side up to their limit price, consume
//! that liquidity and rest whatever is left. Resting orders never fill later;
//! the book only changes when an order takes from it. Funds for an order are
//! held from placement until it completes or is cancelled. The maker fee is
//! charged in the quote asset.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::market::MarketFile;
use crate::domain::book::{Book, PriceLevel};
use crate::domain::id::{Asset, OrderId, PairSymbol};
use crate::domain::money::{Price, Quantity};
use crate::domain::order::{OrderRequest, OrderSide, OrderStatus};
use crate::domain::pair::{PairMetadata, PairRegistry};
use crate::domain::quote::{Quote, QuoteSnapshot};
use crate::error::{Result, VenueError};
use crate::port::outbound::venue::Venue;

#[derive(Debug, Clone)]
struct PaperOrder {
    request: OrderRequest,
    spend_asset: Asset,
    fee_asset: Asset,
    /// Funds still held for the unfilled part.
    held: Quantity,
    filled: Quantity,
    /// Quote received for sells, net of fee; quote spent for buys, gross.
    proceeds: Quantity,
    fee: Quantity,
    open: bool,
}

impl PaperOrder {
    fn status(&self, id: &OrderId) -> OrderStatus {
        OrderStatus {
            order_id: id.clone(),
            pair: self.request.pair.clone(),
            side: self.request.side,
            price: self.request.price,
            original_qty: self.request.quantity,
            filled_qty: self.filled,
            realized_proceeds: self.proceeds,
            fee: self.fee,
            fee_asset: Some(self.fee_asset.clone()),
            pending: self.open,
        }
    }
}

#[derive(Debug, Default)]
struct PaperState {
    books: HashMap<PairSymbol, Book>,
    balances: HashMap<Asset, Quantity>,
    orders: HashMap<OrderId, PaperOrder>,
}

impl PaperState {
    fn balance(&self, asset: &Asset) -> Quantity {
        self.balances.get(asset).copied().unwrap_or(Quantity::ZERO)
    }

    fn credit(&mut self, asset: &Asset, qty: Quantity) {
        *self.balances.entry(asset.clone()).or_insert(Quantity::ZERO) += qty;
    }

    fn debit(&mut self, asset: &Asset, qty: Quantity) {
        self.credit(asset, -qty);
    }
}

/// Simulated venue backed by a market file.
pub struct PaperVenue {
    registry: PairRegistry,
    maker_fee: Decimal,
    state: Mutex<PaperState>,
}

impl PaperVenue {
    #[must_use]
    pub fn new(market: MarketFile, maker_fee: Decimal) -> Self {
        let books = market
            .books
            .into_iter()
            .map(|entry| (entry.pair.clone(), entry.into_book()))
            .collect();
        Self {
            registry: PairRegistry::new(market.pairs),
            maker_fee,
            state: Mutex::new(PaperState {
                books,
                balances: market.balances,
                orders: HashMap::new(),
            }),
        }
    }

    /// Load the venue from a market file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file<P: AsRef<Path>>(path: P, maker_fee: Decimal) -> Result<Self> {
        let path = path.as_ref();
        let market = MarketFile::load(path)?;
        info!(
            file = %path.display(),
            pairs = market.pairs.len(),
            books = market.books.len(),
            "paper market loaded"
        );
        Ok(Self::new(market, maker_fee))
    }

    fn meta(&self, pair: &PairSymbol) -> std::result::Result<&PairMetadata, VenueError> {
        self.registry
            .get(pair)
            .ok_or_else(|| VenueError::UnknownPair(pair.to_string()))
    }

    /// Funds an order must hold: base for sells, quote plus fee for buys.
    fn required(&self, request: &OrderRequest) -> Quantity {
        match request.side {
            OrderSide::Buy => request.quantity * request.price * (Decimal::ONE + self.maker_fee),
            OrderSide::Sell => request.quantity,
        }
    }
}

fn crosses(side: OrderSide, limit: Price, level: Price) -> bool {
    match side {
        OrderSide::Buy => level <= limit,
        OrderSide::Sell => level >= limit,
    }
}

/// Take up to `qty` from the crossing levels of `book`.
/// Returns the filled base quantity and the quote value at level prices.
fn take_liquidity(book: &mut Book, side: OrderSide, limit: Price, qty: Quantity) -> (Quantity, Quantity) {
    let levels = book.levels_for_mut(side);
    let mut filled = Quantity::ZERO;
    let mut value = Quantity::ZERO;
    while filled < qty {
        let Some((price, size)) = levels.first().map(|l| (l.price(), l.size())) else {
            break;
        };
        if !crosses(side, limit, price) {
            break;
        }
        let take = size.min(qty - filled);
        filled += take;
        value += take * price;
        let rest = size - take;
        if rest.is_zero() {
            levels.remove(0);
        } else {
            levels[0] = PriceLevel::new(price, rest);
        }
    }
    (filled, value)
}

#[async_trait]
impl Venue for PaperVenue {
    fn name(&self) -> &'static str {
        "paper"
    }

    async fn pair_metadata(&self) -> std::result::Result<Vec<PairMetadata>, VenueError> {
        Ok(self.registry.iter().cloned().collect())
    }

    async fn quote_snapshot(&self) -> std::result::Result<QuoteSnapshot, VenueError> {
        let state = self.state.lock();
        let quotes = state
            .books
            .iter()
            .map(|(pair, book)| {
                let bid = book.best_price(OrderSide::Sell).unwrap_or(Price::ZERO);
                let ask = book.best_price(OrderSide::Buy).unwrap_or(Price::ZERO);
                (pair.clone(), Quote::new(bid, ask))
            })
            .collect();
        Ok(QuoteSnapshot::now(quotes))
    }

    async fn order_book(&self, pair: &PairSymbol, depth: usize) -> std::result::Result<Book, VenueError> {
        self.meta(pair)?;
        let state = self.state.lock();
        let book = state
            .books
            .get(pair)
            .ok_or_else(|| VenueError::UnknownPair(pair.to_string()))?;
        Ok(book.truncated(depth))
    }

    async fn place_limit_order(&self, request: &OrderRequest) -> std::result::Result<OrderId, VenueError> {
        let meta = self.meta(&request.pair)?;
        if request.quantity < meta.min_qty
            || meta.min_notional.is_some_and(|min| request.quantity * request.price < min)
        {
            return Err(VenueError::BelowMinimumSize);
        }
        if request.quantity > meta.max_qty || request.price <= Price::ZERO {
            return Err(VenueError::Rejected(format!(
                "{} {} @ {} outside pair limits",
                request.side, request.quantity, request.price
            )));
        }

        let spend_asset = match request.side {
            OrderSide::Buy => meta.quote.clone(),
            OrderSide::Sell => meta.base.clone(),
        };
        let required = self.required(request);

        let mut state = self.state.lock();
        if !state.books.contains_key(&request.pair) {
            return Err(VenueError::UnknownPair(request.pair.to_string()));
        }
        if state.balance(&spend_asset) < required {
            return Err(VenueError::InsufficientBalance {
                asset: spend_asset.to_string(),
            });
        }
        state.debit(&spend_asset, required);

        let book = state
            .books
            .get_mut(&request.pair)
            .ok_or_else(|| VenueError::UnknownPair(request.pair.to_string()))?;
        let (filled, value) = take_liquidity(book, request.side, request.price, request.quantity);
        let fee = value * self.maker_fee;

        let (proceeds, held) = match request.side {
            OrderSide::Buy => {
                state.credit(&meta.base, filled);
                (value, required - value - fee)
            }
            OrderSide::Sell => {
                state.credit(&meta.quote, value - fee);
                (value - fee, required - filled)
            }
        };

        let mut order = PaperOrder {
            request: request.clone(),
            spend_asset,
            fee_asset: meta.quote.clone(),
            held,
            filled,
            proceeds,
            fee,
            open: filled < request.quantity,
        };
        if !order.open {
            // Price improvement on a completed buy is returned at once.
            state.credit(&order.spend_asset, order.held);
            order.held = Quantity::ZERO;
        }

        let id = OrderId::new(uuid::Uuid::new_v4().to_string());
        debug!(
            order_id = %id,
            pair = %request.pair,
            side = %request.side,
            qty = %request.quantity,
            filled = %filled,
            "paper order placed"
        );
        state.orders.insert(id.clone(), order);
        Ok(id)
    }

    async fn order_status(&self, id: &OrderId) -> std::result::Result<OrderStatus, VenueError> {
        let state = self.state.lock();
        state
            .orders
            .get(id)
            .map(|order| order.status(id))
            .ok_or_else(|| VenueError::UnknownOrder(id.to_string()))
    }

    async fn cancel_order(&self, id: &OrderId) -> std::result::Result<bool, VenueError> {
        let mut state = self.state.lock();
        let order = state
            .orders
            .get_mut(id)
            .ok_or_else(|| VenueError::UnknownOrder(id.to_string()))?;
        if !order.open {
            return Ok(false);
        }
        order.open = false;
        let released = std::mem::take(&mut order.held);
        let asset = order.spend_asset.clone();
        state.credit(&asset, released);
        debug!(order_id = %id, released = %released, asset = %asset, "paper order cancelled");
        Ok(true)
    }

    async fn available_balance(&self, asset: &Asset) -> std::result::Result<Quantity, VenueError> {
        Ok(self.state.lock().balance(asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MARKET: &str = r#"
[[pairs]]
symbol = "ETHBTC"
base = "ETH"
quote = "BTC"
qty_precision = 3
price_precision = 6
min_qty = "0.001"
max_qty = "1000"

[[books]]
pair = "ETHBTC"
bids = [{ price = "0.0672", size = "12" }]
asks = [{ price = "0.0673", size = "9" }]

[balances]
BTC = "1"
ETH = "5"
"#;

    fn venue() -> PaperVenue {
        PaperVenue::new(MarketFile::parse_toml(MARKET).unwrap(), dec!(0.001))
    }

    fn buy(qty: Decimal) -> OrderRequest {
        OrderRequest {
            pair: PairSymbol::new("ETHBTC"),
            side: OrderSide::Buy,
            quantity: qty,
            price: dec!(0.0673),
        }
    }

    #[tokio::test]
    async fn crossing_buy_fills_and_moves_balances() {
        let venue = venue();
        let id = venue.place_limit_order(&buy(dec!(5))).await.unwrap();
        let status = venue.order_status(&id).await.unwrap();
        assert_eq!(status.filled_qty, dec!(5));
        assert!(!status.pending);
        assert_eq!(venue.available_balance(&Asset::new("ETH")).await.unwrap(), dec!(10));
        assert_eq!(venue.available_balance(&Asset::new("BTC")).await.unwrap(), dec!(0.6631635));
        assert!(!venue.cancel_order(&id).await.unwrap());
    }

    #[tokio::test]
    async fn partial_fill_rests_until_cancelled() {
        let venue = venue();
        let id = venue.place_limit_order(&buy(dec!(10))).await.unwrap();
        let status = venue.order_status(&id).await.unwrap();
        assert_eq!(status.filled_qty, dec!(9));
        assert!(status.pending);

        assert!(venue.cancel_order(&id).await.unwrap());
        assert_eq!(venue.available_balance(&Asset::new("BTC")).await.unwrap(), dec!(0.3936943));
        let book = venue.order_book(&PairSymbol::new("ETHBTC"), 5).await.unwrap();
        assert!(book.levels_for(OrderSide::Buy).is_empty());
    }

    #[tokio::test]
    async fn sell_proceeds_are_net_of_fee() {
        let venue = venue();
        let id = venue
            .place_limit_order(&OrderRequest {
                pair: PairSymbol::new("ETHBTC"),
                side: OrderSide::Sell,
                quantity: dec!(2),
                price: dec!(0.0672),
            })
            .await
            .unwrap();
        let status = venue.order_status(&id).await.unwrap();
        assert_eq!(status.realized_proceeds, dec!(0.1344) - dec!(0.0001344));
        assert_eq!(status.fee_asset, Some(Asset::new("BTC")));
    }

    #[tokio::test]
    async fn venue_style_rejections() {
        let venue = venue();
        assert_eq!(
            venue.place_limit_order(&buy(dec!(0.0001))).await.unwrap_err(),
            VenueError::BelowMinimumSize
        );
        assert!(matches!(
            venue.place_limit_order(&buy(dec!(100))).await.unwrap_err(),
            VenueError::InsufficientBalance { .. }
        ));
        assert_eq!(venue.available_balance(&Asset::new("BTC")).await.unwrap(), dec!(1));
    }

    #[tokio::test]
    async fn snapshot_reports_top_of_book() {
        let snapshot = venue().quote_snapshot().await.unwrap();
        let quote = snapshot.get(&PairSymbol::new("ETHBTC")).unwrap();
        assert_eq!(quote.bid, dec!(0.0672));
        assert_eq!(quote.ask, dec!(0.0673));
    }
}
