//! Venue capability.
//!
//! One implementation per supported venue. Adapters translate the venue's
//! own order-status layout and cancel responses into the shapes below, so the
//! execution path never branches on which venue it is talking to.

use async_trait::async_trait;

use crate::domain::book::Book;
use crate::domain::id::{Asset, OrderId, PairSymbol};
use crate::domain::money::Quantity;
use crate::domain::order::{OrderRequest, OrderStatus};
use crate::domain::pair::PairMetadata;
use crate::domain::quote::QuoteSnapshot;
use crate::error::VenueError;

/// A single trading venue.
#[async_trait]
pub trait Venue: Send + Sync {
    /// Venue name for logging.
    fn name(&self) -> &'static str;

    /// Trading rules for every listed pair, in the venue's listing order.
    /// Fetched once at startup.
    async fn pair_metadata(&self) -> Result<Vec<PairMetadata>, VenueError>;

    /// Best bid and ask for every pair.
    async fn quote_snapshot(&self) -> Result<QuoteSnapshot, VenueError>;

    /// Up to `depth` levels per side of one pair's book.
    async fn order_book(&self, pair: &PairSymbol, depth: usize) -> Result<Book, VenueError>;

    /// Place a limit order.
    async fn place_limit_order(&self, request: &OrderRequest) -> Result<OrderId, VenueError>;

    /// Latest status of a placed order.
    async fn order_status(&self, order_id: &OrderId) -> Result<OrderStatus, VenueError>;

    /// Cancel an order. `Ok(true)` only on confirmed cancellation; an order
    /// that already completed yields `Ok(false)`.
    async fn cancel_order(&self, order_id: &OrderId) -> Result<bool, VenueError>;

    /// Free balance of one asset.
    async fn available_balance(&self, asset: &Asset) -> Result<Quantity, VenueError>;
}
