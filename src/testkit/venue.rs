//! Scripted fake [`Venue`] for planner, engine and service tests.
//!
//! Every order placement pops the next [`Fill`] from the script (defaults to
//! [`Fill::Full`] when exhausted) and every cancel pops the next result
//! (defaults to `true`). Books are served per pair; the last scripted book for
//! a pair is repeated once its queue runs down to one. All calls are counted.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::book::Book;
use crate::domain::id::{Asset, OrderId, PairSymbol};
use crate::domain::money::Quantity;
use crate::domain::order::{OrderRequest, OrderStatus};
use crate::domain::pair::PairMetadata;
use crate::domain::quote::QuoteSnapshot;
use crate::error::VenueError;
use crate::port::outbound::venue::Venue;

/// How the venue treats the next placed order.
#[derive(Debug, Clone)]
pub enum Fill {
    Full,
    /// Fills this much, then rests.
    Partial(Quantity),
    Unfilled,
    /// Reports `first` filled, then `then` on every later query.
    Late { first: Quantity, then: Quantity },
    Reject(VenueError),
}

#[derive(Debug)]
struct PlacedOrder {
    request: OrderRequest,
    /// Filled quantity reported per query; the last one repeats.
    fills: VecDeque<Quantity>,
}

/// A venue with scripted fills, cancels, books and snapshots.
pub struct ScriptedVenue {
    pairs: Vec<PairMetadata>,
    snapshots: Mutex<VecDeque<Result<QuoteSnapshot, VenueError>>>,
    books: Mutex<HashMap<PairSymbol, VecDeque<Book>>>,
    fills: Mutex<VecDeque<Fill>>,
    cancels: Mutex<VecDeque<bool>>,
    balances: Mutex<HashMap<Asset, Quantity>>,
    orders: Mutex<HashMap<OrderId, PlacedOrder>>,
    placed: Mutex<Vec<OrderRequest>>,
    place_count: AtomicU32,
    cancel_count: AtomicU32,
    book_count: AtomicU32,
    status_count: AtomicU32,
    balance_count: AtomicU32,
    snapshot_count: AtomicU32,
}

impl ScriptedVenue {
    pub fn new(pairs: Vec<PairMetadata>) -> Self {
        Self {
            pairs,
            snapshots: Mutex::new(VecDeque::new()),
            books: Mutex::new(HashMap::new()),
            fills: Mutex::new(VecDeque::new()),
            cancels: Mutex::new(VecDeque::new()),
            balances: Mutex::new(HashMap::new()),
            orders: Mutex::new(HashMap::new()),
            placed: Mutex::new(Vec::new()),
            place_count: AtomicU32::new(0),
            cancel_count: AtomicU32::new(0),
            book_count: AtomicU32::new(0),
            status_count: AtomicU32::new(0),
            balance_count: AtomicU32::new(0),
            snapshot_count: AtomicU32::new(0),
        }
    }

    /// Queue a snapshot result. The last one repeats.
    pub fn with_snapshot(self, snapshot: Result<QuoteSnapshot, VenueError>) -> Self {
        self.snapshots.lock().push_back(snapshot);
        self
    }

    /// Queue a book for its pair. The last one per pair repeats.
    pub fn with_book(self, book: Book) -> Self {
        self.books
            .lock()
            .entry(book.pair().clone())
            .or_default()
            .push_back(book);
        self
    }

    pub fn with_fills(self, fills: Vec<Fill>) -> Self {
        self.fills.lock().extend(fills);
        self
    }

    pub fn with_cancels(self, results: Vec<bool>) -> Self {
        self.cancels.lock().extend(results);
        self
    }

    pub fn with_balance(self, asset: &str, qty: Quantity) -> Self {
        self.balances.lock().insert(Asset::new(asset), qty);
        self
    }

    /// Overwrite a balance mid-test.
    pub fn set_balance(&self, asset: &str, qty: Quantity) {
        self.balances.lock().insert(Asset::new(asset), qty);
    }

    /// Every accepted order request, in submission order.
    pub fn placed(&self) -> Vec<OrderRequest> {
        self.placed.lock().clone()
    }

    pub fn place_count(&self) -> u32 {
        self.place_count.load(Ordering::SeqCst)
    }

    pub fn cancel_count(&self) -> u32 {
        self.cancel_count.load(Ordering::SeqCst)
    }

    pub fn book_count(&self) -> u32 {
        self.book_count.load(Ordering::SeqCst)
    }

    pub fn status_count(&self) -> u32 {
        self.status_count.load(Ordering::SeqCst)
    }

    pub fn balance_count(&self) -> u32 {
        self.balance_count.load(Ordering::SeqCst)
    }

    pub fn snapshot_count(&self) -> u32 {
        self.snapshot_count.load(Ordering::SeqCst)
    }

    /// Zero the book counter, e.g. after planning.
    pub fn reset_book_count(&self) {
        self.book_count.store(0, Ordering::SeqCst);
    }
}

fn pop_sticky<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

#[async_trait]
impl Venue for ScriptedVenue {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn pair_metadata(&self) -> Result<Vec<PairMetadata>, VenueError> {
        Ok(self.pairs.clone())
    }

    async fn quote_snapshot(&self) -> Result<QuoteSnapshot, VenueError> {
        self.snapshot_count.fetch_add(1, Ordering::SeqCst);
        pop_sticky(&mut self.snapshots.lock())
            .unwrap_or_else(|| Err(VenueError::Connectivity("no snapshot scripted".into())))
    }

    async fn order_book(&self, pair: &PairSymbol, _depth: usize) -> Result<Book, VenueError> {
        self.book_count.fetch_add(1, Ordering::SeqCst);
        let mut books = self.books.lock();
        books
            .get_mut(pair)
            .and_then(pop_sticky)
            .ok_or_else(|| VenueError::UnknownPair(pair.to_string()))
    }

    async fn place_limit_order(&self, request: &OrderRequest) -> Result<OrderId, VenueError> {
        let n = self.place_count.fetch_add(1, Ordering::SeqCst) + 1;
        let fill = self.fills.lock().pop_front().unwrap_or(Fill::Full);
        let fills: VecDeque<Quantity> = match fill {
            Fill::Reject(err) => return Err(err),
            Fill::Full => [request.quantity].into(),
            Fill::Partial(qty) => [qty].into(),
            Fill::Unfilled => [Quantity::ZERO].into(),
            Fill::Late { first, then } => [first, then].into(),
        };
        let id = OrderId::new(format!("o-{n}"));
        self.orders.lock().insert(
            id.clone(),
            PlacedOrder {
                request: request.clone(),
                fills,
            },
        );
        self.placed.lock().push(request.clone());
        Ok(id)
    }

    async fn order_status(&self, id: &OrderId) -> Result<OrderStatus, VenueError> {
        self.status_count.fetch_add(1, Ordering::SeqCst);
        let mut orders = self.orders.lock();
        let order = orders
            .get_mut(id)
            .ok_or_else(|| VenueError::UnknownOrder(id.to_string()))?;
        let filled = pop_sticky(&mut order.fills).unwrap_or(Quantity::ZERO);
        let request = &order.request;
        Ok(OrderStatus {
            order_id: id.clone(),
            pair: request.pair.clone(),
            side: request.side,
            price: request.price,
            original_qty: request.quantity,
            filled_qty: filled,
            realized_proceeds: filled * request.price,
            fee: Quantity::ZERO,
            fee_asset: None,
            pending: filled < request.quantity,
        })
    }

    async fn cancel_order(&self, _id: &OrderId) -> Result<bool, VenueError> {
        self.cancel_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.cancels.lock().pop_front().unwrap_or(true))
    }

    async fn available_balance(&self, asset: &Asset) -> Result<Quantity, VenueError> {
        self.balance_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.balances.lock().get(asset).copied().unwrap_or(Quantity::ZERO))
    }
}

