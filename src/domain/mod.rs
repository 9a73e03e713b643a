//! Venue-agnostic domain types and pure arithmetic.
//!
//! Nothing in here performs I/O. The application layer feeds these types with
//! data fetched through [`crate::port::outbound::venue::Venue`].

pub mod book;
pub mod id;
pub mod money;
pub mod opportunity;
pub mod order;
pub mod pair;
pub mod plan;
pub mod quote;
pub mod rate;
pub mod validation;

pub use book::{Book, PriceLevel};
pub use id::{Asset, OrderId, PairSymbol};
pub use money::{Price, Quantity};
pub use opportunity::{Opportunity, Triangle};
pub use order::{ExecutedOrder, OrderRequest, OrderSide, OrderStatus, ProfitReport};
pub use pair::{PairMetadata, PairRegistry};
pub use plan::{PlanLeg, TradePlan};
pub use quote::{Quote, QuoteSnapshot};
pub use rate::{CycleRates, Direction};
