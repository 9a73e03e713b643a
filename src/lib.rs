//! Triarb - triangular arbitrage detection and execution on a single venue.
//!
//! A cycle trades the settlement asset into two other assets and back again,
//! profiting when the product of the three rates beats three maker fees plus
//! a margin.
//!
//! # Architecture
//!
//! - [`domain`] - Venue-agnostic types: pairs, quotes, books, orders, plans,
//!   rate math and precision rules
//! - [`application`] - The scan loop: opportunity scanning, the profitability
//!   gate, plan building and the leg-by-leg execution engine
//! - [`port`] - The [`Venue`](port::Venue) capability every adapter implements
//! - [`adapter`] - The paper venue and the command-line interface
//! - [`infrastructure`] - Configuration loading and logging setup
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use triarb::adapter::outbound;
//! use triarb::application::cycle::ArbitrageService;
//! use triarb::infrastructure::config::settings::Config;
//!
//! # async fn demo() -> triarb::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let venue = outbound::connect(&config)?;
//! let mut service =
//!     ArbitrageService::bootstrap(venue, config.trading_params(), config.scan_schedule()).await?;
//! let summary = service.run(10, |_| {}).await?;
//! println!("profit: {}", summary.profit);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
