//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The application layer talks to the outside world only through these
//! traits; adapters under [`crate::adapter`] implement them.
//!
//! # Available Ports
//!
//! - [`Venue`] - market data, order placement and balances on one trading venue

pub mod outbound;

pub use outbound::venue::Venue;
