//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for pairs, snapshots, books, statuses and parameters.
//! - [`venue`] - [`ScriptedVenue`](venue::ScriptedVenue), a scripted fake
//!   [`Venue`](crate::port::Venue) that counts every call.

pub mod domain;
pub mod venue;
