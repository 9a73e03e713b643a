//! Application services (use cases).
//!
//! These services combine domain logic with a [`Venue`](crate::port::Venue)
//! to scan for, plan and execute triangular cycles.

pub mod cycle;
pub mod depth;
pub mod execution;
pub mod gate;
pub mod params;
pub mod partition;
pub mod planner;
pub mod scanner;
