//! Plan execution.
//!
//! - [`state`] - the per-leg order workflow as a pure state machine
//! - [`engine`] - carries out the machine's commands against a venue

pub mod engine;
pub mod state;

pub use engine::{CycleOutcome, ExecutionEngine};
pub use state::{LegResolution, LossReason};
