//! Simulated venue for dry runs.

pub mod market;
pub mod settings;
pub mod venue;

pub use venue::PaperVenue;
