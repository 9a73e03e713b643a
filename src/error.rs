use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures reported by a venue adapter.
///
/// Adapters translate their wire-level failures into these kinds so the
/// execution path never has to inspect venue-specific messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VenueError {
    #[error("venue unreachable: {0}")]
    Connectivity(String),

    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("order size below the minimum requirement")]
    BelowMinimumSize,

    #[error("insufficient {asset} balance")]
    InsufficientBalance { asset: String },

    #[error("unknown order: {0}")]
    UnknownOrder(String),

    #[error("unknown pair: {0}")]
    UnknownPair(String),
}

impl VenueError {
    /// True when retrying the same request later may succeed.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

/// Reasons a trade plan cannot be built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("opportunity went stale: recomputed yield {yield_pct}% below threshold {threshold}")]
    StaleOpportunity { yield_pct: Decimal, threshold: Decimal },

    #[error("no order book level within quantity bounds for {pair}")]
    NoWorkableDepth { pair: String },

    #[error("order book unavailable for {pair}: {reason}")]
    BookUnavailable { pair: String, reason: String },

    #[error("pair {0} missing from venue metadata")]
    UnknownPair(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Venue(#[from] VenueError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("quote snapshot unavailable after {attempts} attempts")]
    SnapshotUnavailable { attempts: u32 },

    #[error("stop loss breached: target balance {balance} below floor {floor}")]
    StopLossBreached { balance: Decimal, floor: Decimal },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
