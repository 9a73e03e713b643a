//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file and validated before use.
//!
//! # Example
//!
//! ```no_run
//! use triarb::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     let params = config.trading_params();
//!     println!("trading {} cycles", params.target);
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::logging::LoggingConfig;
use super::trading::{
    ExecutionConfig, FeesConfig, ReserveConfig, RiskConfig, ScanConfig, StrategyConfig,
};
use crate::adapter::outbound::paper::settings::PaperConfig;
use crate::application::cycle::ScanSchedule;
use crate::application::params::TradingParams;
use crate::domain::id::Asset;
use crate::error::{ConfigError, Result};

/// Supported venues.
///
/// Determines which venue adapter is connected at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    /// In-memory simulated venue backed by a market file.
    #[default]
    Paper,
}

/// Venue-specific configuration variant.
///
/// The active variant is determined by the `type` field in the TOML config.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VenueSpecificConfig {
    Paper(PaperConfig),
}

impl Default for VenueSpecificConfig {
    fn default() -> Self {
        Self::Paper(PaperConfig::default())
    }
}

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Venue to trade on. Defaults to the paper venue.
    #[serde(default)]
    pub venue: VenueKind,

    /// Venue-specific connection settings.
    #[serde(default)]
    pub venue_config: VenueSpecificConfig,

    /// Settlement asset all cycles start and end in.
    #[serde(default = "default_target_asset")]
    pub target_asset: Asset,

    #[serde(default)]
    pub fees: FeesConfig,

    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub reserve: ReserveConfig,

    #[serde(default)]
    pub risk: RiskConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    /// Logging and tracing configuration.
    pub logging: LoggingConfig,
}

fn default_target_asset() -> Asset {
    Asset::new("USDT")
}

fn check_fraction(field: &'static str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO || value >= Decimal::ONE {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be at least 0 and below 1".to_string(),
        }
        .into());
    }
    Ok(())
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.target_asset.as_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "target_asset",
            }
            .into());
        }
        match &self.venue_config {
            VenueSpecificConfig::Paper(paper) => {
                if paper.market_file.trim().is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "market_file",
                    }
                    .into());
                }
            }
        }

        check_fraction("maker", self.fees.maker)?;
        check_fraction("taker", self.fees.taker)?;
        check_fraction("min_profit", self.strategy.min_profit)?;
        check_fraction("target_min_liquidity", self.reserve.target_min_liquidity)?;
        check_fraction("fee_min_liquidity", self.reserve.fee_min_liquidity)?;
        check_fraction("settlement_buffer", self.reserve.settlement_buffer)?;
        check_fraction("target_stop", self.risk.target_stop)?;

        if self.execution.book_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "book_depth",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.execution.max_leg_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_leg_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.scan.snapshot_max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "snapshot_max_retries",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Paper venue settings, when the paper venue is configured.
    #[must_use]
    pub fn paper_config(&self) -> Option<&PaperConfig> {
        match &self.venue_config {
            VenueSpecificConfig::Paper(config) => Some(config),
        }
    }

    /// Parameters injected into the planner and execution engine.
    #[must_use]
    pub fn trading_params(&self) -> TradingParams {
        TradingParams {
            target: self.target_asset.clone(),
            maker_fee: self.fees.maker,
            taker_fee: self.fees.taker,
            fee_asset: self.fees.fee_asset.clone(),
            min_profit: self.strategy.min_profit,
            target_min_liquidity: self.reserve.target_min_liquidity,
            fee_min_liquidity: self.reserve.fee_min_liquidity,
            settlement_buffer: self.reserve.settlement_buffer,
            buffer_assets: self.reserve.buffer_assets.clone(),
            target_stop: self.risk.target_stop,
            settle_delay: Duration::from_millis(self.execution.settle_delay_ms),
            book_depth: self.execution.book_depth,
            max_leg_attempts: self.execution.max_leg_attempts,
        }
    }

    /// Scan loop cadence and snapshot retry policy.
    #[must_use]
    pub fn scan_schedule(&self) -> ScanSchedule {
        ScanSchedule {
            num_scans: self.scan.num_scans,
            interval: Duration::from_millis(self.scan.interval_ms),
            snapshot_max_retries: self.scan.snapshot_max_retries,
            snapshot_retry_delay: Duration::from_millis(self.scan.snapshot_retry_delay_ms),
        }
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
