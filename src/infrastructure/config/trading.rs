//! Fee, strategy, reserve, risk, execution and scan configuration sections.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::id::Asset;

/// Venue fee schedule, as decimal fractions (0.075% -> 0.00075).
#[derive(Debug, Clone, Deserialize)]
pub struct FeesConfig {
    #[serde(default = "default_maker_fee")]
    pub maker: Decimal,
    #[serde(default = "default_taker_fee")]
    pub taker: Decimal,
    /// Asset used to pay trading fees at a discount.
    #[serde(default = "default_fee_asset")]
    pub fee_asset: Asset,
}

fn default_maker_fee() -> Decimal {
    Decimal::new(75, 5) // 0.075%
}

fn default_taker_fee() -> Decimal {
    Decimal::new(75, 5)
}

fn default_fee_asset() -> Asset {
    Asset::new("BNB")
}

impl Default for FeesConfig {
    fn default() -> Self {
        Self {
            maker: default_maker_fee(),
            taker: default_taker_fee(),
            fee_asset: default_fee_asset(),
        }
    }
}

/// Opportunity selection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// Minimum margin over fees a cycle must clear, as a fraction.
    #[serde(default = "default_min_profit")]
    pub min_profit: Decimal,
}

fn default_min_profit() -> Decimal {
    Decimal::new(1, 3) // 0.1%
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            min_profit: default_min_profit(),
        }
    }
}

/// Balances held back from trading.
#[derive(Debug, Clone, Deserialize)]
pub struct ReserveConfig {
    /// Fraction of the target asset the bot never touches.
    #[serde(default = "default_target_min_liquidity")]
    pub target_min_liquidity: Decimal,
    /// Fraction of the fee asset kept so fee discounts keep applying.
    #[serde(default = "default_fee_min_liquidity")]
    pub fee_min_liquidity: Decimal,
    /// Fraction held back on `buffer_assets` for fees charged before discount.
    #[serde(default = "default_settlement_buffer")]
    pub settlement_buffer: Decimal,
    #[serde(default = "default_buffer_assets")]
    pub buffer_assets: Vec<Asset>,
}

fn default_target_min_liquidity() -> Decimal {
    Decimal::new(50, 2)
}

fn default_fee_min_liquidity() -> Decimal {
    Decimal::new(20, 2)
}

fn default_settlement_buffer() -> Decimal {
    Decimal::new(5, 3)
}

fn default_buffer_assets() -> Vec<Asset> {
    ["BTC", "ETH", "USDC"].into_iter().map(Asset::new).collect()
}

impl Default for ReserveConfig {
    fn default() -> Self {
        Self {
            target_min_liquidity: default_target_min_liquidity(),
            fee_min_liquidity: default_fee_min_liquidity(),
            settlement_buffer: default_settlement_buffer(),
            buffer_assets: default_buffer_assets(),
        }
    }
}

/// Account-level loss limit.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Fraction of the starting target balance that may be lost.
    #[serde(default = "default_target_stop")]
    pub target_stop: Decimal,
}

fn default_target_stop() -> Decimal {
    Decimal::new(10, 2)
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            target_stop: default_target_stop(),
        }
    }
}

/// Order execution tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Wait before cancelling an order that has not completed.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Book levels requested per side.
    #[serde(default = "default_book_depth")]
    pub book_depth: usize,
    /// Resubmissions and depth escalations allowed per leg.
    #[serde(default = "default_max_leg_attempts")]
    pub max_leg_attempts: u32,
}

const fn default_settle_delay_ms() -> u64 {
    1000
}

const fn default_book_depth() -> usize {
    20
}

const fn default_max_leg_attempts() -> u32 {
    25
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            book_depth: default_book_depth(),
            max_leg_attempts: default_max_leg_attempts(),
        }
    }
}

/// Scan loop cadence and snapshot retry policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_num_scans")]
    pub num_scans: u64,
    /// Pause between scan cycles.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Snapshot fetch attempts before a cycle is abandoned.
    #[serde(default = "default_snapshot_max_retries")]
    pub snapshot_max_retries: u32,
    #[serde(default = "default_snapshot_retry_delay_ms")]
    pub snapshot_retry_delay_ms: u64,
}

const fn default_num_scans() -> u64 {
    1000
}

const fn default_interval_ms() -> u64 {
    1000
}

const fn default_snapshot_max_retries() -> u32 {
    30
}

const fn default_snapshot_retry_delay_ms() -> u64 {
    120_000
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            num_scans: default_num_scans(),
            interval_ms: default_interval_ms(),
            snapshot_max_retries: default_snapshot_max_retries(),
            snapshot_retry_delay_ms: default_snapshot_retry_delay_ms(),
        }
    }
}
