//! Configuration loading and validation from files on disk.

mod support;

use std::time::Duration;

use rust_decimal_macros::dec;
use triarb::error::{ConfigError, Error};
use triarb::infrastructure::config::settings::Config;

use support::config::{write_temp, LOGGING};

fn load(contents: &str) -> Result<Config, Error> {
    let file = write_temp(contents);
    Config::load(file.path())
}

#[test]
fn example_config_loads_with_documented_defaults() {
    let config = Config::load("config.example.toml").expect("example config");
    let params = config.trading_params();

    assert_eq!(params.target.as_str(), "USDT");
    assert_eq!(params.profit_threshold(), dec!(0.00325));
    assert_eq!(params.settle_delay, Duration::from_millis(1000));
    assert_eq!(config.scan_schedule().snapshot_retry_delay, Duration::from_secs(120));
    assert_eq!(
        config.paper_config().map(|p| p.market_file.as_str()),
        Some("markets.example.toml")
    );
}

#[test]
fn config_rejects_stop_above_one() {
    let result = load(&format!("{LOGGING}\n[risk]\ntarget_stop = 1.2\n"));

    match result {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "target_stop",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid target_stop error, got {err}"),
        Ok(config) => panic!(
            "Expected target_stop to be rejected, got {}",
            config.risk.target_stop
        ),
    }
}

#[test]
fn config_rejects_negative_fee() {
    let result = load(&format!("{LOGGING}\n[fees]\nmaker = -0.001\n"));

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue { field: "maker", .. }))
    ));
}

#[test]
fn config_rejects_zero_book_depth() {
    let result = load(&format!("{LOGGING}\n[execution]\nbook_depth = 0\n"));

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "book_depth",
            ..
        }))
    ));
}

#[test]
fn config_rejects_zero_snapshot_retries() {
    let result = load(&format!("{LOGGING}\n[scan]\nsnapshot_max_retries = 0\n"));

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "snapshot_max_retries",
            ..
        }))
    ));
}

#[test]
fn config_requires_market_file_for_paper_venue() {
    let result = load(&format!(
        "[venue_config]\ntype = \"paper\"\nmarket_file = \"  \"\n{LOGGING}"
    ));

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField {
            field: "market_file"
        }))
    ));
}

#[test]
fn config_without_logging_fails_to_parse() {
    let result = load("[strategy]\nmin_profit = 0.002\n");

    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn config_rejects_unknown_venue() {
    let result = load(&format!("venue = \"binance\"\n{LOGGING}"));

    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let result = Config::load("does-not-exist.toml");

    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}
