//! Binary-level tests for the `triarb` command line.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;

use support::config::{paper_config, write_temp, LOGGING, MARKET};

fn triarb() -> Command {
    Command::cargo_bin("triarb").expect("binary built")
}

#[test]
fn cli_returns_nonzero_on_config_error() {
    let config = write_temp(&format!("{LOGGING}\n[reserve]\ntarget_min_liquidity = 1.5\n"));

    triarb()
        .args(["config", "validate", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("target_min_liquidity"));
}

#[test]
fn cli_validates_example_config() {
    triarb()
        .args(["config", "validate", "--config", "config.example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn cli_scan_emits_json_rows() {
    let market = write_temp(MARKET);
    let config = write_temp(&paper_config(market.path()));

    triarb()
        .args(["scan", "--json", "--config"])
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"scan""#))
        .stdout(predicate::str::contains("ETHBTC"))
        .stdout(predicate::str::contains("XRPBTC").not());
}

#[test]
fn cli_run_executes_requested_scans() {
    let market = write_temp(MARKET);
    let config = write_temp(&paper_config(market.path()));

    let assert = triarb()
        .args(["run", "--scans", "1", "--json", "--config"])
        .arg(config.path())
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let cycles: Vec<serde_json::Value> = stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter(|value| value["type"] == "cycle")
        .collect();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0]["payload"]["scan_id"], 1);
    assert_eq!(cycles[0]["payload"]["status"], "executed");
    assert_eq!(cycles[0]["payload"]["orders"].as_array().map(Vec::len), Some(3));
    assert_eq!(cycles[0]["payload"]["report"]["arbitrage_lost"], false);
}

#[test]
fn cli_run_fails_when_market_file_is_missing() {
    let config = write_temp(&format!(
        "[venue_config]\ntype = \"paper\"\nmarket_file = \"no-such-market.toml\"\n{LOGGING}"
    ));

    triarb()
        .args(["run", "--scans", "1", "--config"])
        .arg(config.path())
        .assert()
        .failure();
}
