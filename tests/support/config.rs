use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// The only section a config file must carry.
pub const LOGGING: &str = r#"
[logging]
level = "warn"
format = "pretty"
"#;

/// Paper market with a reverse ETH/BTC/USDT cycle worth about 0.67%
/// and a one-sided XRPBTC book.
pub const MARKET: &str = r#"
[[pairs]]
symbol = "ETHUSDT"
base = "ETH"
quote = "USDT"
qty_precision = 4
price_precision = 2
min_qty = "0.0001"
max_qty = "9000"
min_notional = "10"

[[pairs]]
symbol = "BTCUSDT"
base = "BTC"
quote = "USDT"
qty_precision = 5
price_precision = 2
min_qty = "0.00001"
max_qty = "9000"
min_notional = "10"

[[pairs]]
symbol = "ETHBTC"
base = "ETH"
quote = "BTC"
qty_precision = 4
price_precision = 6
min_qty = "0.0001"
max_qty = "100000"

[[pairs]]
symbol = "XRPUSDT"
base = "XRP"
quote = "USDT"
qty_precision = 0
price_precision = 4
min_qty = "1"
max_qty = "9000000"

[[pairs]]
symbol = "XRPBTC"
base = "XRP"
quote = "BTC"
qty_precision = 0
price_precision = 8
min_qty = "1"
max_qty = "9000000"

[[books]]
pair = "ETHUSDT"
bids = [{ price = "2000", size = "40" }]
asks = [{ price = "2002", size = "50" }]

[[books]]
pair = "BTCUSDT"
bids = [{ price = "29990", size = "10" }]
asks = [{ price = "30001", size = "8" }]

[[books]]
pair = "ETHBTC"
bids = [{ price = "0.0672", size = "50" }]
asks = [{ price = "0.0673", size = "45" }]

[[books]]
pair = "XRPUSDT"
bids = [{ price = "0.5", size = "100000" }]
asks = [{ price = "0.5001", size = "100000" }]

[[books]]
pair = "XRPBTC"
bids = [{ price = "0.0000166", size = "50000" }]

[balances]
USDT = "1000"
"#;

/// Write `contents` to a temp file that lives as long as the handle.
pub fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Paper config pointing at `market`, with every delay zeroed.
pub fn paper_config(market: &Path) -> String {
    format!(
        r#"
[venue_config]
type = "paper"
market_file = '{}'

[execution]
settle_delay_ms = 0

[scan]
num_scans = 3
interval_ms = 0
snapshot_max_retries = 2
snapshot_retry_delay_ms = 0
{LOGGING}"#,
        market.display()
    )
}
