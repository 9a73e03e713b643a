//! Paper venue configuration.

use serde::Deserialize;

/// Settings for the in-memory paper venue.
#[derive(Debug, Clone, Deserialize)]
pub struct PaperConfig {
    /// TOML file holding pair rules, order books and starting balances.
    #[serde(default = "default_market_file")]
    pub market_file: String,
}

fn default_market_file() -> String {
    "markets.toml".to_string()
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            market_file: default_market_file(),
        }
    }
}
