//! Outbound adapters (driven side).

pub mod paper;

use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::{Config, VenueKind};
use crate::port::outbound::venue::Venue;

/// Connect the venue named by the configuration.
///
/// # Errors
///
/// Returns an error if the venue's settings are missing or its data cannot be loaded.
pub fn connect(config: &Config) -> Result<Arc<dyn Venue>> {
    match config.venue {
        VenueKind::Paper => {
            let paper = config.paper_config().ok_or(ConfigError::MissingField {
                field: "venue_config",
            })?;
            let venue = paper::PaperVenue::from_file(&paper.market_file, config.fees.maker)?;
            Ok(Arc::new(venue))
        }
    }
}
