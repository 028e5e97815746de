//! Structured logging setup.
//!
//! JSON output by default for production, pretty output for local
//! development, selected by [`LoggingSection::json`].

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingSection;

/// Errors raised while initializing logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured level filter is invalid.
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// A global subscriber was already installed.
    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Initializes the global tracing subscriber from the logging config.
///
/// # Errors
///
/// Returns an error if the level filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingSection) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidLevel(e.to_string()))?;

    if config.json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?;
    }

    Ok(())
}
