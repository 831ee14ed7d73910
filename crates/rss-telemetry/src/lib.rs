//! # RSS Telemetry
//!
//! Structured logging for Reed-Solomon Studio.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rss_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RSS_LOG_LEVEL` / `RUST_LOG` | `warn` | Log filter |
//! | `RSS_JSON_LOGS` | `false` | JSON lines instead of pretty output |
//! | `RSS_CONSOLE_OUTPUT` | `true` | Disable to silence logs |
//! | `RSS_SERVICE_NAME` | `rss-studio` | Service name in the startup event |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Unusable configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the global `tracing` subscriber described by `config`.
///
/// Fails if a subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(config)?;

    tracing::debug!(
        service = %config.service_name,
        json = config.json_logs,
        "telemetry initialized"
    );
    Ok(())
}
