//! # Gateway Telemetry
//!
//! Structured logging for the notification gateway.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gateway_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GW_SERVICE_NAME` | `ws-rpc-gateway` | Service name in the startup line |
//! | `GW_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `GW_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `GW_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |

#![warn(missing_docs)]

mod config;
mod subscriber;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log filter directive did not parse.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber was already installed, or installation failed.
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Initialize logging.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    subscriber::init_subscriber(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active. Drop on exit.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
