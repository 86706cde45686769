//! # Civic Telemetry
//!
//! Structured logging for CivicGrid services.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use civic_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("Failed to init telemetry");
//!
//!     // Your application code here; tracing output is now collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CG_SERVICE_NAME` | `civic-grid` | Service name stamped on every log line |
//! | `CG_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honored) |
//! | `CG_JSON_LOGS` | `false` | Emit JSON lines instead of human-readable output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_telemetry;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed. Re-initialization is an
    /// error, not a panic, so embedding in tests is harmless.
    #[error("Telemetry already initialized: {0}")]
    AlreadyInitialized(String),

    /// The configured filter directive did not parse.
    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),
}

/// Guard that keeps telemetry active. Drop to flush and shutdown.
pub struct TelemetryGuard {
    pub(crate) _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
