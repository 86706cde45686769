//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for structured logging.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name stamped on every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "civic-grid".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CG_SERVICE_NAME`: Service name (default: civic-grid)
    /// - `CG_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `CG_JSON_LOGS`: Emit JSON logs (default: false)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("CG_SERVICE_NAME").unwrap_or_else(|_| "civic-grid".to_string()),

            log_level: env::var("CG_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("CG_JSON_LOGS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}
