//! Global `tracing` subscriber installation.

use crate::{TelemetryConfig, TelemetryError, TelemetryGuard};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Returns a guard to hold for the lifetime of the application. Calling
/// twice returns `AlreadyInitialized` instead of panicking, so embedding in
/// test binaries is safe.
///
/// # Errors
/// - `InvalidFilter`: the configured level/filter did not parse
/// - `AlreadyInitialized`: a global subscriber is already installed
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|_| TelemetryError::InvalidFilter(config.log_level.clone()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let install_result = if config.json_logs {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.try_init()
    };

    install_result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _private: () })
}
