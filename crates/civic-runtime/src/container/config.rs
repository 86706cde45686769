//! # Grid Configuration
//!
//! Unified configuration for all subsystems and runtime parameters. There
//! is no ambient global state: the config value is built once and threaded
//! into each component at construction.

use cg_02_lifecycle::TriageConfig;
use cg_03_subscriptions::BrokerConfig;
use std::time::Duration;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct GridConfig {
    /// Event bus configuration.
    pub bus: BusConfig,
    /// AI triage retry budget.
    pub triage: TriageSettings,
    /// Per-client subscription feeds.
    pub subscriptions: SubscriptionSettings,
}

impl GridConfig {
    /// Validate configuration before wiring.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any capacity is zero or the triage budget is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.capacity == 0 {
            return Err(ConfigError::ZeroCapacity("bus.capacity"));
        }
        if self.subscriptions.feed_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("subscriptions.feed_capacity"));
        }
        if self.triage.max_attempts == 0 {
            return Err(ConfigError::EmptyTriageBudget);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// A buffer capacity was configured as zero.
    ZeroCapacity(&'static str),
    /// Triage must be allowed at least one attempt.
    EmptyTriageBudget,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroCapacity(field) => {
                write!(f, "{field} must be greater than zero")
            }
            ConfigError::EmptyTriageBudget => {
                write!(f, "triage.max_attempts must be at least 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Event bus configuration.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Events buffered per bus subscriber before lag-skipping.
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

/// AI triage collaborator configuration.
#[derive(Debug, Clone)]
pub struct TriageSettings {
    /// Maximum classification attempts before the manual-review fallback.
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds; doubles per attempt.
    pub base_delay_ms: u64,
    /// Upper bound on the backoff delay in milliseconds.
    pub max_delay_ms: u64,
    /// Per-call timeout in milliseconds.
    pub call_timeout_ms: u64,
}

impl Default for TriageSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 200,
            max_delay_ms: 5_000,
            call_timeout_ms: 10_000,
        }
    }
}

impl TriageSettings {
    /// Convert into the lifecycle subsystem's config type.
    #[must_use]
    pub fn to_triage_config(&self) -> TriageConfig {
        TriageConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            call_timeout: Duration::from_millis(self.call_timeout_ms),
        }
    }
}

/// Subscription feed configuration.
#[derive(Debug, Clone)]
pub struct SubscriptionSettings {
    /// Events buffered per feed before the client counts as too slow.
    pub feed_capacity: usize,
    /// Seconds between heartbeats on idle feeds.
    pub heartbeat_interval_secs: u64,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            feed_capacity: 256,
            heartbeat_interval_secs: 30,
        }
    }
}

impl SubscriptionSettings {
    /// Convert into the broker subsystem's config type.
    #[must_use]
    pub fn to_broker_config(&self) -> BrokerConfig {
        BrokerConfig {
            feed_capacity: self.feed_capacity,
            heartbeat_interval: Duration::from_secs(self.heartbeat_interval_secs),
        }
    }
}
