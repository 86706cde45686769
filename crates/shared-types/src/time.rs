//! # Time Source
//!
//! All clock reads go through the `TimeSource` port so tests can inject a
//! deterministic clock. Timestamps are milliseconds since the Unix epoch.

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Clock abstraction for timestamping writes.
pub trait TimeSource: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> Timestamp;
}

/// Default time source using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
