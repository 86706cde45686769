//! # Shared Bus - Event Bus for Inter-Subsystem Communication
//!
//! Fans out every committed issue change to the Subscription Broker, the
//! Aggregator, and the notification worker.
//!
//! ## Choreography Pattern
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Issue Store  │                    │ Aggregator / │
//! │              │    publish()       │ Broker / ... │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery Contract
//!
//! - At-least-once per live subscriber, relative to the store's commit order
//! - No ordering guarantee across issue ids; consumers enforce per-id
//!   monotonicity through `(id, version)` idempotence
//! - A lagging subscriber skips ahead rather than blocking publishers

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{CivicEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
