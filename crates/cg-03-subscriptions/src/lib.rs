//! # cg-03-subscriptions
//!
//! Subscription Broker subsystem for CivicGrid.
//!
//! ## Role in System
//!
//! - **Fan-Out**: one ordered feed per client subscription, fed from the
//!   shared bus
//! - **Catch-Up**: a client resuming after a disconnect passes a
//!   `since_version` watermark and first receives a snapshot of every
//!   currently-matching record above it, then the live stream, with no gap
//! - **Per-Id Ordering**: events for a single issue are delivered in
//!   non-decreasing version order; nothing is guaranteed across issue ids
//! - **Resource Bounds**: dropping a feed aborts its pump task and releases
//!   everything; a slow client that overflows its buffer is disconnected
//!   rather than blocking the bus
//!
//! ## Feed Anatomy
//!
//! ```text
//! subscribe(filter, since_version)
//!       │
//!       ├─ 1. open live bus subscription   (before the snapshot: no gap)
//!       ├─ 2. read catch-up snapshot        (version > since_version)
//!       └─ 3. spawn pump ──→ mpsc ──→ IssueFeed (Stream of FeedEvent)
//! ```

pub mod broker;
pub mod feed;

pub use broker::{BrokerConfig, SubscriptionBroker};
pub use feed::{FeedEvent, IssueFeed};
