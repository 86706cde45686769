//! # cg-01-issue-store
//!
//! Entity Store subsystem for CivicGrid.
//!
//! ## Role in System
//!
//! - **Single Source of Truth**: Authoritative current state of all issues
//!   and users
//! - **Choreography Origin**: Every committed `create`/`compare_and_set`
//!   publishes `IssueUpserted` on the shared bus before control returns to
//!   the caller's task
//! - **Optimistic Versioning**: Writes are serialized per record against the
//!   current `version`; the first committed write wins, the loser receives
//!   `Conflict` and must re-fetch
//!
//! ## Choreography Flow
//!
//! ```text
//! [Lifecycle (2)] ──create/CAS──→ [Issue Store (1)]
//!                                       │
//!                                 IssueUpserted
//!                                       │
//!                                       ▼
//!                                  [Event Bus]
//!                     ┌────────────────┼────────────────┐
//!                     ↓                ↓                ↓
//!            [Subscriptions (3)] [Aggregator (4)] [Notify worker]
//! ```
//!
//! Delivery to the bus is at-least-once; all consumers are idempotent on
//! `(id, version)`.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::memory::{InMemoryIssueStore, InMemoryUserStore};
pub use domain::{Cursor, NewIssue, Page};
pub use ports::store::{IssueStore, UserStore};
