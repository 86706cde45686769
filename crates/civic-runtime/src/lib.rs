//! # CivicGrid Runtime
//!
//! The entry point wiring for the CivicGrid engine.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration with explicit validation, no globals
//! - `wiring/` - subsystem construction and event routing
//!
//! ## Choreography Flow
//!
//! ```text
//! Citizen ──submit──→ Lifecycle(2) ──create──→ IssueStore(1)
//!                                                    │
//!                                              IssueUpserted
//!                                                    ▼
//!                                                Event Bus
//!                        ┌──────────────┬──────────────┐
//!                        ▼              ▼              ▼
//!                 Subscriptions(3) Aggregator(4)  Notify worker
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (env-driven)
//! 2. Validate configuration
//! 3. Build and wire subsystems (`GridServices::build`)
//! 4. Serve until shutdown; tear down workers gracefully

pub mod container;
pub mod wiring;

pub use container::{ConfigError, GridConfig};
pub use wiring::GridServices;
