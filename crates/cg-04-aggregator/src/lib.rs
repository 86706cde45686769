//! # cg-04-aggregator
//!
//! Aggregator subsystem for CivicGrid.
//!
//! ## Role in System
//!
//! - **Derived State Only**: running counts by status and the mean
//!   resolution time, maintained incrementally from the bus and rebuildable
//!   from a full store scan at any time
//! - **Idempotent**: duplicate delivery of the same `(id, version)` never
//!   double-counts; a per-issue last-applied-version map gates every update
//!
//! The landing page and authority dashboard read `AggregateStats`
//! snapshots; citizens may read them too (public statistics).

pub mod stats;
pub mod worker;

pub use stats::{AggregateStats, StatsState, StatusCounts};
pub use worker::Aggregator;
