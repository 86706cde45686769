//! # Shared Types Crate
//!
//! This crate contains the civic-issue domain entities, subscription filters,
//! and the error taxonomy shared across subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Fixed Schema**: Issues and Users have a fixed, versioned shape; the
//!   store never accepts arbitrary fields at write time.
//! - **Forward-Only Lifecycle**: `IssueStatus` only moves along the edges of
//!   the transition graph; terminal states never regress.

pub mod entities;
pub mod errors;
pub mod filters;
pub mod time;

pub use entities::*;
pub use errors::CoreError;
pub use filters::IssueFilter;
pub use time::{SystemTimeSource, TimeSource, Timestamp};
