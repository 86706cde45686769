//! Ports for the Entity Store subsystem.

pub mod store;

pub use store::{IssueStore, UserStore};
