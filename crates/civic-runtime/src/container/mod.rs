//! # Runtime Container
//!
//! Configuration value threaded into every component at construction, with
//! an explicit init/teardown lifecycle instead of ambient global state.

pub mod config;

pub use config::{BusConfig, ConfigError, GridConfig, SubscriptionSettings, TriageSettings};
