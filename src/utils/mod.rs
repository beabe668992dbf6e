//! Configuration utilities

pub mod config;

pub use config::{CompassConfig, ConfigError, RetryPolicy};
