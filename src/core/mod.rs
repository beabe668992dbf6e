//! Core types and constants for the qibla compass

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
