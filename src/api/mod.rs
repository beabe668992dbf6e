//! Public API surface: error taxonomy and display-surface formatting

pub mod formatting;
pub mod types;

pub use formatting::{JsonFormatter, RotationFormatter, TextFormatter};
pub use types::{CompassError, CompassResult, RotationUpdate};
