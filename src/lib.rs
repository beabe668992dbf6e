//! Qibla Compass Core
//!
//! Computes the great-circle bearing from an observer to the Kaaba and
//! keeps a live dial rotation in sync with a stream of device heading
//! samples. Position and heading sources are injected interfaces, so the
//! whole pipeline runs against mocks without a device.

pub mod core;
pub mod bearing;
pub mod sensors;
pub mod tracker;
pub mod validation;
pub mod api;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{GeoCoordinate, HeadingReference, EARTH_RADIUS_KM, KAABA};
pub use bearing::{bearing_to_kaaba, distance_to_kaaba_km, initial_bearing, wrap_180, wrap_360};
pub use sensors::{
    HeadingEvent, HeadingSource, MockHeadingSource, MockPositionProvider, PositionProvider,
    RecoveryStrategy, SensorError, SensorResult,
};
pub use tracker::{CallbackHandle, QiblaTracker, SessionStats, TrackerState};
pub use validation::{validate_coordinate, validate_heading, CoordinateError};
pub use api::{
    CompassError, CompassResult, JsonFormatter, RotationFormatter, RotationUpdate, TextFormatter,
};
pub use utils::{CompassConfig, ConfigError, RetryPolicy};
