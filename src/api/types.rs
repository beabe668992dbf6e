//! Common API types and data structures

use crate::sensors::SensorError;
use crate::validation::CoordinateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for compass operations
pub type CompassResult<T> = Result<T, CompassError>;

/// Compass error types
#[derive(Debug, Clone, PartialEq)]
pub enum CompassError {
    /// Position source failed or was denied; terminal for the session
    PositionUnavailable { error: SensorError },
    /// Malformed coordinate from the platform; treated as terminal like
    /// `PositionUnavailable`
    InvalidCoordinate { error: CoordinateError },
    /// Operation requires a started session
    NotStarted,
    /// Session already started or acquisition already outstanding
    AlreadyStarted,
    /// Session has been shut down
    Disposed,
    /// Invalid configuration value
    ConfigurationError { parameter: String, value: String },
}

impl fmt::Display for CompassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompassError::PositionUnavailable { error } => {
                write!(f, "Unable to determine direction: {}", error)
            }
            CompassError::InvalidCoordinate { error } => {
                write!(f, "Invalid coordinate from position source: {}", error)
            }
            CompassError::NotStarted => write!(f, "Tracker not started"),
            CompassError::AlreadyStarted => write!(f, "Tracker already started"),
            CompassError::Disposed => write!(f, "Tracker has been shut down"),
            CompassError::ConfigurationError { parameter, value } => {
                write!(f, "Configuration error: invalid {} = {}", parameter, value)
            }
        }
    }
}

impl std::error::Error for CompassError {}

impl From<SensorError> for CompassError {
    fn from(error: SensorError) -> Self {
        CompassError::PositionUnavailable { error }
    }
}

impl From<CoordinateError> for CompassError {
    fn from(error: CoordinateError) -> Self {
        CompassError::InvalidCoordinate { error }
    }
}

/// Rotation update published to the display surface
///
/// `rotation_deg` is the dial rotation, bearing minus (corrected)
/// heading, wrapped into (-180, 180] so the dial takes the short way
/// round. One update supersedes the previous; there is no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationUpdate {
    /// Monotonic per-session sequence number
    pub sequence: u32,
    /// Cached bearing to the target, degrees from true north in [0, 360)
    pub bearing_deg: f64,
    /// Heading that produced this update, declination-corrected, degrees
    /// from true north
    pub heading_deg: f64,
    /// Dial rotation in (-180, 180]
    pub rotation_deg: f64,
    /// Great-circle distance to the target (kilometers)
    pub distance_km: f64,
    /// Timestamp carried by the underlying heading event (milliseconds)
    pub timestamp_ms: u64,
}
