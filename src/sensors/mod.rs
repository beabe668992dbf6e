//! Sensor abstraction layer for position and heading acquisition
//!
//! This module isolates the platform's ambient geolocation and
//! orientation capabilities behind injected interfaces so the bearing
//! engine and orientation tracker are testable without a device.

pub mod error;
pub mod heading;
pub mod mock;
pub mod position;

pub use error::{RecoveryStrategy, SensorError, SensorResult};
pub use heading::HeadingSource;
pub use mock::{MockHeadingSource, MockPositionProvider};
pub use position::PositionProvider;

/// Raw heading event delivered by a heading source
///
/// `degrees` may be absent when the sensor could not produce a reading;
/// consumers treat that as "no update", not a fault.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingEvent {
    pub degrees: Option<f64>,
    pub timestamp_ms: u64,
}

impl HeadingEvent {
    pub fn new(degrees: f64) -> Self {
        Self {
            degrees: Some(degrees),
            timestamp_ms: 0,
        }
    }

    /// Event with no usable reading
    pub fn blank() -> Self {
        Self {
            degrees: None,
            timestamp_ms: 0,
        }
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}
