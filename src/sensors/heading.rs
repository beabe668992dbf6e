//! Continuous heading subscription interface

use crate::core::HeadingReference;
use crate::sensors::{HeadingEvent, SensorResult};

/// Source of repeated device heading samples
///
/// Samples are degrees from the north reference declared by
/// `reference()`; magnetic sources are not declination-corrected here,
/// that is the consumer's job. Events arrive in emission order and may
/// carry no reading at all (`degrees: None`), which consumers tolerate
/// as "no update".
pub trait HeadingSource {
    /// Activate the underlying sensor and begin buffering events
    fn start(&mut self) -> SensorResult<()>;

    /// Deactivate the sensor and release its platform resource
    ///
    /// Idempotent; required on teardown. After `stop`, `poll` returns
    /// `None` until the source is started again.
    fn stop(&mut self);

    /// Drain the next pending event, if any
    ///
    /// Sensor-driven sources can emit tens of events per second; callers
    /// drain in a loop and apply last-write-wins.
    fn poll(&mut self) -> SensorResult<Option<HeadingEvent>>;

    /// North reference this source reports against
    fn reference(&self) -> HeadingReference;

    /// Whether the subscription is currently active
    fn is_active(&self) -> bool;
}
