//! One-shot position acquisition interface

use crate::core::GeoCoordinate;
use crate::sensors::SensorResult;

/// Source of a single observer position fix (decimal degrees, WGS84)
///
/// The platform's position request can suspend indefinitely behind a
/// permission prompt or satellite acquisition, so both a bounded
/// blocking call and a begin/poll pair are provided. The poll form lets
/// a single-threaded event loop abandon an outstanding request by
/// calling `cancel` and never polling again.
pub trait PositionProvider {
    /// Request the current position, waiting at most `timeout_ms`
    ///
    /// Expiry of the bounded wait surfaces as `SensorError::Timeout`.
    fn request_position(&mut self, timeout_ms: u32) -> SensorResult<GeoCoordinate>;

    /// Start a non-blocking position request
    ///
    /// Fails with `RequestInProgress` if a prior request is still
    /// outstanding.
    fn begin_request(&mut self) -> SensorResult<()>;

    /// Poll an outstanding request; `None` while still pending
    fn poll_position(&mut self) -> Option<SensorResult<GeoCoordinate>>;

    /// Abandon any outstanding request
    ///
    /// Idempotent; a cancelled request must never deliver a late result
    /// through `poll_position`.
    fn cancel(&mut self);

    /// Whether a non-blocking request is currently outstanding
    fn is_pending(&self) -> bool;
}
