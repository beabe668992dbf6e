//! Session state machine tying position acquisition, the bearing engine,
//! and the heading stream together
//!
//! One tracker instance owns one display session. All processing is
//! single-threaded and event-driven: a one-shot position acquisition
//! followed by a stream of heading events, each of which overwrites the
//! displayed rotation (last-write-wins, no buffering).

use crate::api::{CompassError, CompassResult, RotationUpdate};
use crate::bearing::{distance_km, initial_bearing, wrap_180, wrap_360};
use crate::core::{GeoCoordinate, HeadingReference};
use crate::sensors::{HeadingEvent, HeadingSource, PositionProvider};
use crate::utils::{CompassConfig, ConfigError};
use crate::validation::validate_coordinate;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No position fix yet; the display shows a placeholder
    AwaitingPosition,
    /// Bearing cached, heading subscription active
    Tracking,
    /// Position acquisition failed; terminal for this session
    Unavailable,
    /// Shut down; no further state changes
    Disposed,
}

/// Per-session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Position acquisition attempts made
    pub position_attempts: u32,
    /// Heading events delivered to the tracker
    pub events_received: u32,
    /// Events ignored (absent or non-finite reading, or wrong state)
    pub events_skipped: u32,
    /// Rotation updates published to callbacks
    pub updates_published: u32,
}

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Callback type for rotation updates
pub type RotationCallback = Box<dyn Fn(&RotationUpdate)>;

/// The orientation tracker
///
/// Position and heading sources are injected so sessions run against
/// platform bindings in production and mocks in tests. Bearing and
/// rotation are owned exclusively by this instance; there is no
/// cross-session sharing.
pub struct QiblaTracker<P: PositionProvider, H: HeadingSource> {
    config: CompassConfig,
    position: P,
    heading: H,
    state: TrackerState,
    bearing_deg: Option<f64>,
    distance_km: Option<f64>,
    last_update: Option<RotationUpdate>,
    callbacks: HashMap<CallbackHandle, RotationCallback>,
    callback_counter: u32,
    sequence: u32,
    stats: SessionStats,
}

impl<P: PositionProvider, H: HeadingSource> QiblaTracker<P, H> {
    /// Create a tracker for one session
    pub fn new(config: CompassConfig, position: P, heading: H) -> CompassResult<Self> {
        config.validate().map_err(|e| match e {
            ConfigError::InvalidParameter {
                parameter, value, ..
            } => CompassError::ConfigurationError { parameter, value },
            other => CompassError::ConfigurationError {
                parameter: "config".to_string(),
                value: other.to_string(),
            },
        })?;

        Ok(Self {
            config,
            position,
            heading,
            state: TrackerState::AwaitingPosition,
            bearing_deg: None,
            distance_km: None,
            last_update: None,
            callbacks: HashMap::new(),
            callback_counter: 0,
            sequence: 0,
            stats: SessionStats::default(),
        })
    }

    /// Acquire the position (bounded wait, honoring the retry policy),
    /// cache the bearing, and start the heading subscription
    ///
    /// Any failure is terminal for the session: the tracker enters
    /// `Unavailable` and never retries on its own afterwards.
    pub fn start(&mut self) -> CompassResult<()> {
        self.ensure_awaiting()?;

        let max_attempts = self.config.retry.max_attempts;
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.stats.position_attempts += 1;

            match self
                .position
                .request_position(self.config.position_timeout_ms)
            {
                Ok(fix) => return self.complete_acquisition(fix),
                Err(e) => {
                    warn!("position attempt {}/{} failed: {}", attempt, max_attempts, e);
                    if attempt < max_attempts && e.is_recoverable() {
                        if self.config.retry.retry_delay_ms > 0 {
                            thread::sleep(Duration::from_millis(self.config.retry.retry_delay_ms));
                        }
                        continue;
                    }
                    self.state = TrackerState::Unavailable;
                    return Err(e.into());
                }
            }
        }
    }

    /// Start a non-blocking position acquisition
    ///
    /// Pair with `poll_acquisition` from the host event loop. Shutting
    /// the tracker down while the request is outstanding abandons it.
    pub fn begin_acquisition(&mut self) -> CompassResult<()> {
        self.ensure_awaiting()?;
        self.position.begin_request()?;
        self.stats.position_attempts += 1;
        Ok(())
    }

    /// Poll an acquisition started with `begin_acquisition`
    ///
    /// Returns `Ok(true)` once tracking has begun, `Ok(false)` while the
    /// request (or a policy-driven retry) is still pending.
    pub fn poll_acquisition(&mut self) -> CompassResult<bool> {
        match self.state {
            TrackerState::Disposed => return Err(CompassError::Disposed),
            TrackerState::Tracking => return Ok(true),
            TrackerState::Unavailable => {
                return Err(CompassError::PositionUnavailable {
                    error: crate::sensors::SensorError::SignalUnavailable {
                        details: "session already failed".to_string(),
                    },
                })
            }
            TrackerState::AwaitingPosition => {}
        }

        match self.position.poll_position() {
            None => Ok(false),
            Some(Ok(fix)) => {
                self.complete_acquisition(fix)?;
                Ok(true)
            }
            Some(Err(e)) => {
                warn!(
                    "position attempt {}/{} failed: {}",
                    self.stats.position_attempts, self.config.retry.max_attempts, e
                );
                if self.stats.position_attempts < self.config.retry.max_attempts
                    && e.is_recoverable()
                {
                    // The event loop paces retries; no sleep here
                    self.stats.position_attempts += 1;
                    self.position.begin_request()?;
                    return Ok(false);
                }
                self.state = TrackerState::Unavailable;
                Err(e.into())
            }
        }
    }

    fn ensure_awaiting(&self) -> CompassResult<()> {
        match self.state {
            TrackerState::Disposed => Err(CompassError::Disposed),
            TrackerState::AwaitingPosition if self.position.is_pending() => {
                Err(CompassError::AlreadyStarted)
            }
            TrackerState::AwaitingPosition => Ok(()),
            _ => Err(CompassError::AlreadyStarted),
        }
    }

    /// Shared success path: validate the fix, compute and cache bearing
    /// and distance, activate the heading stream
    fn complete_acquisition(&mut self, fix: GeoCoordinate) -> CompassResult<()> {
        if let Err(e) = validate_coordinate(&fix) {
            // Sensor garbage; same terminal outcome as an outright failure
            warn!("position source returned invalid coordinate: {}", e);
            self.state = TrackerState::Unavailable;
            return Err(e.into());
        }

        let bearing = initial_bearing(&fix, &self.config.target)?;
        let distance = distance_km(&fix, &self.config.target)?;
        self.bearing_deg = Some(bearing);
        self.distance_km = Some(distance);

        if let Err(e) = self.heading.start() {
            warn!("heading source failed to start: {}", e);
            self.state = TrackerState::Unavailable;
            return Err(e.into());
        }

        self.state = TrackerState::Tracking;
        info!(
            "tracking: observer ({:.4}, {:.4}), bearing {:.2}°, {:.0} km to target",
            fix.lat, fix.lon, bearing, distance
        );
        Ok(())
    }

    /// Apply one heading event
    ///
    /// Events arriving before tracking begins or after shutdown are
    /// ignored. Absent or non-finite readings are skipped and the last
    /// valid rotation persists.
    pub fn on_heading_event(&mut self, event: &HeadingEvent) {
        if self.state != TrackerState::Tracking {
            return;
        }
        self.stats.events_received += 1;

        let degrees = match event.degrees {
            Some(d) if d.is_finite() => d,
            _ => {
                self.stats.events_skipped += 1;
                debug!("ignoring heading event with no usable reading");
                return;
            }
        };

        // Bearing is always Some while Tracking
        let bearing = match self.bearing_deg {
            Some(b) => b,
            None => return,
        };

        let true_heading = wrap_360(match self.heading.reference() {
            HeadingReference::TrueNorth => degrees,
            HeadingReference::MagneticNorth => degrees + self.config.magnetic_declination_deg,
        });

        self.sequence += 1;
        let update = RotationUpdate {
            sequence: self.sequence,
            bearing_deg: bearing,
            heading_deg: true_heading,
            rotation_deg: wrap_180(bearing - true_heading),
            distance_km: self.distance_km.unwrap_or(0.0),
            timestamp_ms: event.timestamp_ms,
        };

        for callback in self.callbacks.values() {
            callback(&update);
        }
        self.stats.updates_published += 1;
        self.last_update = Some(update);
    }

    /// Drain all pending events from the heading source
    ///
    /// Returns the number of events applied. Transient poll failures end
    /// the drain early; the next pump retries.
    pub fn pump(&mut self) -> CompassResult<u32> {
        match self.state {
            TrackerState::Disposed => return Err(CompassError::Disposed),
            TrackerState::Tracking => {}
            _ => return Ok(0),
        }

        let mut applied = 0;
        loop {
            match self.heading.poll() {
                Ok(Some(event)) => {
                    self.on_heading_event(&event);
                    applied += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("heading poll failed: {}", e);
                    break;
                }
            }
        }
        Ok(applied)
    }

    /// Register a rotation callback
    pub fn register_callback(&mut self, callback: RotationCallback) -> CallbackHandle {
        self.callback_counter += 1;
        let handle = CallbackHandle(self.callback_counter);
        self.callbacks.insert(handle, callback);
        handle
    }

    /// Remove a previously registered callback
    pub fn remove_callback(&mut self, handle: CallbackHandle) -> bool {
        self.callbacks.remove(&handle).is_some()
    }

    /// Current session state
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Whether the bearing has been computed for this session
    pub fn bearing_known(&self) -> bool {
        self.bearing_deg.is_some()
    }

    /// Cached bearing to the target, degrees from true north
    pub fn bearing(&self) -> Option<f64> {
        self.bearing_deg
    }

    /// Great-circle distance to the target (kilometers)
    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    /// Most recent rotation update, if any
    pub fn last_update(&self) -> Option<&RotationUpdate> {
        self.last_update.as_ref()
    }

    /// Session counters
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Mutable access to the heading source (mock scripting, calibration)
    pub fn heading_source_mut(&mut self) -> &mut H {
        &mut self.heading
    }

    /// Mutable access to the position provider
    pub fn position_provider_mut(&mut self) -> &mut P {
        &mut self.position
    }

    /// Tear the session down: abandon any pending position request, stop
    /// the heading subscription, drop all callbacks
    ///
    /// Idempotent; nothing fires after the first call. Required on
    /// disposal so the underlying sensor resource is released.
    pub fn shutdown(&mut self) {
        if self.state == TrackerState::Disposed {
            return;
        }
        self.position.cancel();
        self.heading.stop();
        self.callbacks.clear();
        self.state = TrackerState::Disposed;
        info!("tracker shut down after {} updates", self.stats.updates_published);
    }
}

impl<P: PositionProvider, H: HeadingSource> Drop for QiblaTracker<P, H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KAABA;
    use crate::sensors::{MockHeadingSource, MockPositionProvider, SensorError};
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tracker_with(
        config: CompassConfig,
        position: MockPositionProvider,
        heading: MockHeadingSource,
    ) -> QiblaTracker<MockPositionProvider, MockHeadingSource> {
        QiblaTracker::new(config, position, heading).unwrap()
    }

    fn london() -> GeoCoordinate {
        GeoCoordinate::new(51.5074, -0.1278)
    }

    #[test]
    fn test_successful_session() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(london()),
            MockHeadingSource::new(),
        );

        assert_eq!(tracker.state(), TrackerState::AwaitingPosition);
        assert!(!tracker.bearing_known());

        tracker.start().unwrap();
        assert_eq!(tracker.state(), TrackerState::Tracking);
        assert!(tracker.bearing_known());
        assert_relative_eq!(tracker.bearing().unwrap(), 118.9872, epsilon = 1e-3);
        assert_eq!(tracker.heading_source_mut().start_count(), 1);

        tracker.heading_source_mut().push_heading(10.0);
        assert_eq!(tracker.pump().unwrap(), 1);

        let update = tracker.last_update().unwrap();
        assert_relative_eq!(update.rotation_deg, 108.9872, epsilon = 1e-3);
        assert_eq!(update.sequence, 1);
    }

    #[test]
    fn test_rotation_sequence_overwrites() {
        // Observer at the origin, target due east but 10° south gives an
        // exact 100° bearing: atan2(sin 90°, tan -10°)
        let config = CompassConfig {
            target: GeoCoordinate::new(-10.0, 90.0),
            ..Default::default()
        };
        let mut tracker = tracker_with(
            config,
            MockPositionProvider::with_fix(GeoCoordinate::new(0.0, 0.0)),
            MockHeadingSource::new(),
        );
        tracker.start().unwrap();
        assert_relative_eq!(tracker.bearing().unwrap(), 100.0, epsilon = 1e-9);

        // Raw differences 90, -270, 120; published normalized to
        // (-180, 180] with each value overwriting the prior
        let expectations = [(10.0, 90.0), (370.0, 90.0), (-20.0, 120.0)];
        for (heading, expected_rotation) in expectations {
            tracker.heading_source_mut().push_heading(heading);
            tracker.pump().unwrap();
            let update = tracker.last_update().unwrap();
            assert_relative_eq!(update.rotation_deg, expected_rotation, epsilon = 1e-9);
        }

        let stats = tracker.stats();
        assert_eq!(stats.events_received, 3);
        assert_eq!(stats.updates_published, 3);
        assert_eq!(tracker.last_update().unwrap().sequence, 3);
    }

    #[test]
    fn test_invalid_heading_retains_last_rotation() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(london()),
            MockHeadingSource::new(),
        );
        tracker.start().unwrap();

        tracker.heading_source_mut().push_heading(10.0);
        tracker.pump().unwrap();
        let before = tracker.last_update().unwrap().clone();

        tracker.heading_source_mut().push_blank();
        tracker
            .heading_source_mut()
            .push_event(crate::sensors::HeadingEvent::new(f64::NAN));
        tracker.pump().unwrap();

        assert_eq!(tracker.last_update().unwrap(), &before);
        assert_eq!(tracker.stats().events_skipped, 2);
        assert_eq!(tracker.stats().updates_published, 1);
    }

    #[test]
    fn test_magnetic_declination_applied() {
        let config = CompassConfig {
            magnetic_declination_deg: 10.0,
            target: GeoCoordinate::new(-10.0, 90.0), // bearing 100°
            ..Default::default()
        };
        let mut tracker = tracker_with(
            config,
            MockPositionProvider::with_fix(GeoCoordinate::new(0.0, 0.0)),
            MockHeadingSource::new().with_reference(HeadingReference::MagneticNorth),
        );
        tracker.start().unwrap();

        // Magnetic 20° + declination 10° = true 30°; rotation 100 - 30
        tracker.heading_source_mut().push_heading(20.0);
        tracker.pump().unwrap();
        let update = tracker.last_update().unwrap();
        assert_relative_eq!(update.heading_deg, 30.0, epsilon = 1e-9);
        assert_relative_eq!(update.rotation_deg, 70.0, epsilon = 1e-9);
    }

    #[test]
    fn test_true_north_source_ignores_declination() {
        let config = CompassConfig {
            magnetic_declination_deg: 10.0,
            target: GeoCoordinate::new(-10.0, 90.0),
            ..Default::default()
        };
        let mut tracker = tracker_with(
            config,
            MockPositionProvider::with_fix(GeoCoordinate::new(0.0, 0.0)),
            MockHeadingSource::new(),
        );
        tracker.start().unwrap();

        tracker.heading_source_mut().push_heading(20.0);
        tracker.pump().unwrap();
        assert_relative_eq!(
            tracker.last_update().unwrap().heading_deg,
            20.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_position_failure_is_terminal() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_failure(SensorError::PermissionDenied),
            MockHeadingSource::new(),
        );

        let result = tracker.start();
        assert!(matches!(
            result,
            Err(CompassError::PositionUnavailable {
                error: SensorError::PermissionDenied
            })
        ));
        assert_eq!(tracker.state(), TrackerState::Unavailable);
        assert!(!tracker.bearing_known());
        // Heading subscription never started
        assert_eq!(tracker.heading_source_mut().start_count(), 0);

        // Events after a terminal failure are ignored
        tracker.on_heading_event(&crate::sensors::HeadingEvent::new(45.0));
        assert!(tracker.last_update().is_none());
    }

    #[test]
    fn test_retry_policy_retries_recoverable_failures() {
        let config = CompassConfig {
            retry: crate::utils::RetryPolicy::new(3, 0),
            ..Default::default()
        };
        let mut tracker = tracker_with(
            config,
            MockPositionProvider::with_failure(SensorError::Timeout { timeout_ms: 100 }),
            MockHeadingSource::new(),
        );

        assert!(tracker.start().is_err());
        assert_eq!(tracker.position_provider_mut().request_count(), 3);
        assert_eq!(tracker.stats().position_attempts, 3);
        assert_eq!(tracker.state(), TrackerState::Unavailable);
    }

    #[test]
    fn test_retry_policy_skips_unrecoverable_failures() {
        let config = CompassConfig {
            retry: crate::utils::RetryPolicy::new(3, 0),
            ..Default::default()
        };
        let mut tracker = tracker_with(
            config,
            MockPositionProvider::with_failure(SensorError::PermissionDenied),
            MockHeadingSource::new(),
        );

        assert!(tracker.start().is_err());
        assert_eq!(tracker.position_provider_mut().request_count(), 1);
    }

    #[test]
    fn test_invalid_platform_coordinate_is_terminal() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(GeoCoordinate::new(f64::NAN, 12.0)),
            MockHeadingSource::new(),
        );

        let result = tracker.start();
        assert!(matches!(result, Err(CompassError::InvalidCoordinate { .. })));
        assert_eq!(tracker.state(), TrackerState::Unavailable);
    }

    #[test]
    fn test_double_start_rejected() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(london()),
            MockHeadingSource::new(),
        );
        tracker.start().unwrap();
        assert_eq!(tracker.start(), Err(CompassError::AlreadyStarted));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(london()),
            MockHeadingSource::new(),
        );
        tracker.start().unwrap();

        tracker.shutdown();
        tracker.shutdown();
        assert_eq!(tracker.state(), TrackerState::Disposed);
        assert_eq!(tracker.heading_source_mut().stop_count(), 1);
        assert!(!tracker.heading_source_mut().is_active());

        assert_eq!(tracker.pump(), Err(CompassError::Disposed));
        assert_eq!(tracker.start(), Err(CompassError::Disposed));

        // Events after shutdown never publish
        tracker.on_heading_event(&crate::sensors::HeadingEvent::new(45.0));
        assert_eq!(tracker.stats().updates_published, 0);
    }

    #[test]
    fn test_callbacks_fire_and_remove() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(london()),
            MockHeadingSource::new(),
        );
        tracker.start().unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let handle = tracker.register_callback(Box::new(move |update| {
            seen_clone.borrow_mut().push(update.rotation_deg);
        }));

        tracker.heading_source_mut().push_heading(10.0);
        tracker.pump().unwrap();
        assert_eq!(seen.borrow().len(), 1);

        assert!(tracker.remove_callback(handle));
        assert!(!tracker.remove_callback(handle));

        tracker.heading_source_mut().push_heading(20.0);
        tracker.pump().unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_no_callback_after_shutdown() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(london()),
            MockHeadingSource::new(),
        );
        tracker.start().unwrap();

        let fired = Rc::new(RefCell::new(0u32));
        let fired_clone = Rc::clone(&fired);
        tracker.register_callback(Box::new(move |_| {
            *fired_clone.borrow_mut() += 1;
        }));

        tracker.shutdown();
        tracker.on_heading_event(&crate::sensors::HeadingEvent::new(45.0));
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn test_nonblocking_acquisition() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(london()).with_poll_delay(2),
            MockHeadingSource::new(),
        );

        tracker.begin_acquisition().unwrap();
        assert_eq!(tracker.begin_acquisition(), Err(CompassError::AlreadyStarted));

        assert!(!tracker.poll_acquisition().unwrap());
        assert!(!tracker.poll_acquisition().unwrap());
        assert!(tracker.poll_acquisition().unwrap());
        assert_eq!(tracker.state(), TrackerState::Tracking);
    }

    #[test]
    fn test_shutdown_abandons_pending_acquisition() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(london()).with_poll_delay(5),
            MockHeadingSource::new(),
        );

        tracker.begin_acquisition().unwrap();
        tracker.shutdown();

        assert_eq!(tracker.position_provider_mut().cancel_count(), 1);
        assert!(!tracker.position_provider_mut().is_pending());
        // A fix can no longer arrive through the tracker
        assert_eq!(tracker.poll_acquisition(), Err(CompassError::Disposed));
        assert!(!tracker.bearing_known());
    }

    #[test]
    fn test_last_write_wins_on_burst() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(london()),
            MockHeadingSource::new(),
        );
        tracker.start().unwrap();

        for heading in [0.0, 45.0, 90.0, 135.0, 180.0] {
            tracker.heading_source_mut().push_heading(heading);
        }
        assert_eq!(tracker.pump().unwrap(), 5);

        let update = tracker.last_update().unwrap();
        assert_relative_eq!(update.heading_deg, 180.0, epsilon = 1e-9);
        assert_eq!(update.sequence, 5);
    }

    #[test]
    fn test_observer_at_target_tracks_with_zero_bearing() {
        let mut tracker = tracker_with(
            CompassConfig::default(),
            MockPositionProvider::with_fix(KAABA),
            MockHeadingSource::new(),
        );
        tracker.start().unwrap();
        assert_eq!(tracker.bearing(), Some(0.0));

        tracker.heading_source_mut().push_heading(90.0);
        tracker.pump().unwrap();
        let update = tracker.last_update().unwrap();
        assert!(!update.rotation_deg.is_nan());
        assert_relative_eq!(update.rotation_deg, -90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CompassConfig {
            position_timeout_ms: 0,
            ..Default::default()
        };
        let result = QiblaTracker::new(
            config,
            MockPositionProvider::with_fix(london()),
            MockHeadingSource::new(),
        );
        assert!(matches!(
            result,
            Err(CompassError::ConfigurationError { .. })
        ));
    }
}
