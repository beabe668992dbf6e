//! Mock sensor implementations for testing and development

use crate::core::{GeoCoordinate, HeadingReference};
use crate::sensors::{
    HeadingEvent, HeadingSource, PositionProvider, SensorError, SensorResult,
};
use std::collections::VecDeque;

/// Mock position provider with a scriptable outcome
///
/// The non-blocking path resolves after a configurable number of polls
/// so pending-request and cancellation behavior can be exercised.
pub struct MockPositionProvider {
    outcome: SensorResult<GeoCoordinate>,
    pending: bool,
    polls_until_ready: u32,
    polls_remaining: u32,
    request_count: u32,
    cancel_count: u32,
}

impl MockPositionProvider {
    /// Provider that resolves to `fix`
    pub fn with_fix(fix: GeoCoordinate) -> Self {
        Self {
            outcome: Ok(fix),
            pending: false,
            polls_until_ready: 0,
            polls_remaining: 0,
            request_count: 0,
            cancel_count: 0,
        }
    }

    /// Provider that fails every request with `error`
    pub fn with_failure(error: SensorError) -> Self {
        Self {
            outcome: Err(error),
            pending: false,
            polls_until_ready: 0,
            polls_remaining: 0,
            request_count: 0,
            cancel_count: 0,
        }
    }

    /// Number of polls a non-blocking request stays pending before
    /// resolving
    pub fn with_poll_delay(mut self, polls: u32) -> Self {
        self.polls_until_ready = polls;
        self
    }

    /// Replace the scripted outcome for subsequent requests
    pub fn set_outcome(&mut self, outcome: SensorResult<GeoCoordinate>) {
        self.outcome = outcome;
    }

    pub fn request_count(&self) -> u32 {
        self.request_count
    }

    pub fn cancel_count(&self) -> u32 {
        self.cancel_count
    }
}

impl PositionProvider for MockPositionProvider {
    fn request_position(&mut self, timeout_ms: u32) -> SensorResult<GeoCoordinate> {
        let _ = timeout_ms;
        self.request_count += 1;
        self.outcome.clone()
    }

    fn begin_request(&mut self) -> SensorResult<()> {
        if self.pending {
            return Err(SensorError::RequestInProgress);
        }
        self.request_count += 1;
        self.pending = true;
        self.polls_remaining = self.polls_until_ready;
        Ok(())
    }

    fn poll_position(&mut self) -> Option<SensorResult<GeoCoordinate>> {
        if !self.pending {
            return None;
        }
        if self.polls_remaining > 0 {
            self.polls_remaining -= 1;
            return None;
        }
        self.pending = false;
        Some(self.outcome.clone())
    }

    fn cancel(&mut self) {
        self.cancel_count += 1;
        self.pending = false;
    }

    fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Mock heading source backed by a queue of scripted events
pub struct MockHeadingSource {
    queue: VecDeque<HeadingEvent>,
    reference: HeadingReference,
    active: bool,
    start_count: u32,
    stop_count: u32,
    simulate_errors: bool,
    error_probability: f32,
}

impl MockHeadingSource {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            reference: HeadingReference::TrueNorth,
            active: false,
            start_count: 0,
            stop_count: 0,
            simulate_errors: false,
            error_probability: 0.0,
        }
    }

    pub fn with_reference(mut self, reference: HeadingReference) -> Self {
        self.reference = reference;
        self
    }

    /// Queue a heading sample (degrees)
    pub fn push_heading(&mut self, degrees: f64) {
        self.queue.push_back(HeadingEvent::new(degrees));
    }

    /// Queue an event carrying no reading
    pub fn push_blank(&mut self) {
        self.queue.push_back(HeadingEvent::blank());
    }

    /// Queue a fully built event
    pub fn push_event(&mut self, event: HeadingEvent) {
        self.queue.push_back(event);
    }

    /// Enable random poll failures with given probability (0.0 to 1.0)
    pub fn simulate_errors(&mut self, enable: bool, probability: f32) {
        self.simulate_errors = enable;
        self.error_probability = probability.clamp(0.0, 1.0);
    }

    pub fn queued_event_count(&self) -> usize {
        self.queue.len()
    }

    pub fn start_count(&self) -> u32 {
        self.start_count
    }

    pub fn stop_count(&self) -> u32 {
        self.stop_count
    }

    fn should_simulate_error(&self) -> bool {
        if !self.simulate_errors {
            return false;
        }

        use rand::Rng;
        let mut rng = rand::thread_rng();
        rng.gen::<f32>() < self.error_probability
    }
}

impl Default for MockHeadingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingSource for MockHeadingSource {
    fn start(&mut self) -> SensorResult<()> {
        self.start_count += 1;
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        if self.active {
            self.stop_count += 1;
        }
        self.active = false;
    }

    fn poll(&mut self) -> SensorResult<Option<HeadingEvent>> {
        if !self.active {
            return Err(SensorError::NotSubscribed);
        }
        if self.should_simulate_error() {
            return Err(SensorError::SensorFault {
                code: 1001,
                description: "Simulated poll failure".to_string(),
            });
        }
        Ok(self.queue.pop_front())
    }

    fn reference(&self) -> HeadingReference {
        self.reference
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
