//! Sensor error types and handling

use std::fmt;

/// Errors raised by position and heading sources
#[derive(Debug, Clone, PartialEq)]
pub enum SensorError {
    /// The user or platform denied access to the sensor
    PermissionDenied,
    /// The bounded wait for a position fix expired
    Timeout { timeout_ms: u32 },
    /// The sensor is present but cannot currently produce a reading
    SignalUnavailable { details: String },
    /// Platform- or hardware-level failure
    SensorFault { code: u32, description: String },
    /// Operation requires an active subscription that does not exist
    NotSubscribed,
    /// A request was issued while another was still outstanding
    RequestInProgress,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::PermissionDenied => {
                write!(f, "Sensor access denied by platform or user")
            }
            SensorError::Timeout { timeout_ms } => {
                write!(f, "Position acquisition timed out after {}ms", timeout_ms)
            }
            SensorError::SignalUnavailable { details } => {
                write!(f, "Signal unavailable: {}", details)
            }
            SensorError::SensorFault { code, description } => {
                write!(f, "Sensor fault {}: {}", code, description)
            }
            SensorError::NotSubscribed => {
                write!(f, "No active sensor subscription")
            }
            SensorError::RequestInProgress => {
                write!(f, "A position request is already outstanding")
            }
        }
    }
}

impl std::error::Error for SensorError {}

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Recovery hint for a failed sensor operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecoveryStrategy {
    /// Retry the operation immediately
    Retry,
    /// Wait and then retry
    RetryWithDelay { delay_ms: u32 },
    /// Fail permanently; user intervention required
    Fail,
}

impl SensorError {
    /// Get the recommended recovery strategy for this error
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            SensorError::PermissionDenied => RecoveryStrategy::Fail,
            SensorError::Timeout { .. } => RecoveryStrategy::Retry,
            SensorError::SignalUnavailable { .. } => {
                RecoveryStrategy::RetryWithDelay { delay_ms: 500 }
            }
            SensorError::SensorFault { .. } => RecoveryStrategy::Fail,
            SensorError::NotSubscribed => RecoveryStrategy::Fail,
            SensorError::RequestInProgress => RecoveryStrategy::RetryWithDelay { delay_ms: 100 },
        }
    }

    /// Check if this error is recoverable by retrying
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.recovery_strategy(), RecoveryStrategy::Fail)
    }
}
