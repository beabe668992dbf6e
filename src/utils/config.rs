use crate::core::{GeoCoordinate, KAABA};
use crate::validation::validate_coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Retry policy for position acquisition
///
/// The default performs a single attempt and gives up for the session,
/// matching the conventional behavior of a one-shot geolocation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1)
    pub max_attempts: u32,
    /// Fixed delay between attempts (milliseconds)
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            retry_delay_ms: 0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, retry_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            retry_delay_ms,
        }
    }
}

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompassConfig {
    /// Bounded wait for one position acquisition attempt (milliseconds)
    pub position_timeout_ms: u32,
    /// Retry behavior when acquisition fails with a recoverable error
    pub retry: RetryPolicy,
    /// Magnetic declination at the observer (degrees, east positive);
    /// applied only to magnetic-north heading sources, so that
    /// true = magnetic + declination
    pub magnetic_declination_deg: f64,
    /// Bearing target; defaults to the Kaaba
    pub target: GeoCoordinate,
}

impl Default for CompassConfig {
    fn default() -> Self {
        Self {
            position_timeout_ms: 10_000,
            retry: RetryPolicy::default(),
            magnetic_declination_deg: 0.0,
            target: KAABA,
        }
    }
}

/// Configuration validation and file errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    IoError { message: String },
    /// JSON serialization/deserialization error
    SerializationError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid {} = {}: {}", parameter, value, reason)
            }
            ConfigError::IoError { message } => write!(f, "Config file I/O error: {}", message),
            ConfigError::SerializationError { message } => {
                write!(f, "Config serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl CompassConfig {
    /// Validate all parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.position_timeout_ms == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "position_timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "bounded wait must be positive".to_string(),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "retry.max_attempts".to_string(),
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }
        if !self.magnetic_declination_deg.is_finite()
            || self.magnetic_declination_deg.abs() > 180.0
        {
            return Err(ConfigError::InvalidParameter {
                parameter: "magnetic_declination_deg".to_string(),
                value: self.magnetic_declination_deg.to_string(),
                reason: "must be finite and within [-180, 180]".to_string(),
            });
        }
        if let Err(e) = validate_coordinate(&self.target) {
            return Err(ConfigError::InvalidParameter {
                parameter: "target".to_string(),
                value: format!("({}, {})", self.target.lat, self.target.lon),
                reason: e.to_string(),
            });
        }
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: e.to_string(),
        })?;
        let config: CompassConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::SerializationError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
                message: e.to_string(),
            })?;
        fs::write(path, contents).map_err(|e| ConfigError::IoError {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CompassConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target, KAABA);
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = CompassConfig {
            position_timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = CompassConfig {
            retry: RetryPolicy::new(0, 100),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_declination_rejected() {
        let config = CompassConfig {
            magnetic_declination_deg: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CompassConfig {
            magnetic_declination_deg: 200.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_target_rejected() {
        let config = CompassConfig {
            target: GeoCoordinate::new(95.0, 0.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = CompassConfig {
            position_timeout_ms: 5000,
            retry: RetryPolicy::new(3, 250),
            magnetic_declination_deg: 4.5,
            target: KAABA,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: CompassConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join("qibla_compass_config_test.json");
        let config = CompassConfig {
            position_timeout_ms: 2000,
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();
        let loaded = CompassConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let result = CompassConfig::load_from_file("/nonexistent/qibla.json");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
