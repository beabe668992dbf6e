use crate::core::GeoCoordinate;
use std::fmt;

/// Errors raised when a coordinate fails range or finiteness checks
///
/// The trigonometry is total over the reals, so these checks exist to
/// guard against upstream sensor garbage, not to protect the math.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateError {
    /// Component is NaN or infinite
    NonFinite { field: &'static str, value: f64 },
    /// Component falls outside its legal geodetic range
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateError::NonFinite { field, value } => {
                write!(f, "Non-finite {}: {}", field, value)
            }
            CoordinateError::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "{} out of range: {} not in [{}, {}]",
                    field, value, min, max
                )
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

fn check_component(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), CoordinateError> {
    if !value.is_finite() {
        return Err(CoordinateError::NonFinite { field, value });
    }
    if value < min || value > max {
        return Err(CoordinateError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Validate a geodetic coordinate: finite, latitude in [-90, 90],
/// longitude in [-180, 180]
pub fn validate_coordinate(coord: &GeoCoordinate) -> Result<(), CoordinateError> {
    check_component("latitude", coord.lat, -90.0, 90.0)?;
    check_component("longitude", coord.lon, -180.0, 180.0)?;
    Ok(())
}

/// Whether a heading sample is usable
///
/// Any finite degree value is legal (wrapping happens downstream); a
/// non-finite sample is not a fault, just "no update".
pub fn validate_heading(degrees: f64) -> bool {
    degrees.is_finite()
}
