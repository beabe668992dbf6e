//! Core data types for the qibla compass

use serde::{Deserialize, Serialize};

/// Geodetic coordinate in decimal degrees (WGS84)
///
/// Immutable once obtained from a position source. Range invariants
/// (latitude in [-90, 90], longitude in [-180, 180]) are enforced by
/// `validation::validate_coordinate`, not by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in radians
    pub fn lat_rad(&self) -> f64 {
        self.lat.to_radians()
    }

    /// Longitude in radians
    pub fn lon_rad(&self) -> f64 {
        self.lon.to_radians()
    }

    /// Componentwise comparison within `epsilon` degrees
    pub fn approx_eq(&self, other: &GeoCoordinate, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon && (self.lon - other.lon).abs() <= epsilon
    }
}

/// North reference a heading source reports against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingReference {
    /// Headings are degrees from true (geographic) north
    TrueNorth,
    /// Headings are degrees from magnetic north; declination correction
    /// is the consumer's responsibility
    MagneticNorth,
}
