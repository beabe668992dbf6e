//! Initial great-circle bearing and haversine distance on a spherical Earth

use crate::core::{GeoCoordinate, EARTH_RADIUS_KM, KAABA};
use crate::validation::{validate_coordinate, CoordinateError};

/// Two coordinates closer than this (degrees, per component) are treated
/// as coincident; the bearing between them is undefined and reported as 0.
const COINCIDENT_EPSILON_DEG: f64 = 1e-9;

/// Normalize an angle into [0, 360)
pub fn wrap_360(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Normalize an angle into (-180, 180]
pub fn wrap_180(degrees: f64) -> f64 {
    let wrapped = wrap_360(degrees);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Initial bearing from `observer` toward `target` along the great circle,
/// degrees clockwise from true north, normalized into [0, 360)
///
/// Deterministic for identical inputs. Both coordinates are validated
/// before any trigonometry; a coincident observer and target yields 0.0
/// rather than an `atan2(0, ~0)` result whose sign depends on floating
/// point residue.
pub fn initial_bearing(
    observer: &GeoCoordinate,
    target: &GeoCoordinate,
) -> Result<f64, CoordinateError> {
    validate_coordinate(observer)?;
    validate_coordinate(target)?;

    if observer.approx_eq(target, COINCIDENT_EPSILON_DEG) {
        return Ok(0.0);
    }

    let obs_lat = observer.lat_rad();
    let tgt_lat = target.lat_rad();
    let delta_lon = target.lon_rad() - observer.lon_rad();

    let y = delta_lon.sin();
    let x = obs_lat.cos() * tgt_lat.tan() - obs_lat.sin() * delta_lon.cos();

    Ok(wrap_360(y.atan2(x).to_degrees()))
}

/// Initial bearing from `observer` toward the Kaaba
pub fn bearing_to_kaaba(observer: &GeoCoordinate) -> Result<f64, CoordinateError> {
    initial_bearing(observer, &KAABA)
}

/// Great-circle distance between two coordinates (kilometers, haversine
/// on the mean Earth radius)
pub fn distance_km(a: &GeoCoordinate, b: &GeoCoordinate) -> Result<f64, CoordinateError> {
    validate_coordinate(a)?;
    validate_coordinate(b)?;

    let dlat = (b.lat_rad() - a.lat_rad()) / 2.0;
    let dlon = (b.lon_rad() - a.lon_rad()) / 2.0;

    let h = dlat.sin().powi(2) + a.lat_rad().cos() * b.lat_rad().cos() * dlon.sin().powi(2);
    Ok(2.0 * EARTH_RADIUS_KM * h.sqrt().asin())
}

/// Great-circle distance from `observer` to the Kaaba (kilometers)
pub fn distance_to_kaaba_km(observer: &GeoCoordinate) -> Result<f64, CoordinateError> {
    distance_km(observer, &KAABA)
}
