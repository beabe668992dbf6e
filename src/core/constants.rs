//! Physical constants and fixed reference points

use crate::core::types::GeoCoordinate;

/// The Kaaba in Mecca, the fixed target of every bearing computation (WGS84)
pub const KAABA: GeoCoordinate = GeoCoordinate::new(21.4225, 39.8262);

/// Mean Earth radius (kilometers, IUGG R1)
pub const EARTH_RADIUS_KM: f64 = 6371.0088;
