//! Great-circle bearing and distance calculations
//!
//! Pure spherical trigonometry; no sensor or state dependencies.

pub mod great_circle;

pub use great_circle::{
    bearing_to_kaaba, distance_km, distance_to_kaaba_km, initial_bearing, wrap_180, wrap_360,
};
