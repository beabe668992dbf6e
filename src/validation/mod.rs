//! Input validation for coordinates and heading samples

pub mod data;

pub use data::{validate_coordinate, validate_heading, CoordinateError};
