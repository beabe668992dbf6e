//! Orientation tracker: one compass session from position fix to
//! continuous dial rotation

pub mod compass;

pub use compass::{CallbackHandle, QiblaTracker, SessionStats, TrackerState};
