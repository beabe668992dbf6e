//! Output formatting for the display surface

use crate::api::types::{CompassError, RotationUpdate};

/// Formatter for rotation updates and session failures
pub trait RotationFormatter {
    /// Render a rotation update for display
    fn format_update(&self, update: &RotationUpdate) -> String;

    /// Render the user-facing message for a failed session
    fn format_unavailable(&self, error: &CompassError) -> String;
}

/// Human-readable single-line formatter
pub struct TextFormatter {
    /// Decimal places for angle output
    pub precision: usize,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self { precision: 1 }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationFormatter for TextFormatter {
    fn format_update(&self, update: &RotationUpdate) -> String {
        format!(
            "qibla {:.p$}° | heading {:.p$}° | rotate dial {:+.p$}° | {:.0} km",
            update.bearing_deg,
            update.heading_deg,
            update.rotation_deg,
            update.distance_km,
            p = self.precision,
        )
    }

    fn format_unavailable(&self, error: &CompassError) -> String {
        format!("unable to determine direction ({})", error)
    }
}

/// JSON formatter for machine consumers
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationFormatter for JsonFormatter {
    fn format_update(&self, update: &RotationUpdate) -> String {
        let result = if self.pretty {
            serde_json::to_string_pretty(update)
        } else {
            serde_json::to_string(update)
        };
        // RotationUpdate contains only finite floats and integers
        result.unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
    }

    fn format_unavailable(&self, error: &CompassError) -> String {
        let body = serde_json::json!({
            "status": "unavailable",
            "message": error.to_string(),
        });
        body.to_string()
    }
}
