//! Overlay text lines

use chrono::{DateTime, Local};

use crate::domain::location::LocationSnapshot;

/// Title shown when no place description is available
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Subtitle shown when no place description is available
pub const ADDRESS_NOT_AVAILABLE: &str = "Address not available";

/// Render-time clock format, e.g. `Tuesday, 05 March 2024 02:07 PM`
pub const TIMESTAMP_FORMAT: &str = "%A, %d %B %Y %I:%M %p";

/// The four text lines burned into a photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayText {
    pub title: String,
    pub subtitle: String,
    pub coordinates: String,
    pub timestamp: String,
}

impl OverlayText {
    /// Compose overlay lines for `snapshot`, stamped with the render time `now`
    /// (not the fix time).
    pub fn compose(snapshot: &LocationSnapshot, now: DateTime<Local>) -> Self {
        let description = snapshot.description();

        Self {
            title: description
                .first_segment()
                .unwrap_or(UNKNOWN_LOCATION)
                .to_string(),
            subtitle: description
                .text()
                .unwrap_or(ADDRESS_NOT_AVAILABLE)
                .to_string(),
            coordinates: snapshot.coordinates().overlay_line(),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Lines in drawing order
    pub fn lines(&self) -> [&str; 4] {
        [
            &self.title,
            &self.subtitle,
            &self.coordinates,
            &self.timestamp,
        ]
    }
}
