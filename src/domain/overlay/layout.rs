//! Fixed overlay layout
//!
//! Geometry is expressed for a 160 px reference band and scaled to the
//! actual band height, so the overlay keeps its proportions on large sensors.

use super::text::OverlayText;

/// Minimum (and reference) band height in pixels
pub const MIN_BAND_HEIGHT: u32 = 160;

/// Band height as a fraction of the image height when that exceeds the minimum
pub const BAND_HEIGHT_RATIO: f32 = 0.12;

const PADDING: f32 = 20.0;
const FIRST_BASELINE_OFFSET: f32 = 25.0;
const LINE_HEIGHT: f32 = 32.0;
const TITLE_SIZE: f32 = 32.0;
const BODY_SIZE: f32 = 28.0;

/// One positioned text line
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLine {
    pub text: String,
    /// Left edge in pixels
    pub x: f32,
    /// Baseline in pixels from the image top
    pub baseline: f32,
    /// Font size in pixels
    pub size: f32,
}

/// Drawing instructions for one image
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    pub band_top: u32,
    pub band_height: u32,
    pub lines: [OverlayLine; 4],
}

impl OverlayLayout {
    /// Compute the band and line positions for an image `height` pixels tall
    pub fn compute(height: u32, text: &OverlayText) -> Self {
        let band_height = band_height_for(height);
        let band_top = height - band_height;
        let scale = band_height as f32 / MIN_BAND_HEIGHT as f32;

        let x = PADDING * scale;
        let first = band_top as f32 + (PADDING + FIRST_BASELINE_OFFSET) * scale;
        let [title, subtitle, coordinates, timestamp] = text.lines();

        let line = |index: usize, text: &str, size: f32| OverlayLine {
            text: text.to_string(),
            x,
            baseline: first + index as f32 * LINE_HEIGHT * scale,
            size: size * scale,
        };

        Self {
            band_top,
            band_height,
            lines: [
                line(0, title, TITLE_SIZE),
                line(1, subtitle, BODY_SIZE),
                line(2, coordinates, BODY_SIZE),
                line(3, timestamp, BODY_SIZE),
            ],
        }
    }
}

/// `max(160, 12% of height)`, never taller than the image
pub fn band_height_for(height: u32) -> u32 {
    let proportional = (height as f32 * BAND_HEIGHT_RATIO).round() as u32;
    proportional.max(MIN_BAND_HEIGHT).min(height)
}
