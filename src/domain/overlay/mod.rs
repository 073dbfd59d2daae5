//! Geotag overlay content and geometry

mod layout;
mod text;

pub use layout::{band_height_for, OverlayLayout, OverlayLine, BAND_HEIGHT_RATIO, MIN_BAND_HEIGHT};
pub use text::{OverlayText, ADDRESS_NOT_AVAILABLE, TIMESTAMP_FORMAT, UNKNOWN_LOCATION};
