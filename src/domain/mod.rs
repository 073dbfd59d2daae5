//! Domain layer - Core business logic
//!
//! Contains value objects, state machines, and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod config;
pub mod error;
pub mod interval;
pub mod location;
pub mod overlay;

// Re-export common types
pub use capture::{
    CaptureArtifact, CaptureMode, CaptureOutcome, CaptureSettings, FlashMode, GeotagResult,
    LensFacing, MediaKind, RecordingState, SessionPhase, ZoomRange,
};
pub use config::AppConfig;
pub use error::*;
pub use interval::Interval;
pub use location::{Coordinates, LocationFix, LocationSnapshot, PlaceDescription};
pub use overlay::{OverlayLayout, OverlayText};
