//! Capture domain: settings, session and recording state machines, artifacts

mod artifact;
mod recording;
mod session;
mod settings;

pub use artifact::{CaptureArtifact, CaptureOutcome, GeotagResult, MediaKind};
pub use recording::{InvalidRecordingTransition, RecordingSession, RecordingState};
pub use session::{CameraSession, InvalidSessionTransition, SessionPhase};
pub use settings::{
    CaptureMode, CaptureSettings, FlashMode, LensFacing, ZoomRange, DEFAULT_ZOOM_RATIO, ZOOM_STEP,
};
