//! Camera device port interfaces

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::capture::{CaptureMode, FlashMode, LensFacing, ZoomRange};

/// Camera hardware errors
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("Camera is in use by another client")]
    Busy,

    #[error("Unsupported camera configuration: {0}")]
    Unsupported(String),

    #[error("Camera not bound")]
    NotBound,

    #[error("Camera operation failed: {0}")]
    Failed(String),
}

/// Pipeline configuration requested from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindRequest {
    pub lens: LensFacing,
    pub mode: CaptureMode,
    pub flash: FlashMode,
}

/// What the device reports after a successful bind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceCapabilities {
    pub zoom_range: ZoomRange,
}

/// Asynchronous events of one recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEvent {
    /// The encoder started writing
    Start,
    /// The encoder closed the file; `error` is set if the file is unusable.
    /// Always the last event of a recording.
    Finalize { error: Option<String> },
}

/// Control surface of an in-progress recording
#[async_trait]
pub trait RecordingControl: Send + Sync {
    /// Begin writing. Progress is reported through the event stream.
    async fn start(&self) -> Result<(), DeviceError>;

    /// Request the encoder to stop; completion arrives as `Finalize`.
    async fn stop(&self) -> Result<(), DeviceError>;
}

/// A recording prepared against the bound video pipeline
pub struct PreparedRecording {
    pub control: Box<dyn RecordingControl>,
    pub events: mpsc::UnboundedReceiver<RecordEvent>,
}

/// Port for the platform camera.
///
/// At most one pipeline is bound at a time; `bind` is only called after
/// `unbind` for the previous pipeline returned.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Attach the hardware pipeline for the requested configuration.
    async fn bind(&self, request: BindRequest) -> Result<DeviceCapabilities, DeviceError>;

    /// Release the current pipeline. A no-op if nothing is bound.
    async fn unbind(&self);

    /// Apply a zoom ratio already clamped into the reported range.
    async fn set_zoom_ratio(&self, ratio: f32) -> Result<(), DeviceError>;

    async fn set_flash_mode(&self, mode: FlashMode) -> Result<(), DeviceError>;

    /// Capture a still image to `path`. Completes once the file is flushed.
    async fn take_picture(&self, path: &Path) -> Result<(), DeviceError>;

    /// Prepare a recording to `path`, with an audio track if `with_audio`.
    async fn prepare_recording(
        &self,
        path: &Path,
        with_audio: bool,
    ) -> Result<PreparedRecording, DeviceError>;
}
