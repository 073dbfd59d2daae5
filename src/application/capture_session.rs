//! Capture session use case
//!
//! Owns the camera device and sequences every structural transition
//! (bind, lens switch, mode switch) through a single-flight gate. Zoom and
//! flash reads are lock-free views of the last value applied to hardware.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use chrono::Local;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::domain::capture::{
    CameraSession, CaptureArtifact, CaptureMode, CaptureSettings, FlashMode,
    InvalidSessionTransition, LensFacing, MediaKind, RecordingState, SessionPhase, DEFAULT_ZOOM_RATIO,
    ZOOM_STEP,
};

use super::gate::SingleFlight;
use super::ports::{BindRequest, CameraDevice};
use super::recording::{RecordingController, RecordingError};
use super::services::CaptureServices;

/// Errors from the capture session
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Failed to bind camera: {0}")]
    BindFailed(String),

    #[error("Another camera reconfiguration is in progress")]
    TransitionInFlight,

    #[error("A photo capture is already in progress")]
    CaptureBusy,

    #[error("Capture failed: {0}")]
    HardwareCaptureFailed(String),

    #[error("Camera not ready: {0}")]
    NotBound(#[from] InvalidSessionTransition),

    #[error("Operation requires {expected} mode, camera is in {actual} mode")]
    WrongMode {
        expected: CaptureMode,
        actual: CaptureMode,
    },

    #[error("Invalid zoom ratio: {0}")]
    InvalidZoom(f32),

    #[error("Camera control failed: {0}")]
    Control(String),

    #[error("Cannot reconfigure the camera while recording is {0}")]
    RecordingInProgress(RecordingState),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error("Capture session is closed")]
    SessionClosed,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CaptureError {
    /// Errors raised before the hardware was asked to capture anything.
    /// These are surfaced to the caller and produce no capture outcome.
    pub fn is_admission(&self) -> bool {
        !matches!(self, Self::HardwareCaptureFailed(_) | Self::Storage(_))
    }
}

/// Capture session use case
pub struct CaptureSession<D>
where
    D: CameraDevice + 'static,
{
    device: Arc<D>,
    services: CaptureServices,
    session: Mutex<CameraSession>,
    phase: watch::Sender<SessionPhase>,
    zoom_bits: AtomicU32,
    flash: AtomicU8,
    transition: SingleFlight,
    photo: SingleFlight,
    recording: RecordingController<D>,
}

impl<D> CaptureSession<D>
where
    D: CameraDevice + 'static,
{
    /// Create an unbound session. `initial` supplies the lens, mode and flash
    /// used by the first `bind`.
    pub fn new(device: Arc<D>, services: CaptureServices, initial: CaptureSettings) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Unbound);
        Self {
            recording: RecordingController::new(Arc::clone(&device), services.clone()),
            device,
            services,
            session: Mutex::new(CameraSession::new(initial)),
            phase,
            zoom_bits: AtomicU32::new(initial.zoom_ratio().to_bits()),
            flash: AtomicU8::new(initial.flash().to_u8()),
            transition: SingleFlight::new(),
            photo: SingleFlight::new(),
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        self.session.lock().await.phase()
    }

    /// Watch phase changes
    pub fn subscribe_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    /// Copy of the recorded settings (realized only while bound)
    pub async fn settings(&self) -> CaptureSettings {
        *self.session.lock().await.settings()
    }

    /// Last zoom ratio applied to hardware
    pub fn zoom_ratio(&self) -> f32 {
        f32::from_bits(self.zoom_bits.load(Ordering::Acquire))
    }

    /// Last flash mode applied to hardware
    pub fn flash_mode(&self) -> FlashMode {
        FlashMode::from_u8(self.flash.load(Ordering::Acquire))
    }

    pub fn recording(&self) -> &RecordingController<D> {
        &self.recording
    }

    pub fn recording_state(&self) -> RecordingState {
        self.recording.state()
    }

    /// Bind (or rebind) the pipeline for `lens` and `mode`
    pub async fn bind(&self, lens: LensFacing, mode: CaptureMode) -> Result<(), CaptureError> {
        self.rebind(lens, mode).await
    }

    /// Rebind with the opposite lens
    pub async fn switch_lens(&self) -> Result<LensFacing, CaptureError> {
        let current = *self.session.lock().await.require_bound("switch lens")?;
        let lens = current.lens().opposite();
        self.rebind(lens, current.mode()).await?;
        Ok(lens)
    }

    /// Rebind with a different output pipeline. A no-op if `mode` is
    /// already active.
    pub async fn switch_mode(&self, mode: CaptureMode) -> Result<(), CaptureError> {
        let lens = {
            let session = self.session.lock().await;
            let settings = session.settings();
            if session.is_bound() && settings.mode() == mode {
                debug!(%mode, "Mode already active");
                return Ok(());
            }
            settings.lens()
        };
        self.rebind(lens, mode).await
    }

    /// Clamp `ratio` into the device range and apply it. Returns the
    /// effective ratio.
    pub async fn set_zoom(&self, ratio: f32) -> Result<f32, CaptureError> {
        if ratio.is_nan() {
            return Err(CaptureError::InvalidZoom(ratio));
        }
        let mut session = self.session.lock().await;
        let clamped = session.require_bound("set zoom")?.zoom_range().clamp(ratio);

        self.device
            .set_zoom_ratio(clamped)
            .await
            .map_err(|e| CaptureError::Control(e.to_string()))?;

        let applied = session.commit_zoom(clamped)?;
        self.zoom_bits.store(applied.to_bits(), Ordering::Release);
        debug!(requested = ratio, applied, "Zoom applied");
        Ok(applied)
    }

    /// Multiply the applied zoom by one step
    pub async fn zoom_in(&self) -> Result<f32, CaptureError> {
        self.set_zoom(self.zoom_ratio() * ZOOM_STEP).await
    }

    /// Divide the applied zoom by one step
    pub async fn zoom_out(&self) -> Result<f32, CaptureError> {
        self.set_zoom(self.zoom_ratio() / ZOOM_STEP).await
    }

    /// Apply a pinch-gesture scale factor relative to the applied zoom
    pub async fn scale_zoom(&self, factor: f32) -> Result<f32, CaptureError> {
        self.set_zoom(self.zoom_ratio() * factor).await
    }

    pub async fn set_flash(&self, mode: FlashMode) -> Result<(), CaptureError> {
        let mut session = self.session.lock().await;
        session.require_bound("set flash")?;

        self.device
            .set_flash_mode(mode)
            .await
            .map_err(|e| CaptureError::Control(e.to_string()))?;

        session.commit_flash(mode)?;
        self.flash.store(mode.to_u8(), Ordering::Release);
        info!(flash = %mode, "Flash mode applied");
        Ok(())
    }

    /// Step flash Off -> On -> Auto -> Off
    pub async fn cycle_flash(&self) -> Result<FlashMode, CaptureError> {
        let next = self.flash_mode().next();
        self.set_flash(next).await?;
        Ok(next)
    }

    /// Capture a raw still image into a fresh output file.
    ///
    /// Single-flight: a request while another capture is outstanding fails
    /// with `CaptureBusy` and does not affect the outstanding one.
    pub async fn capture_photo(&self) -> Result<CaptureArtifact, CaptureError> {
        let Some(_flight) = self.photo.try_acquire() else {
            debug!("Photo capture rejected: busy");
            return Err(CaptureError::CaptureBusy);
        };
        self.ensure_alive()?;
        if self.transition.is_busy() {
            debug!("Photo capture rejected: rebind in flight");
            return Err(CaptureError::TransitionInFlight);
        }
        self.require_mode(CaptureMode::Photo, "capture photo").await?;

        let captured_at = Local::now();
        let path = self
            .services
            .storage
            .allocate(MediaKind::Photo, captured_at)
            .await
            .map_err(|e| CaptureError::Storage(e.to_string()))?;

        debug!(path = %path.display(), "Taking picture");
        if let Err(e) = self.device.take_picture(&path).await {
            warn!(path = %path.display(), error = %e, "Photo capture failed");
            if let Err(remove) = tokio::fs::remove_file(&path).await {
                if remove.kind() != std::io::ErrorKind::NotFound {
                    debug!(error = %remove, "Failed to remove partial capture");
                }
            }
            return Err(CaptureError::HardwareCaptureFailed(e.to_string()));
        }

        self.ensure_alive()?;
        info!(path = %path.display(), "Photo captured");
        Ok(CaptureArtifact::raw_photo(path, captured_at))
    }

    /// Whether a photo capture is outstanding
    pub fn is_capturing(&self) -> bool {
        self.photo.is_busy()
    }

    /// Start or stop a recording (video mode only)
    pub async fn toggle_recording(&self) -> Result<RecordingState, CaptureError> {
        self.ensure_alive()?;
        self.require_mode(CaptureMode::Video, "toggle recording")
            .await?;
        Ok(self.recording.toggle().await?)
    }

    /// Tear down: stop recording, release the pipeline. Pending completions
    /// observe the cleared liveness flag and stand down.
    pub async fn shutdown(&self) {
        self.services.liveness.shut_down();
        self.recording.abort().await;
        self.device.unbind().await;
        self.session.lock().await.release();
        self.phase.send_replace(SessionPhase::Unbound);
        info!("Capture session closed");
    }

    async fn rebind(&self, lens: LensFacing, mode: CaptureMode) -> Result<(), CaptureError> {
        let Some(_flight) = self.transition.try_acquire() else {
            debug!(%lens, %mode, "Rebind rejected: transition in flight");
            return Err(CaptureError::TransitionInFlight);
        };
        self.ensure_alive()?;
        let recording = self.recording.state();
        if recording != RecordingState::Idle {
            return Err(CaptureError::RecordingInProgress(recording));
        }
        let flash = {
            let mut session = self.session.lock().await;
            // A capture admitted before this gate closed still owns the pipeline.
            if self.photo.is_busy() {
                return Err(CaptureError::CaptureBusy);
            }
            session.begin_bind(lens, mode)?;
            session.settings().flash()
        };
        self.phase.send_replace(SessionPhase::Binding);
        info!(%lens, %mode, "Binding camera");

        self.device.unbind().await;
        let bound = self.device.bind(BindRequest { lens, mode, flash }).await;

        let mut session = self.session.lock().await;
        match bound {
            Ok(capabilities) => {
                let range = capabilities.zoom_range;
                let initial = range.clamp(DEFAULT_ZOOM_RATIO);
                if let Err(e) = self.device.set_zoom_ratio(initial).await {
                    warn!(error = %e, "Failed to reset zoom after bind");
                }

                let generation = session.complete_bind(range)?;
                self.zoom_bits
                    .store(session.settings().zoom_ratio().to_bits(), Ordering::Release);
                self.flash.store(flash.to_u8(), Ordering::Release);
                self.phase.send_replace(SessionPhase::Bound);
                info!(
                    %lens,
                    %mode,
                    generation,
                    min_zoom = range.min(),
                    max_zoom = range.max(),
                    "Camera bound"
                );
                Ok(())
            }
            Err(e) => {
                session.fail_bind(e.to_string())?;
                self.phase.send_replace(SessionPhase::Error);
                warn!(%lens, %mode, error = %e, "Camera bind failed");
                Err(CaptureError::BindFailed(e.to_string()))
            }
        }
    }

    async fn require_mode(&self, expected: CaptureMode, action: &str) -> Result<(), CaptureError> {
        let session = self.session.lock().await;
        let actual = session.require_bound(action)?.mode();
        if actual != expected {
            return Err(CaptureError::WrongMode { expected, actual });
        }
        Ok(())
    }

    fn ensure_alive(&self) -> Result<(), CaptureError> {
        if self.services.liveness.is_alive() {
            Ok(())
        } else {
            Err(CaptureError::SessionClosed)
        }
    }
}
