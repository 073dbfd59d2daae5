//! Recording controller use case

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use crate::domain::capture::{
    CaptureArtifact, CaptureOutcome, MediaKind, RecordingSession, RecordingState,
};

use super::ports::{CameraDevice, Capability, RecordEvent, RecordingControl};
use super::services::CaptureServices;

/// Errors from the recording controller
#[derive(Debug, Clone, Error)]
pub enum RecordingError {
    #[error("Recording is {0}; try again once it settles")]
    Busy(RecordingState),

    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Failed to finalize recording: {0}")]
    FinalizeFailed(String),
}

/// The recording currently owned by the controller
struct ActiveRecording {
    id: u64,
    path: PathBuf,
    started_at: DateTime<Local>,
    control: Arc<dyn RecordingControl>,
}

#[derive(Default)]
struct Inner {
    session: RecordingSession,
    current: Option<ActiveRecording>,
    next_id: u64,
}

/// Recording controller.
///
/// Toggle semantics: a toggle while idle starts a recording, a toggle while
/// recording stops it. Encoder events are consumed by a background task that
/// is the only writer of the ACTIVE and IDLE transitions after a start.
pub struct RecordingController<D>
where
    D: CameraDevice + 'static,
{
    device: Arc<D>,
    services: CaptureServices,
    inner: Arc<Mutex<Inner>>,
    state: Arc<watch::Sender<RecordingState>>,
}

impl<D> RecordingController<D>
where
    D: CameraDevice + 'static,
{
    pub fn new(device: Arc<D>, services: CaptureServices) -> Self {
        let (state, _) = watch::channel(RecordingState::Idle);
        Self {
            device,
            services,
            inner: Arc::new(Mutex::new(Inner::default())),
            state: Arc::new(state),
        }
    }

    /// Last published state
    pub fn state(&self) -> RecordingState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<RecordingState> {
        self.state.subscribe()
    }

    /// Start a recording when idle, stop it when active.
    /// Returns the state after the request was accepted.
    pub async fn toggle(&self) -> Result<RecordingState, RecordingError> {
        let mut inner = self.inner.lock().await;
        match inner.session.state() {
            RecordingState::Idle => self.start(&mut inner).await,
            RecordingState::Active => self.stop(&mut inner).await,
            busy => {
                debug!(state = %busy, "Recording toggle rejected");
                Err(RecordingError::Busy(busy))
            }
        }
    }

    /// Move an active recording to finalizing after a hardware failure.
    /// The file is discarded once the encoder closes it.
    pub async fn signal_hardware_error(&self, reason: &str) -> Result<(), RecordingError> {
        let mut inner = self.inner.lock().await;
        let state = inner.session.state();
        if inner
            .session
            .begin_finalize(Some(reason.to_string()))
            .is_err()
        {
            return Err(RecordingError::Busy(state));
        }
        warn!(reason, "Recording hardware error");
        self.state.send_replace(RecordingState::Finalizing);

        if let Some(control) = inner.current.as_ref().map(|r| Arc::clone(&r.control)) {
            if let Err(e) = control.stop().await {
                debug!(error = %e, "Stop after hardware error failed");
            }
        }
        Ok(())
    }

    /// Stop an in-progress recording on teardown. The encoder's finalize
    /// event is ignored once the session is closed.
    pub async fn abort(&self) {
        let inner = self.inner.lock().await;
        if let Some(recording) = inner.current.as_ref() {
            info!(path = %recording.path.display(), "Stopping recording on teardown");
            if let Err(e) = recording.control.stop().await {
                debug!(error = %e, "Stop on teardown failed");
            }
        }
    }

    async fn start(&self, inner: &mut Inner) -> Result<RecordingState, RecordingError> {
        if inner.session.begin_start().is_err() {
            return Err(RecordingError::Busy(inner.session.state()));
        }
        self.state.send_replace(RecordingState::Starting);

        match self.prepare_and_start(inner).await {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(error = %e, "Recording did not start");
                if let Some(failed) = inner.current.take() {
                    discard(&failed.path).await;
                }
                let _ = inner.session.finish(Some(e.to_string()));
                self.state.send_replace(RecordingState::Idle);
                Err(e)
            }
        }
    }

    async fn prepare_and_start(&self, inner: &mut Inner) -> Result<RecordingState, RecordingError> {
        let started_at = Local::now();
        let path = self
            .services
            .storage
            .allocate(MediaKind::Video, started_at)
            .await
            .map_err(|e| RecordingError::StartFailed(e.to_string()))?;

        let with_audio = self.services.permissions.is_granted(Capability::Microphone);
        let prepared = match self.device.prepare_recording(&path, with_audio).await {
            Ok(prepared) => prepared,
            Err(e) => {
                // The reserved name is not tracked yet; release it here.
                discard(&path).await;
                return Err(RecordingError::StartFailed(e.to_string()));
            }
        };

        inner.next_id += 1;
        let id = inner.next_id;
        let control: Arc<dyn RecordingControl> = Arc::from(prepared.control);
        inner.current = Some(ActiveRecording {
            id,
            path: path.clone(),
            started_at,
            control: Arc::clone(&control),
        });

        tokio::spawn(pump_events(
            id,
            prepared.events,
            Arc::clone(&self.inner),
            Arc::clone(&self.state),
            self.services.clone(),
        ));

        control
            .start()
            .await
            .map_err(|e| RecordingError::StartFailed(e.to_string()))?;

        info!(path = %path.display(), with_audio, "Recording starting");
        Ok(RecordingState::Starting)
    }

    async fn stop(&self, inner: &mut Inner) -> Result<RecordingState, RecordingError> {
        if inner.session.begin_finalize(None).is_err() {
            return Err(RecordingError::Busy(inner.session.state()));
        }
        self.state.send_replace(RecordingState::Finalizing);

        let Some(control) = inner.current.as_ref().map(|r| Arc::clone(&r.control)) else {
            return Ok(RecordingState::Finalizing);
        };

        if let Err(e) = control.stop().await {
            // The encoder will not report a finalize; close out here.
            warn!(error = %e, "Failed to stop recording");
            let failed = inner.current.take();
            let _ = inner.session.finish(Some(e.to_string()));
            self.state.send_replace(RecordingState::Idle);
            if let Some(failed) = failed {
                discard(&failed.path).await;
                self.services.publish(CaptureOutcome::Failed {
                    kind: MediaKind::Video,
                    reason: e.to_string(),
                });
            }
            return Err(RecordingError::FinalizeFailed(e.to_string()));
        }

        info!("Recording finalizing");
        Ok(RecordingState::Finalizing)
    }
}

/// Consume encoder events for recording `id` until it finalizes
async fn pump_events(
    id: u64,
    mut events: mpsc::UnboundedReceiver<RecordEvent>,
    inner: Arc<Mutex<Inner>>,
    state: Arc<watch::Sender<RecordingState>>,
    services: CaptureServices,
) {
    while let Some(event) = events.recv().await {
        if !services.liveness.is_alive() {
            debug!(?event, "Ignoring recording event after teardown");
            return;
        }

        match event {
            RecordEvent::Start => {
                let mut inner = inner.lock().await;
                if !owns(&inner, id) {
                    return;
                }
                if inner.session.acknowledge_start().is_ok() {
                    state.send_replace(RecordingState::Active);
                    info!("Recording active");
                }
            }
            RecordEvent::Finalize { error } => {
                finalize(id, error, &inner, &state, &services).await;
                return;
            }
        }
    }

    if services.liveness.is_alive() {
        let error = Some("encoder event stream closed".to_string());
        finalize(id, error, &inner, &state, &services).await;
    }
}

async fn finalize(
    id: u64,
    error: Option<String>,
    inner: &Mutex<Inner>,
    state: &watch::Sender<RecordingState>,
    services: &CaptureServices,
) {
    let (recording, failure) = {
        let mut inner = inner.lock().await;
        if !owns(&inner, id) {
            return;
        }
        let failure = match inner.session.finish(error) {
            Ok(failure) => failure,
            Err(e) => {
                debug!(error = %e, "Finalize without recording");
                return;
            }
        };
        state.send_replace(RecordingState::Idle);
        (inner.current.take(), failure)
    };

    let Some(recording) = recording else {
        return;
    };

    if let Some(reason) = failure {
        warn!(path = %recording.path.display(), reason = %reason, "Recording failed; discarding file");
        discard(&recording.path).await;
        services.publish(CaptureOutcome::Failed {
            kind: MediaKind::Video,
            reason,
        });
        return;
    }

    info!(path = %recording.path.display(), "Recording saved");
    services.register(&recording.path);
    services.publish(CaptureOutcome::saved(CaptureArtifact::video(
        recording.path,
        recording.started_at,
    )));
}

fn owns(inner: &Inner, id: u64) -> bool {
    inner.current.as_ref().is_some_and(|r| r.id == id)
}

async fn discard(path: &std::path::Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Discarded recording file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to discard recording file"),
    }
}
