//! Capture orchestrator use case
//!
//! Sequences one capture end to end: hardware capture, geotag overlay for
//! photos, media registration, then a single terminal outcome.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::capture::{
    CaptureArtifact, CaptureMode, CaptureOutcome, CaptureSettings, GeotagResult, MediaKind,
    RecordingState,
};
use crate::domain::location::LocationSnapshot;
use crate::domain::overlay::OverlayText;

use super::capture_session::{CaptureError, CaptureSession};
use super::compositor::{CompositeError, DecodedImage, OverlayCompositor};
use super::location_feed::LocationFeed;
use super::ports::{
    CameraDevice, Capability, Geocoder, LocationError, LocationRequest, LocationSource,
};
use super::services::CaptureServices;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Lens, mode and flash to bind with on `start`
    pub settings: CaptureSettings,
    pub location: LocationRequest,
    /// Burn the location overlay into photos
    pub geotag: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            settings: CaptureSettings::default(),
            location: LocationRequest::default(),
            geotag: true,
        }
    }
}

/// What a shutter press did, depending on the bound mode
#[derive(Debug, Clone, PartialEq)]
pub enum ShutterResult {
    Photo(CaptureOutcome),
    Recording(RecordingState),
}

/// Top-level capture coordinator
pub struct CaptureOrchestrator<D, S, G>
where
    D: CameraDevice + 'static,
    S: LocationSource + 'static,
    G: Geocoder + 'static,
{
    session: Arc<CaptureSession<D>>,
    feed: LocationFeed<S, G>,
    compositor: Option<Arc<OverlayCompositor>>,
    services: CaptureServices,
    geotag_enabled: AtomicBool,
}

impl<D, S, G> CaptureOrchestrator<D, S, G>
where
    D: CameraDevice + 'static,
    S: LocationSource + 'static,
    G: Geocoder + 'static,
{
    /// Create an orchestrator. Without a compositor photos are never geotagged.
    pub fn new(
        device: Arc<D>,
        source: Arc<S>,
        geocoder: Arc<G>,
        compositor: Option<Arc<OverlayCompositor>>,
        services: CaptureServices,
        config: OrchestratorConfig,
    ) -> Self {
        let session = CaptureSession::new(device, services.clone(), config.settings);
        Self {
            session: Arc::new(session),
            feed: LocationFeed::new(source, geocoder, config.location),
            compositor,
            services,
            geotag_enabled: AtomicBool::new(config.geotag),
        }
    }

    /// Prepare storage, start the location feed and bind the camera.
    ///
    /// A location failure only costs the geotag; a bind failure is returned
    /// and the session stays retryable.
    pub async fn start(&self) -> Result<(), CaptureError> {
        self.services
            .storage
            .prepare()
            .await
            .map_err(|e| CaptureError::Storage(e.to_string()))?;

        if self.geotag_enabled() {
            if let Err(e) = self.start_feed().await {
                warn!(error = %e, "Location unavailable, photos will not be geotagged");
            }
        }

        let settings = self.session.settings().await;
        self.session.bind(settings.lens(), settings.mode()).await
    }

    pub fn session(&self) -> &Arc<CaptureSession<D>> {
        &self.session
    }

    pub fn feed(&self) -> &LocationFeed<S, G> {
        &self.feed
    }

    pub fn geotag_enabled(&self) -> bool {
        self.geotag_enabled.load(Ordering::Acquire)
    }

    /// Turn geotagging on or off, starting or stopping the location feed
    pub async fn set_geotag_enabled(&self, enabled: bool) -> Result<(), LocationError> {
        self.geotag_enabled.store(enabled, Ordering::Release);
        info!(enabled, "Geotagging toggled");
        if enabled {
            self.start_feed().await
        } else {
            self.feed.stop().await;
            Ok(())
        }
    }

    /// Receive every terminal capture outcome, photos and videos alike
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<CaptureOutcome> {
        self.services.subscribe()
    }

    /// Capture one photo and geotag it with the snapshot current at the
    /// shutter.
    ///
    /// Admission errors (busy, not bound, wrong mode, closed) are returned
    /// as `Err` and produce no outcome. Anything past admission ends in
    /// exactly one broadcast outcome, which is also returned.
    pub async fn take_photo(&self) -> Result<CaptureOutcome, CaptureError> {
        let geotag = self.geotag_enabled() && self.compositor.is_some();
        let snapshot = if geotag {
            self.feed.current_snapshot()
        } else {
            None
        };

        let raw = match self.session.capture_photo().await {
            Ok(artifact) => artifact,
            Err(e) if e.is_admission() => return Err(e),
            Err(e) => {
                let outcome = CaptureOutcome::Failed {
                    kind: MediaKind::Photo,
                    reason: e.to_string(),
                };
                self.services.publish(outcome.clone());
                return Ok(outcome);
            }
        };

        let result = match (&self.compositor, snapshot) {
            (Some(compositor), Some(snapshot)) if geotag => {
                match composite_in_place(Arc::clone(compositor), raw.path.clone(), snapshot).await
                {
                    Ok(text) => {
                        debug!(path = %raw.path.display(), title = %text.title, "Geotag applied");
                        GeotagResult::Applied(text)
                    }
                    Err(e) => {
                        warn!(
                            path = %raw.path.display(),
                            error = %e,
                            "Geotag overlay failed, keeping raw capture"
                        );
                        GeotagResult::SkippedError(e.to_string())
                    }
                }
            }
            _ if geotag => GeotagResult::SkippedNoLocation,
            _ => GeotagResult::Disabled,
        };

        if !self.services.liveness.is_alive() {
            debug!(path = %raw.path.display(), "Session closed before photo was finalized");
            return Err(CaptureError::SessionClosed);
        }

        let artifact = raw.with_geotag(result);
        self.services.register(&artifact.path);
        let outcome = CaptureOutcome::saved(artifact);
        info!(%outcome, "Photo finished");
        self.services.publish(outcome.clone());
        Ok(outcome)
    }

    /// Start or stop a video recording
    pub async fn toggle_recording(&self) -> Result<RecordingState, CaptureError> {
        self.session.toggle_recording().await
    }

    /// Shutter press: a photo in photo mode, a recording toggle in video mode
    pub async fn shutter(&self) -> Result<ShutterResult, CaptureError> {
        match self.session.settings().await.mode() {
            CaptureMode::Photo => self.take_photo().await.map(ShutterResult::Photo),
            CaptureMode::Video => self.toggle_recording().await.map(ShutterResult::Recording),
        }
    }

    /// Tear everything down. Pending completions stand down.
    pub async fn shutdown(&self) {
        self.feed.stop().await;
        self.session.shutdown().await;
    }

    async fn start_feed(&self) -> Result<(), LocationError> {
        if !self.services.permissions.is_granted(Capability::FineLocation) {
            return Err(LocationError::PermissionDenied);
        }
        self.feed.start().await
    }
}

/// Burn the overlay into the file at `path`, replacing it atomically.
/// On failure the raw file is left untouched.
async fn composite_in_place(
    compositor: Arc<OverlayCompositor>,
    path: PathBuf,
    snapshot: LocationSnapshot,
) -> Result<OverlayText, CompositeError> {
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path).map_err(|e| CompositeError::Io(e.to_string()))?;
        let image = DecodedImage::decode(&bytes)?;
        let text = OverlayText::compose(&snapshot, Local::now());
        let encoded = compositor.render(image, &text)?;

        let staging = staging_path(&path);
        let written = std::fs::write(&staging, &encoded.bytes)
            .and_then(|()| std::fs::rename(&staging, &path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&staging);
            return Err(CompositeError::Io(e.to_string()));
        }
        Ok(text)
    })
    .await
    .map_err(|e| CompositeError::Io(format!("compositing task failed: {}", e)))?
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.part", name))
}
