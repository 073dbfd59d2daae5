//! Main app runner for one-shot capture

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::{ConfigStore, LocationRequest, Typeface};
use crate::application::{CaptureOrchestrator, CaptureServices, OrchestratorConfig, OverlayCompositor};
use crate::domain::capture::{CaptureMode, CaptureOutcome, CaptureSettings, GeotagResult};
use crate::domain::config::AppConfig;
use crate::domain::interval::Interval;
use crate::domain::location::LocationSnapshot;
use crate::infrastructure::{
    create_media_index, select_geocoder, ConfigPermissions, FixedLocationSource, FontdueTypeface,
    OutputDirectory, VirtualCamera, VirtualFrame, XdgConfigStore,
};

use super::args::CaptureOptions;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Run one capture through the pipeline and print the saved path
pub async fn run_capture(options: CaptureOptions, presenter: &mut Presenter) -> ExitCode {
    let storage = OutputDirectory::new(&options.output_dir);
    let permissions = ConfigPermissions::new(options.microphone, options.location);
    let media_index = create_media_index(options.media_index_command.as_deref());
    let services = CaptureServices::new(
        Arc::new(storage),
        Arc::new(permissions),
        Arc::from(media_index),
    );

    let frame = match &options.source {
        Some(path) => VirtualFrame::File(path.clone()),
        None => VirtualFrame::default(),
    };
    let camera = Arc::new(VirtualCamera::new(frame));

    let source = Arc::new(match options.position {
        Some(position) => FixedLocationSource::new(position),
        None => FixedLocationSource::unknown(),
    });
    let geocoder = Arc::new(select_geocoder(
        options.address.as_deref(),
        options.geocoder_url.as_deref(),
    ));

    let compositor = if options.overlay {
        load_compositor(&options, presenter)
    } else {
        None
    };

    let config = OrchestratorConfig {
        settings: CaptureSettings::new(options.lens, CaptureMode::Photo, options.flash),
        location: LocationRequest {
            interval: options.location_interval,
            min_distance: options.min_distance,
        },
        geotag: compositor.is_some(),
    };
    let orchestrator =
        CaptureOrchestrator::new(camera, source, geocoder, compositor, services, config);

    if let Err(e) = orchestrator.start().await {
        presenter.error(&format!("Failed to start camera: {}", e));
        orchestrator.shutdown().await;
        return ExitCode::from(EXIT_ERROR);
    }

    if orchestrator.geotag_enabled() && orchestrator.feed().is_running().await {
        if options.position.is_some() {
            let want_address = options.address.is_some() || options.geocoder_url.is_some();
            let snapshot = wait_for_location(
                orchestrator.feed().subscribe(),
                want_address,
                options.wait,
                presenter,
            )
            .await;
            if snapshot.is_some() && orchestrator.feed().is_stale(options.stale_after) {
                presenter.warn(&format!(
                    "Location fix is older than {}, the overlay may be out of date",
                    options.stale_after
                ));
            }
        } else {
            presenter.warn("No position given (--lat/--lon), the photo will not be geotagged");
        }
    }

    let code = match orchestrator.take_photo().await {
        Ok(outcome) => report_outcome(&outcome, presenter),
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    };

    orchestrator.shutdown().await;
    code
}

/// Build the overlay compositor, or run without one if no font can be loaded
fn load_compositor(
    options: &CaptureOptions,
    presenter: &Presenter,
) -> Option<Arc<OverlayCompositor>> {
    match FontdueTypeface::load(options.font_path.as_deref()) {
        Ok(typeface) => {
            let typeface: Arc<dyn Typeface> = Arc::new(typeface);
            Some(Arc::new(OverlayCompositor::new(typeface, options.jpeg_quality)))
        }
        Err(e) => {
            warn!(error = %e, "Overlay font unavailable");
            presenter.warn(&format!("{}; saving without location overlay", e));
            None
        }
    }
}

/// Wait until a snapshot (with an address, if one is expected) is published
async fn wait_for_location(
    mut snapshots: tokio::sync::watch::Receiver<Option<LocationSnapshot>>,
    want_address: bool,
    wait: Interval,
    presenter: &mut Presenter,
) -> Option<LocationSnapshot> {
    presenter.start_spinner("Waiting for location...");

    let ready = |snapshot: &Option<LocationSnapshot>| {
        snapshot
            .as_ref()
            .is_some_and(|s| !want_address || s.description().is_available())
    };
    let waited = tokio::time::timeout(wait.as_std(), snapshots.wait_for(ready))
        .await
        .map(|result| result.map(|snapshot| snapshot.clone()));

    match waited {
        Ok(Ok(snapshot)) => {
            presenter.spinner_success("Location ready");
            snapshot
        }
        Ok(Err(_)) => {
            presenter.spinner_fail("Location feed stopped");
            None
        }
        Err(_) => {
            let current = snapshots.borrow().clone();
            debug!(has_fix = current.is_some(), "Location wait timed out");
            if current.is_some() {
                presenter.spinner_fail("Address lookup timed out, using coordinates only");
            } else {
                presenter.spinner_fail("No location fix in time");
            }
            current
        }
    }
}

fn report_outcome(outcome: &CaptureOutcome, presenter: &Presenter) -> ExitCode {
    match outcome {
        CaptureOutcome::Saved { artifact, .. } => {
            match &artifact.geotag {
                Some(GeotagResult::Applied(text)) => {
                    presenter.success("Photo saved with location overlay");
                    presenter.overlay_lines(&text.lines());
                }
                Some(GeotagResult::SkippedError(reason)) => {
                    presenter.warn(&format!("Overlay failed ({}), raw photo kept", reason));
                }
                Some(GeotagResult::SkippedNoLocation) => {
                    presenter.info("Photo saved without location");
                }
                _ => presenter.success("Photo saved"),
            }
            presenter.output(&artifact.path.to_string_lossy());
            ExitCode::from(EXIT_SUCCESS)
        }
        CaptureOutcome::Failed { reason, .. } => {
            presenter.error(&format!("Capture failed: {}", reason));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Load and merge configuration from file and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    // Merge: defaults < file < cli
    AppConfig::defaults().merge(file_config).merge(cli_config)
}
