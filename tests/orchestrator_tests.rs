//! End-to-end capture pipeline tests
//!
//! Wires the orchestrator to the software camera, a fixed location source
//! and a block-glyph typeface, writing into a temporary directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};
use tempfile::TempDir;

use geocam::application::ports::{CameraDevice, Geocoder, GlyphBitmap, LocationSource, Typeface};
use geocam::application::{
    CaptureError, CaptureOrchestrator, CaptureServices, OrchestratorConfig, OverlayCompositor,
    RecordingController, RecordingError,
};
use geocam::domain::capture::{CaptureOutcome, GeotagResult, MediaKind, RecordingState};
use geocam::domain::location::Coordinates;
use geocam::infrastructure::{
    ConfigPermissions, FixedAddressGeocoder, FixedLocationSource, LogMediaIndex, NoOpGeocoder,
    OutputDirectory, VirtualCamera, VirtualFrame,
};

/// Typeface drawing every glyph as a solid block
struct BlockTypeface;

impl Typeface for BlockTypeface {
    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap {
        let advance = (px * 0.6).max(1.0);
        if ch == ' ' {
            return GlyphBitmap {
                advance_width: advance,
                ..Default::default()
            };
        }
        let width = (advance as usize).saturating_sub(1).max(1);
        let height = (px * 0.7).max(1.0) as usize;
        GlyphBitmap {
            width,
            height,
            xmin: 0,
            ymin: 0,
            advance_width: advance,
            coverage: vec![255; width * height],
        }
    }
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([90, 140, 200]));
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 90)
        .encode(image.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

fn opera_house() -> Coordinates {
    Coordinates::new(-33.8568, 151.2153).unwrap()
}

fn services(output: &Path, location_granted: bool) -> CaptureServices {
    CaptureServices::new(
        Arc::new(OutputDirectory::new(output)),
        Arc::new(ConfigPermissions::new(true, location_granted)),
        Arc::new(LogMediaIndex::new()),
    )
}

fn compositor() -> Option<Arc<OverlayCompositor>> {
    Some(Arc::new(OverlayCompositor::new(Arc::new(BlockTypeface), 90)))
}

fn orchestrator<G: Geocoder + 'static>(
    output: &Path,
    frame: VirtualFrame,
    source: FixedLocationSource,
    geocoder: G,
    location_granted: bool,
) -> CaptureOrchestrator<VirtualCamera, FixedLocationSource, G> {
    CaptureOrchestrator::new(
        Arc::new(VirtualCamera::new(frame)),
        Arc::new(source),
        Arc::new(geocoder),
        compositor(),
        services(output, location_granted),
        OrchestratorConfig::default(),
    )
}

/// Wait until the feed holds a snapshot whose address has resolved
async fn wait_for_address<D, S, G>(orchestrator: &CaptureOrchestrator<D, S, G>)
where
    D: CameraDevice + 'static,
    S: LocationSource + 'static,
    G: Geocoder + 'static,
{
    let mut snapshots = orchestrator.feed().subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|s| s.as_ref().is_some_and(|s| s.description().is_available())),
    )
    .await
    .expect("address did not resolve in time")
    .expect("feed stopped");
}

fn saved_path(outcome: &CaptureOutcome) -> PathBuf {
    match outcome {
        CaptureOutcome::Saved { artifact, .. } => artifact.path.clone(),
        other => panic!("expected a saved photo, got {:?}", other),
    }
}

fn write_source(dir: &Path, bytes: &[u8]) -> PathBuf {
    let path = dir.join("frame.jpg");
    std::fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn photo_is_saved_with_overlay_and_broadcast() {
    let out = TempDir::new().unwrap();
    let orchestrator = orchestrator(
        out.path(),
        VirtualFrame::TestPattern {
            width: 400,
            height: 300,
        },
        FixedLocationSource::new(opera_house()),
        FixedAddressGeocoder::new("Sydney Opera House, Sydney, NSW, Australia"),
        true,
    );
    let mut outcomes = orchestrator.subscribe_outcomes();

    orchestrator.start().await.unwrap();
    wait_for_address(&orchestrator).await;

    let outcome = orchestrator.take_photo().await.unwrap();
    let CaptureOutcome::Saved {
        artifact,
        with_geotag,
    } = &outcome
    else {
        panic!("expected saved outcome, got {:?}", outcome);
    };
    assert!(*with_geotag);
    assert_eq!(artifact.kind, MediaKind::Photo);
    match &artifact.geotag {
        Some(GeotagResult::Applied(text)) => {
            assert_eq!(text.title, "Sydney Opera House");
            assert_eq!(text.subtitle, "Sydney Opera House, Sydney, NSW, Australia");
            assert_eq!(text.coordinates, "Lat 33.8568° S    Long 151.2153° E");
        }
        other => panic!("expected applied geotag, got {:?}", other),
    }

    let name = artifact.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("IMG_") && name.ends_with(".jpg"), "{}", name);
    assert_eq!(artifact.path.parent(), Some(out.path()));

    let saved = image::open(&artifact.path).unwrap();
    assert_eq!((saved.width(), saved.height()), (400, 300));

    assert_eq!(outcomes.recv().await.unwrap(), outcome);

    // No staging files are left behind
    let entries: Vec<_> = std::fs::read_dir(out.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    orchestrator.shutdown().await;
}

#[tokio::test]
async fn without_a_fix_the_raw_capture_is_kept_byte_for_byte() {
    let out = TempDir::new().unwrap();
    let input = TempDir::new().unwrap();
    let raw = jpeg_bytes(64, 48);
    let source = write_source(input.path(), &raw);

    let orchestrator = orchestrator(
        out.path(),
        VirtualFrame::File(source),
        FixedLocationSource::unknown(),
        NoOpGeocoder::new(),
        true,
    );
    orchestrator.start().await.unwrap();

    let outcome = orchestrator.take_photo().await.unwrap();
    let path = saved_path(&outcome);
    assert!(matches!(
        &outcome,
        CaptureOutcome::Saved { artifact, with_geotag: false }
            if artifact.geotag == Some(GeotagResult::SkippedNoLocation)
    ));
    assert_eq!(std::fs::read(path).unwrap(), raw);

    orchestrator.shutdown().await;
}

#[tokio::test]
async fn undecodable_capture_is_saved_raw_with_overlay_error() {
    let out = TempDir::new().unwrap();
    let input = TempDir::new().unwrap();
    let raw = b"definitely not an image".to_vec();
    let source = write_source(input.path(), &raw);

    let orchestrator = orchestrator(
        out.path(),
        VirtualFrame::File(source),
        FixedLocationSource::new(opera_house()),
        NoOpGeocoder::new(),
        true,
    );
    orchestrator.start().await.unwrap();
    tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.feed().subscribe().wait_for(|s| s.is_some()),
    )
    .await
    .unwrap()
    .unwrap();

    let outcome = orchestrator.take_photo().await.unwrap();
    let path = saved_path(&outcome);
    match &outcome {
        CaptureOutcome::Saved {
            artifact,
            with_geotag: false,
        } => assert!(matches!(artifact.geotag, Some(GeotagResult::SkippedError(_)))),
        other => panic!("expected raw save, got {:?}", other),
    }
    assert_eq!(std::fs::read(path).unwrap(), raw);

    orchestrator.shutdown().await;
}

#[tokio::test]
async fn location_permission_denied_only_costs_the_geotag() {
    let out = TempDir::new().unwrap();
    let orchestrator = orchestrator(
        out.path(),
        VirtualFrame::TestPattern {
            width: 120,
            height: 90,
        },
        FixedLocationSource::new(opera_house()),
        FixedAddressGeocoder::new("Sydney Opera House"),
        false,
    );

    orchestrator.start().await.unwrap();
    assert!(!orchestrator.feed().is_running().await);

    let outcome = orchestrator.take_photo().await.unwrap();
    assert!(matches!(
        &outcome,
        CaptureOutcome::Saved { artifact, with_geotag: false }
            if artifact.geotag == Some(GeotagResult::SkippedNoLocation)
    ));

    orchestrator.shutdown().await;
}

#[tokio::test]
async fn missing_source_fails_without_leaving_a_file() {
    let out = TempDir::new().unwrap();
    let orchestrator = orchestrator(
        out.path(),
        VirtualFrame::File(out.path().join("missing.jpg")),
        FixedLocationSource::unknown(),
        NoOpGeocoder::new(),
        true,
    );
    let mut outcomes = orchestrator.subscribe_outcomes();
    orchestrator.start().await.unwrap();

    let outcome = orchestrator.take_photo().await.unwrap();
    assert!(!outcome.is_saved());
    assert!(matches!(
        &outcome,
        CaptureOutcome::Failed {
            kind: MediaKind::Photo,
            ..
        }
    ));
    assert_eq!(outcomes.recv().await.unwrap(), outcome);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);

    orchestrator.shutdown().await;
}

#[tokio::test]
async fn capture_after_shutdown_is_rejected() {
    let out = TempDir::new().unwrap();
    let orchestrator = orchestrator(
        out.path(),
        VirtualFrame::default(),
        FixedLocationSource::unknown(),
        NoOpGeocoder::new(),
        true,
    );
    orchestrator.start().await.unwrap();
    orchestrator.shutdown().await;

    assert!(matches!(
        orchestrator.take_photo().await,
        Err(CaptureError::SessionClosed) | Err(CaptureError::NotBound(_))
    ));
}

#[tokio::test]
async fn recording_that_cannot_start_leaves_no_video_file() {
    let out = TempDir::new().unwrap();
    let controller = RecordingController::new(
        Arc::new(VirtualCamera::new(VirtualFrame::default())),
        services(out.path(), true),
    );

    let err = controller.toggle().await.unwrap_err();
    assert!(matches!(err, RecordingError::StartFailed(_)));
    assert_eq!(controller.state(), RecordingState::Idle);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}
