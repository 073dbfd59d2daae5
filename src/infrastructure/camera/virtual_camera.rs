//! Virtual camera adapter
//!
//! Stands in for camera hardware: a capture copies a source image or
//! renders a test pattern. Video recording is not supported.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::application::ports::{
    BindRequest, CameraDevice, DeviceCapabilities, DeviceError, PreparedRecording,
};
use crate::domain::capture::{CaptureMode, FlashMode, LensFacing, ZoomRange};

const PATTERN_WIDTH: u32 = 1280;
const PATTERN_HEIGHT: u32 = 960;
const PATTERN_QUALITY: u8 = 95;

/// Image the virtual shutter produces
#[derive(Debug, Clone)]
pub enum VirtualFrame {
    /// Bytes of an existing image file, copied verbatim
    File(PathBuf),
    /// Generated colour gradient
    TestPattern { width: u32, height: u32 },
}

impl Default for VirtualFrame {
    fn default() -> Self {
        Self::TestPattern {
            width: PATTERN_WIDTH,
            height: PATTERN_HEIGHT,
        }
    }
}

/// Software camera implementing the device port
pub struct VirtualCamera {
    frame: VirtualFrame,
    zoom_range: ZoomRange,
    has_front: bool,
    bound: Mutex<Option<BindRequest>>,
}

impl VirtualCamera {
    pub fn new(frame: VirtualFrame) -> Self {
        Self {
            frame,
            zoom_range: ZoomRange::new(1.0, 8.0),
            has_front: true,
            bound: Mutex::new(None),
        }
    }

    /// Override the zoom range reported on bind
    pub fn with_zoom_range(mut self, range: ZoomRange) -> Self {
        self.zoom_range = range;
        self
    }

    /// Simulate a device with only a back camera
    pub fn without_front_lens(mut self) -> Self {
        self.has_front = false;
        self
    }

    async fn frame_bytes(&self) -> Result<Vec<u8>, DeviceError> {
        match &self.frame {
            VirtualFrame::File(source) => tokio::fs::read(source).await.map_err(|e| {
                DeviceError::Failed(format!("cannot read {}: {}", source.display(), e))
            }),
            VirtualFrame::TestPattern { width, height } => {
                let (width, height) = (*width, *height);
                tokio::task::spawn_blocking(move || render_test_pattern(width, height))
                    .await
                    .map_err(|e| DeviceError::Failed(format!("pattern task failed: {}", e)))?
            }
        }
    }
}

#[async_trait]
impl CameraDevice for VirtualCamera {
    async fn bind(&self, request: BindRequest) -> Result<DeviceCapabilities, DeviceError> {
        if request.lens == LensFacing::Front && !self.has_front {
            return Err(DeviceError::Unsupported("no front-facing camera".to_string()));
        }
        let mut bound = self.bound.lock().await;
        if bound.is_some() {
            return Err(DeviceError::Busy);
        }
        *bound = Some(request);
        info!(lens = %request.lens, mode = %request.mode, "Virtual camera bound");
        Ok(DeviceCapabilities {
            zoom_range: self.zoom_range,
        })
    }

    async fn unbind(&self) {
        if self.bound.lock().await.take().is_some() {
            debug!("Virtual camera unbound");
        }
    }

    async fn set_zoom_ratio(&self, ratio: f32) -> Result<(), DeviceError> {
        if self.bound.lock().await.is_none() {
            return Err(DeviceError::NotBound);
        }
        debug!(ratio, "Virtual zoom");
        Ok(())
    }

    async fn set_flash_mode(&self, mode: FlashMode) -> Result<(), DeviceError> {
        match self.bound.lock().await.as_mut() {
            Some(request) => {
                request.flash = mode;
                Ok(())
            }
            None => Err(DeviceError::NotBound),
        }
    }

    async fn take_picture(&self, path: &Path) -> Result<(), DeviceError> {
        match *self.bound.lock().await {
            Some(BindRequest {
                mode: CaptureMode::Photo,
                ..
            }) => {}
            Some(_) => return Err(DeviceError::Unsupported("bound for video".to_string())),
            None => return Err(DeviceError::NotBound),
        }

        let bytes = self.frame_bytes().await?;
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| DeviceError::Failed(format!("cannot write {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Virtual picture taken");
        Ok(())
    }

    async fn prepare_recording(
        &self,
        _path: &Path,
        _with_audio: bool,
    ) -> Result<PreparedRecording, DeviceError> {
        Err(DeviceError::Unsupported(
            "the virtual camera cannot record video".to_string(),
        ))
    }
}

/// Diagonal colour gradient, JPEG encoded
fn render_test_pattern(width: u32, height: u32) -> Result<Vec<u8>, DeviceError> {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    let image = RgbImage::from_fn(width, height, |x, y| {
        let fx = x as f32 / w;
        let fy = y as f32 / h;
        Rgb([
            (fx * 255.0) as u8,
            (fy * 255.0) as u8,
            ((1.0 - (fx + fy) / 2.0) * 255.0) as u8,
        ])
    });

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, PATTERN_QUALITY)
        .encode(image.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| DeviceError::Failed(format!("JPEG encoding failed: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(lens: LensFacing) -> BindRequest {
        BindRequest {
            lens,
            mode: CaptureMode::Photo,
            flash: FlashMode::Off,
        }
    }

    #[tokio::test]
    async fn test_pattern_is_a_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_1.jpg");
        let camera = VirtualCamera::new(VirtualFrame::TestPattern {
            width: 64,
            height: 48,
        });

        camera.bind(photo(LensFacing::Back)).await.unwrap();
        camera.take_picture(&path).await.unwrap();

        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (64, 48));
    }

    #[tokio::test]
    async fn file_frame_is_copied_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.jpg");
        std::fs::write(&source, b"raw sensor bytes").unwrap();
        let camera = VirtualCamera::new(VirtualFrame::File(source));

        camera.bind(photo(LensFacing::Back)).await.unwrap();
        let path = dir.path().join("IMG_1.jpg");
        camera.take_picture(&path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"raw sensor bytes");
    }

    #[tokio::test]
    async fn double_bind_is_busy() {
        let camera = VirtualCamera::new(VirtualFrame::default());
        camera.bind(photo(LensFacing::Back)).await.unwrap();
        assert!(matches!(
            camera.bind(photo(LensFacing::Back)).await,
            Err(DeviceError::Busy)
        ));
        camera.unbind().await;
        assert!(camera.bind(photo(LensFacing::Back)).await.is_ok());
    }

    #[tokio::test]
    async fn bind_reports_configured_zoom_range() {
        let camera =
            VirtualCamera::new(VirtualFrame::default()).with_zoom_range(ZoomRange::new(8.0, 1.0));
        let capabilities = camera.bind(photo(LensFacing::Back)).await.unwrap();
        assert_eq!(capabilities.zoom_range.min(), 1.0);
        assert_eq!(capabilities.zoom_range.max(), 8.0);
    }

    #[tokio::test]
    async fn missing_front_lens_is_unsupported() {
        let camera = VirtualCamera::new(VirtualFrame::default()).without_front_lens();
        assert!(matches!(
            camera.bind(photo(LensFacing::Front)).await,
            Err(DeviceError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn unbound_camera_rejects_capture() {
        let camera = VirtualCamera::new(VirtualFrame::default());
        assert!(matches!(
            camera.take_picture(Path::new("/tmp/x.jpg")).await,
            Err(DeviceError::NotBound)
        ));
    }
}
