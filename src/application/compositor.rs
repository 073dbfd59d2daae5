//! Geotag overlay compositor
//!
//! Pure: decode buffers are owned per call, so separate images can be
//! composited concurrently.

use std::io::Cursor;
use std::sync::Arc;

use chrono::{DateTime, Local};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageFormat, RgbaImage};
use thiserror::Error;
use tiny_skia::{Color, Paint, Pixmap, PremultipliedColorU8, Rect, Transform};
use tracing::debug;

use crate::domain::location::LocationSnapshot;
use crate::domain::overlay::{OverlayLayout, OverlayLine, OverlayText};

use super::ports::Typeface;

/// Compositing errors
#[derive(Debug, Clone, Error)]
pub enum CompositeError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Image I/O failed: {0}")]
    Io(String),

    #[error("Image has no pixels")]
    EmptyImage,
}

/// A decoded still image plus the container format it came from
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: DynamicImage,
    format: ImageFormat,
}

impl DecodedImage {
    /// Decode encoded bytes, guessing the format from the content
    pub fn decode(bytes: &[u8]) -> Result<Self, CompositeError> {
        let format =
            image::guess_format(bytes).map_err(|e| CompositeError::Decode(e.to_string()))?;
        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| CompositeError::Decode(e.to_string()))?;
        Self::new(image, format)
    }

    pub fn new(image: DynamicImage, format: ImageFormat) -> Result<Self, CompositeError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(CompositeError::EmptyImage);
        }
        Ok(Self { image, format })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

/// Re-encoded output in the source format
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Burns the location/time overlay into still images
pub struct OverlayCompositor {
    typeface: Arc<dyn Typeface>,
    jpeg_quality: u8,
}

impl OverlayCompositor {
    pub fn new(typeface: Arc<dyn Typeface>, jpeg_quality: u8) -> Self {
        Self {
            typeface,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Composite `snapshot` onto `image`, stamped with the current time.
    /// Without a snapshot the image is re-encoded unchanged.
    pub fn apply(
        &self,
        image: DecodedImage,
        snapshot: Option<&LocationSnapshot>,
    ) -> Result<EncodedImage, CompositeError> {
        self.apply_at(image, snapshot, Local::now())
    }

    /// `apply` with an explicit render time
    pub fn apply_at(
        &self,
        image: DecodedImage,
        snapshot: Option<&LocationSnapshot>,
        now: DateTime<Local>,
    ) -> Result<EncodedImage, CompositeError> {
        match snapshot {
            Some(snapshot) => self.render(image, &OverlayText::compose(snapshot, now)),
            None => {
                let format = image.format;
                self.encode(image.image.into_rgba8(), format)
            }
        }
    }

    /// Draw the band and the four `text` lines, then re-encode
    pub fn render(
        &self,
        image: DecodedImage,
        text: &OverlayText,
    ) -> Result<EncodedImage, CompositeError> {
        let format = image.format;
        let rgba = image.image.into_rgba8();
        let layout = OverlayLayout::compute(rgba.height(), text);
        debug!(
            width = rgba.width(),
            height = rgba.height(),
            band_height = layout.band_height,
            "Compositing overlay"
        );

        let composited = self.draw(rgba, &layout)?;
        self.encode(composited, format)
    }

    fn draw(&self, rgba: RgbaImage, layout: &OverlayLayout) -> Result<RgbaImage, CompositeError> {
        let (width, height) = rgba.dimensions();
        let size = tiny_skia::IntSize::from_wh(width, height).ok_or(CompositeError::EmptyImage)?;

        // Pixmap storage is premultiplied RGBA
        let mut data = rgba.into_raw();
        for px in data.chunks_exact_mut(4) {
            let a = px[3] as u16;
            for c in &mut px[..3] {
                *c = ((*c as u16 * a + 127) / 255) as u8;
            }
        }
        let mut pixmap = Pixmap::from_vec(data, size).ok_or(CompositeError::EmptyImage)?;

        let band = Rect::from_xywh(
            0.0,
            layout.band_top as f32,
            width as f32,
            layout.band_height as f32,
        )
        .ok_or(CompositeError::EmptyImage)?;
        let mut paint = Paint::default();
        paint.set_color(Color::BLACK);
        pixmap.fill_rect(band, &paint, Transform::identity(), None);

        for line in &layout.lines {
            self.draw_line(&mut pixmap, line, Color::WHITE);
        }

        let mut data = pixmap.take();
        for px in data.chunks_exact_mut(4) {
            let a = px[3] as u16;
            if a != 0 && a != 255 {
                for c in &mut px[..3] {
                    *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        RgbaImage::from_raw(width, height, data).ok_or(CompositeError::EmptyImage)
    }

    fn draw_line(&self, pixmap: &mut Pixmap, line: &OverlayLine, color: Color) {
        let width = pixmap.width() as i32;
        let height = pixmap.height() as i32;
        let mut x = line.x;

        for ch in line.text.chars() {
            let glyph = self.typeface.rasterize(ch, line.size);
            if glyph.coverage.is_empty() {
                x += glyph.advance_width;
                continue;
            }

            let glyph_x = x + glyph.xmin as f32;
            let glyph_y = line.baseline - glyph.height as f32 - glyph.ymin as f32;

            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    let coverage = glyph.coverage[gy * glyph.width + gx];
                    if coverage == 0 {
                        continue;
                    }

                    let px = (glyph_x + gx as f32) as i32;
                    let py = (glyph_y + gy as f32) as i32;
                    if px < 0 || px >= width || py < 0 || py >= height {
                        continue;
                    }

                    let alpha = (coverage as f32 / 255.0) * color.alpha();
                    let pixel_color =
                        Color::from_rgba(color.red(), color.green(), color.blue(), alpha)
                            .unwrap_or(color);
                    if let Some(existing) = pixmap.pixel(px as u32, py as u32) {
                        let index = (py * width + px) as usize;
                        pixmap.pixels_mut()[index] = blend_pixel(existing, pixel_color);
                    }
                }
            }

            x += glyph.advance_width;
        }
    }

    fn encode(&self, rgba: RgbaImage, format: ImageFormat) -> Result<EncodedImage, CompositeError> {
        let (width, height) = rgba.dimensions();
        let mut bytes = Vec::new();

        match format {
            ImageFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(rgba).into_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality);
                encoder
                    .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| CompositeError::Encode(format!("JPEG encoding failed: {}", e)))?;
            }
            other => {
                rgba.write_to(&mut Cursor::new(&mut bytes), other)
                    .map_err(|e| CompositeError::Encode(format!("{:?} encoding failed: {}", other, e)))?;
            }
        }

        Ok(EncodedImage {
            bytes,
            format,
            width,
            height,
        })
    }
}

/// Blend a straight-alpha source color over a premultiplied pixel
fn blend_pixel(dst: PremultipliedColorU8, src: Color) -> PremultipliedColorU8 {
    let src_a = src.alpha();
    let dst_a = dst.alpha() as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return PremultipliedColorU8::TRANSPARENT;
    }

    // Premultiplied source-over: out = src * src_a + dst * (1 - src_a)
    let blend = |src_c: f32, dst_c: u8| -> u8 {
        let out = src_c * src_a + (dst_c as f32 / 255.0) * (1.0 - src_a);
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };
    let a = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;

    // Channels never exceed alpha after rounding, so this cannot fail
    PremultipliedColorU8::from_rgba(
        blend(src.red(), dst.red()).min(a),
        blend(src.green(), dst.green()).min(a),
        blend(src.blue(), dst.blue()).min(a),
        a,
    )
    .unwrap_or(dst)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::ports::GlyphBitmap;
    use crate::domain::location::{Coordinates, PlaceDescription};
    use chrono::{TimeZone, Utc};
    use image::{Rgb, RgbImage, Rgba};
    use std::sync::Mutex;

    /// Solid block glyphs; records every character it is asked for
    #[derive(Default)]
    pub(crate) struct BlockTypeface {
        pub drawn: Mutex<String>,
    }

    impl Typeface for BlockTypeface {
        fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap {
            self.drawn.lock().unwrap().push(ch);
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

    pub(crate) fn jpeg_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb(color));
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, 95)
            .encode(image.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
        bytes
    }

    fn compositor(typeface: Arc<BlockTypeface>) -> OverlayCompositor {
        OverlayCompositor::new(typeface, 95)
    }

    fn sydney() -> LocationSnapshot {
        LocationSnapshot::new(
            Coordinates::new(-33.8688, 151.2093).unwrap(),
            PlaceDescription::Resolved("Sydney Opera House, Sydney, NSW, Australia".to_string()),
            Utc::now(),
        )
    }

    fn decode_rgb(bytes: &[u8]) -> RgbImage {
        image::load_from_memory(bytes).unwrap().into_rgb8()
    }

    fn close(a: &Rgb<u8>, b: [u8; 3], tolerance: i16) -> bool {
        a.0.iter()
            .zip(b)
            .all(|(x, y)| (*x as i16 - y as i16).abs() <= tolerance)
    }

    #[test]
    fn without_snapshot_content_is_unchanged() {
        let typeface = Arc::new(BlockTypeface::default());
        let input = jpeg_bytes(64, 200, [200, 120, 40]);
        let original = decode_rgb(&input);

        let output = compositor(typeface.clone())
            .apply(DecodedImage::decode(&input).unwrap(), None)
            .unwrap();

        assert_eq!(output.format, ImageFormat::Jpeg);
        let result = decode_rgb(&output.bytes);
        assert_eq!(result.dimensions(), original.dimensions());
        for (a, b) in result.pixels().zip(original.pixels()) {
            assert!(close(a, b.0, 6));
        }
        assert!(typeface.drawn.lock().unwrap().is_empty());
    }

    #[test]
    fn snapshot_draws_opaque_band_and_text() {
        let typeface = Arc::new(BlockTypeface::default());
        let input = jpeg_bytes(400, 480, [250, 250, 250]);

        let output = compositor(typeface.clone())
            .apply(DecodedImage::decode(&input).unwrap(), Some(&sydney()))
            .unwrap();
        let result = decode_rgb(&output.bytes);

        // Above the band the image is untouched
        assert!(close(result.get_pixel(200, 100), [250, 250, 250], 6));
        // Right edge of the band: black, no text reaches it
        assert!(close(result.get_pixel(398, 330), [0, 0, 0], 16));
        // Inside the title's first glyph: white
        assert!(close(result.get_pixel(29, 354), [255, 255, 255], 40));

        let drawn = typeface.drawn.lock().unwrap().clone();
        assert!(drawn.starts_with("Sydney Opera House"));
        assert!(drawn.contains("Lat 33.8688° S    Long 151.2093° E"));
    }

    #[test]
    fn render_time_is_stamped() {
        let typeface = Arc::new(BlockTypeface::default());
        let input = jpeg_bytes(64, 200, [10, 10, 10]);
        let now = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();

        compositor(typeface.clone())
            .apply_at(DecodedImage::decode(&input).unwrap(), Some(&sydney()), now)
            .unwrap();

        assert!(typeface
            .drawn
            .lock()
            .unwrap()
            .ends_with("Tuesday, 05 March 2024 02:07 PM"));
    }

    #[test]
    fn png_stays_png() {
        let image = RgbaImage::from_pixel(32, 32, Rgba([0, 0, 255, 255]));
        let decoded = DecodedImage::new(DynamicImage::ImageRgba8(image), ImageFormat::Png).unwrap();

        let output = compositor(Arc::new(BlockTypeface::default()))
            .apply(decoded, Some(&sydney()))
            .unwrap();

        assert_eq!(output.format, ImageFormat::Png);
        assert_eq!(image::guess_format(&output.bytes).unwrap(), ImageFormat::Png);
        // The band covers the whole of a tiny image
        let result = decode_rgb(&output.bytes);
        assert_eq!(result.get_pixel(31, 0).0, [0, 0, 0]);
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            DecodedImage::decode(b"definitely not an image"),
            Err(CompositeError::Decode(_))
        ));
    }

    #[test]
    fn blend_opaque_source_replaces_pixel() {
        let dst = PremultipliedColorU8::from_rgba(10, 20, 30, 255).unwrap();
        let out = blend_pixel(dst, Color::WHITE);
        assert_eq!((out.red(), out.green(), out.blue(), out.alpha()), (255, 255, 255, 255));
    }

    #[test]
    fn blend_half_coverage_mixes() {
        let dst = PremultipliedColorU8::from_rgba(0, 0, 0, 255).unwrap();
        let src = Color::from_rgba(1.0, 1.0, 1.0, 0.5).unwrap();
        let out = blend_pixel(dst, src);
        assert_eq!(out.alpha(), 255);
        assert!((127..=128).contains(&out.red()));
    }
}
