//! Typeface port interface

/// Rasterized glyph coverage, row-major, one byte per pixel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    /// Offset of the bitmap's left edge from the pen position
    pub xmin: i32,
    /// Offset of the bitmap's bottom edge from the baseline (positive is up)
    pub ymin: i32,
    /// Horizontal pen advance in pixels
    pub advance_width: f32,
    pub coverage: Vec<u8>,
}

/// Port for glyph rasterization used by the overlay compositor
pub trait Typeface: Send + Sync {
    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap;
}
