//! fontdue typeface adapter

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::application::ports::{GlyphBitmap, Typeface};

/// Bold sans-serif fonts commonly shipped by Linux distributions and macOS
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/usr/share/fonts/noto/NotoSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Font loading errors
#[derive(Debug, Clone, Error)]
pub enum FontError {
    #[error("Failed to read font {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid font data: {0}")]
    Parse(String),

    #[error("No usable system font found; set overlay.font_path")]
    NotFound,
}

/// Typeface backed by a fontdue font
pub struct FontdueTypeface {
    font: fontdue::Font,
}

impl FontdueTypeface {
    /// Parse a TrueType/OpenType font from memory
    pub fn from_bytes(data: &[u8]) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;
        Ok(Self { font })
    }

    /// Load a font file
    pub fn from_file(path: &Path) -> Result<Self, FontError> {
        let data = std::fs::read(path).map_err(|e| FontError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_bytes(&data)
    }

    /// Load the configured font, or the first system font that exists
    pub fn load(configured: Option<&str>) -> Result<Self, FontError> {
        let path = match configured {
            Some(path) => PathBuf::from(path),
            None => locate_system_font().ok_or(FontError::NotFound)?,
        };
        debug!(path = %path.display(), "Loading overlay font");
        Self::from_file(&path)
    }
}

impl Typeface for FontdueTypeface {
    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap {
        let (metrics, coverage) = self.font.rasterize(ch, px);
        GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            advance_width: metrics.advance_width,
            coverage,
        }
    }
}

/// First existing entry of the built-in candidate list
pub fn locate_system_font() -> Option<PathBuf> {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}
