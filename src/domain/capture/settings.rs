//! Capture settings value objects

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidChoiceError;

/// Zoom ratio every bind starts from
pub const DEFAULT_ZOOM_RATIO: f32 = 1.0;

/// Multiplier applied by a single zoom-in / zoom-out step
pub const ZOOM_STEP: f32 = 1.2;

/// Which physical lens the pipeline is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LensFacing {
    #[default]
    Back,
    Front,
}

impl LensFacing {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Front => "front",
        }
    }

    /// The other lens
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Back => Self::Front,
            Self::Front => Self::Back,
        }
    }
}

impl fmt::Display for LensFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LensFacing {
    type Err = InvalidChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "back" | "rear" => Ok(Self::Back),
            "front" => Ok(Self::Front),
            _ => Err(InvalidChoiceError {
                kind: "lens",
                input: s.to_string(),
                valid: "back, front",
            }),
        }
    }
}

/// Flash behavior for still captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlashMode {
    #[default]
    Off,
    On,
    Auto,
}

impl FlashMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Auto => "auto",
        }
    }

    /// Cycle to the next mode: Off -> On -> Auto -> Off
    pub const fn next(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Auto,
            Self::Auto => Self::Off,
        }
    }

    pub(crate) const fn to_u8(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::Auto => 2,
        }
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::On,
            2 => Self::Auto,
            _ => Self::Off,
        }
    }
}

impl fmt::Display for FlashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FlashMode {
    type Err = InvalidChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "on" => Ok(Self::On),
            "auto" => Ok(Self::Auto),
            _ => Err(InvalidChoiceError {
                kind: "flash mode",
                input: s.to_string(),
                valid: "off, on, auto",
            }),
        }
    }
}

/// Output pipeline attached to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureMode {
    #[default]
    Photo,
    Video,
}

impl CaptureMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Device-reported zoom bounds for the bound pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    min: f32,
    max: f32,
}

impl ZoomRange {
    /// Create a range; bounds are swapped if reversed and non-finite or
    /// non-positive values collapse to the fixed 1.0 range.
    pub fn new(min: f32, max: f32) -> Self {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || max <= 0.0 {
            return Self::fixed();
        }
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Range for devices without optical or digital zoom
    pub const fn fixed() -> Self {
        Self { min: 1.0, max: 1.0 }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Clamp a requested ratio into the range
    pub fn clamp(&self, ratio: f32) -> f32 {
        ratio.clamp(self.min, self.max)
    }

    pub fn contains(&self, ratio: f32) -> bool {
        (self.min..=self.max).contains(&ratio)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::fixed()
    }
}

/// Settings owned by the capture session.
///
/// Invariant: `zoom_ratio` always lies within `zoom_range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureSettings {
    lens: LensFacing,
    zoom_ratio: f32,
    zoom_range: ZoomRange,
    flash: FlashMode,
    mode: CaptureMode,
}

impl CaptureSettings {
    pub fn new(lens: LensFacing, mode: CaptureMode, flash: FlashMode) -> Self {
        Self {
            lens,
            zoom_ratio: DEFAULT_ZOOM_RATIO,
            zoom_range: ZoomRange::fixed(),
            flash,
            mode,
        }
    }

    pub fn lens(&self) -> LensFacing {
        self.lens
    }

    pub fn zoom_ratio(&self) -> f32 {
        self.zoom_ratio
    }

    pub fn zoom_range(&self) -> ZoomRange {
        self.zoom_range
    }

    pub fn flash(&self) -> FlashMode {
        self.flash
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub(crate) fn set_lens(&mut self, lens: LensFacing) {
        self.lens = lens;
    }

    pub(crate) fn set_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
    }

    pub(crate) fn set_flash(&mut self, flash: FlashMode) {
        self.flash = flash;
    }

    /// Adopt new device bounds and reset zoom to the default ratio (clamped)
    pub(crate) fn reset_zoom(&mut self, range: ZoomRange) {
        self.zoom_range = range;
        self.zoom_ratio = range.clamp(DEFAULT_ZOOM_RATIO);
    }

    /// Clamp and record a zoom ratio; returns the effective ratio
    pub(crate) fn set_zoom(&mut self, ratio: f32) -> f32 {
        self.zoom_ratio = self.zoom_range.clamp(ratio);
        self.zoom_ratio
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self::new(LensFacing::default(), CaptureMode::default(), FlashMode::default())
    }
}
