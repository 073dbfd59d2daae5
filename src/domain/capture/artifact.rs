//! Capture artifacts and outcomes

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::domain::overlay::OverlayText;

/// Kind of media a capture produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Photo => "IMG",
            Self::Video => "VID",
        }
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Photo => "jpg",
            Self::Video => "mp4",
        }
    }

    /// File name for a capture taken at `at`, e.g. `IMG_20240305_140700.jpg`.
    /// A non-zero `attempt` appends a collision suffix (`IMG_20240305_140700_1.jpg`).
    pub fn file_name(&self, at: DateTime<Local>, attempt: u32) -> String {
        let stamp = at.format("%Y%m%d_%H%M%S");
        if attempt == 0 {
            format!("{}_{}.{}", self.prefix(), stamp, self.extension())
        } else {
            format!("{}_{}_{}.{}", self.prefix(), stamp, attempt, self.extension())
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photo => write!(f, "photo"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// What happened to the geotag overlay of a photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeotagResult {
    /// Overlay burned into the saved file
    Applied(OverlayText),
    /// No location snapshot was available at the shutter
    SkippedNoLocation,
    /// Compositing failed; the raw capture was kept
    SkippedError(String),
    /// Geotagging is turned off
    Disabled,
}

impl GeotagResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// A finished capture. Immutable once emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureArtifact {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub captured_at: DateTime<Local>,
    /// Set for photos once they passed the geotag stage; `None` for videos
    /// and raw captures
    pub geotag: Option<GeotagResult>,
}

impl CaptureArtifact {
    pub fn photo(path: PathBuf, captured_at: DateTime<Local>, geotag: GeotagResult) -> Self {
        Self {
            path,
            kind: MediaKind::Photo,
            captured_at,
            geotag: Some(geotag),
        }
    }

    /// Photo straight from the hardware, before the geotag stage
    pub fn raw_photo(path: PathBuf, captured_at: DateTime<Local>) -> Self {
        Self {
            path,
            kind: MediaKind::Photo,
            captured_at,
            geotag: None,
        }
    }

    /// Same artifact with the geotag stage's result attached
    pub fn with_geotag(self, geotag: GeotagResult) -> Self {
        Self {
            geotag: Some(geotag),
            ..self
        }
    }

    pub fn video(path: PathBuf, captured_at: DateTime<Local>) -> Self {
        Self {
            path,
            kind: MediaKind::Video,
            captured_at,
            geotag: None,
        }
    }

    pub fn has_geotag(&self) -> bool {
        self.geotag.as_ref().is_some_and(GeotagResult::is_applied)
    }
}

/// Terminal outcome of one capture, as observed by subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Saved {
        artifact: CaptureArtifact,
        with_geotag: bool,
    },
    Failed {
        kind: MediaKind,
        reason: String,
    },
}

impl CaptureOutcome {
    pub fn saved(artifact: CaptureArtifact) -> Self {
        let with_geotag = artifact.has_geotag();
        Self::Saved {
            artifact,
            with_geotag,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

impl fmt::Display for CaptureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved {
                artifact,
                with_geotag: true,
            } => write!(f, "{} saved with geotag: {}", artifact.kind, artifact.path.display()),
            Self::Saved { artifact, .. } => {
                write!(f, "{} saved: {}", artifact.kind, artifact.path.display())
            }
            Self::Failed { kind, reason } => write!(f, "{} capture failed: {}", kind, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn photo_file_name() {
        assert_eq!(MediaKind::Photo.file_name(at(), 0), "IMG_20240305_140709.jpg");
    }

    #[test]
    fn video_file_name() {
        assert_eq!(MediaKind::Video.file_name(at(), 0), "VID_20240305_140709.mp4");
    }

    #[test]
    fn collision_suffix() {
        assert_eq!(MediaKind::Photo.file_name(at(), 2), "IMG_20240305_140709_2.jpg");
    }

    #[test]
    fn saved_outcome_reflects_geotag() {
        let applied = CaptureArtifact::photo(
            PathBuf::from("/tmp/a.jpg"),
            at(),
            GeotagResult::Applied(OverlayText {
                title: "t".into(),
                subtitle: "s".into(),
                coordinates: "c".into(),
                timestamp: "n".into(),
            }),
        );
        assert_eq!(
            CaptureOutcome::saved(applied.clone()),
            CaptureOutcome::Saved {
                artifact: applied,
                with_geotag: true
            }
        );

        let skipped =
            CaptureArtifact::photo(PathBuf::from("/tmp/b.jpg"), at(), GeotagResult::SkippedNoLocation);
        assert!(matches!(
            CaptureOutcome::saved(skipped),
            CaptureOutcome::Saved {
                with_geotag: false,
                ..
            }
        ));

        let video = CaptureArtifact::video(PathBuf::from("/tmp/c.mp4"), at());
        assert!(!video.has_geotag());
    }
}
