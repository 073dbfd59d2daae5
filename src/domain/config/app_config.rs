//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::capture::{FlashMode, LensFacing};
use crate::domain::interval::Interval;

/// Default JPEG re-encode quality for composited photos
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Default minimum distance between location fixes, in metres
pub const DEFAULT_MIN_DISTANCE_M: f32 = 5.0;

/// Default reverse-geocoding endpoint
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Camera defaults applied at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraConfig {
    pub lens: Option<String>,
    pub flash: Option<String>,
}

/// Location subscription settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub interval: Option<String>,
    pub min_distance: Option<f32>,
    pub stale_after: Option<String>,
    pub geocoder_url: Option<String>,
}

/// Geotag overlay settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub enabled: Option<bool>,
    pub font_path: Option<String>,
}

/// Media registration hook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaIndexConfig {
    pub command: Option<String>,
}

/// Capabilities granted to the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionsConfig {
    pub microphone: Option<bool>,
    pub location: Option<bool>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub output_dir: Option<String>,
    pub jpeg_quality: Option<u8>,
    pub camera: Option<CameraConfig>,
    pub location: Option<LocationConfig>,
    pub overlay: Option<OverlayConfig>,
    pub media_index: Option<MediaIndexConfig>,
    pub permissions: Option<PermissionsConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            output_dir: None,
            jpeg_quality: Some(DEFAULT_JPEG_QUALITY),
            camera: Some(CameraConfig {
                lens: Some(LensFacing::default().to_string()),
                flash: Some(FlashMode::default().to_string()),
            }),
            location: Some(LocationConfig {
                interval: Some(Interval::default_update_interval().to_string()),
                min_distance: Some(DEFAULT_MIN_DISTANCE_M),
                stale_after: Some(Interval::default_stale_after().to_string()),
                geocoder_url: Some(DEFAULT_GEOCODER_URL.to_string()),
            }),
            overlay: Some(OverlayConfig {
                enabled: Some(true),
                font_path: None,
            }),
            media_index: None,
            permissions: Some(PermissionsConfig {
                microphone: Some(true),
                location: Some(true),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            output_dir: other.output_dir.or(self.output_dir),
            jpeg_quality: other.jpeg_quality.or(self.jpeg_quality),
            camera: merge_section(self.camera, other.camera, |b, o| CameraConfig {
                lens: o.lens.or(b.lens),
                flash: o.flash.or(b.flash),
            }),
            location: merge_section(self.location, other.location, |b, o| LocationConfig {
                interval: o.interval.or(b.interval),
                min_distance: o.min_distance.or(b.min_distance),
                stale_after: o.stale_after.or(b.stale_after),
                geocoder_url: o.geocoder_url.or(b.geocoder_url),
            }),
            overlay: merge_section(self.overlay, other.overlay, |b, o| OverlayConfig {
                enabled: o.enabled.or(b.enabled),
                font_path: o.font_path.or(b.font_path),
            }),
            media_index: merge_section(self.media_index, other.media_index, |b, o| {
                MediaIndexConfig {
                    command: o.command.or(b.command),
                }
            }),
            permissions: merge_section(self.permissions, other.permissions, |b, o| {
                PermissionsConfig {
                    microphone: o.microphone.or(b.microphone),
                    location: o.location.or(b.location),
                }
            }),
        }
    }

    /// Output directory, or `<Pictures>/GeoCam` if not set
    pub fn output_dir_or_default(&self) -> PathBuf {
        self.output_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_output_dir)
    }

    /// JPEG quality clamped to 1..=100, or 95 if not set
    pub fn jpeg_quality_or_default(&self) -> u8 {
        self.jpeg_quality
            .unwrap_or(DEFAULT_JPEG_QUALITY)
            .clamp(1, 100)
    }

    /// Get lens as parsed LensFacing, or default if not set/invalid
    pub fn lens_or_default(&self) -> LensFacing {
        self.camera
            .as_ref()
            .and_then(|c| c.lens.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get flash as parsed FlashMode, or default if not set/invalid
    pub fn flash_or_default(&self) -> FlashMode {
        self.camera
            .as_ref()
            .and_then(|c| c.flash.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get location interval, or 5s if not set/invalid
    pub fn location_interval_or_default(&self) -> Interval {
        self.location
            .as_ref()
            .and_then(|l| l.interval.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Interval::default_update_interval)
    }

    /// Get minimum distance between fixes, or 5 m if not set/invalid
    pub fn min_distance_or_default(&self) -> f32 {
        self.location
            .as_ref()
            .and_then(|l| l.min_distance)
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(DEFAULT_MIN_DISTANCE_M)
    }

    /// Get staleness threshold, or 2m if not set/invalid
    pub fn stale_after_or_default(&self) -> Interval {
        self.location
            .as_ref()
            .and_then(|l| l.stale_after.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Interval::default_stale_after)
    }

    /// Get geocoder base URL, or the public Nominatim endpoint if not set
    pub fn geocoder_url_or_default(&self) -> &str {
        self.location
            .as_ref()
            .and_then(|l| l.geocoder_url.as_deref())
            .unwrap_or(DEFAULT_GEOCODER_URL)
    }

    /// Get overlay setting, or true if not set
    pub fn overlay_enabled_or_default(&self) -> bool {
        self.overlay
            .as_ref()
            .and_then(|o| o.enabled)
            .unwrap_or(true)
    }

    /// Configured overlay font, if any
    pub fn font_path(&self) -> Option<&str> {
        self.overlay.as_ref().and_then(|o| o.font_path.as_deref())
    }

    /// Configured media registration command, if any
    pub fn media_index_command(&self) -> Option<&str> {
        self.media_index
            .as_ref()
            .and_then(|m| m.command.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    /// Get microphone permission, or true if not set
    pub fn microphone_granted_or_default(&self) -> bool {
        self.permissions
            .as_ref()
            .and_then(|p| p.microphone)
            .unwrap_or(true)
    }

    /// Get location permission, or true if not set
    pub fn location_granted_or_default(&self) -> bool {
        self.permissions
            .as_ref()
            .and_then(|p| p.location)
            .unwrap_or(true)
    }
}

/// Merge optional config sections field by field
fn merge_section<T>(base: Option<T>, other: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (base, other) {
        (None, None) => None,
        (Some(b), None) => Some(b),
        (None, Some(o)) => Some(o),
        (Some(b), Some(o)) => Some(merge(b, o)),
    }
}

fn default_output_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("GeoCam")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.jpeg_quality, Some(95));
        assert_eq!(config.lens_or_default(), LensFacing::Back);
        assert_eq!(config.flash_or_default(), FlashMode::Off);
        assert_eq!(config.location_interval_or_default().as_secs(), 5);
        assert_eq!(config.stale_after_or_default().as_secs(), 120);
        assert!(config.overlay_enabled_or_default());
        assert!(config.media_index_command().is_none());

        let location = config.location.as_ref().unwrap();
        assert_eq!(location.interval, Some("5s".to_string()));
        assert_eq!(location.stale_after, Some("2m".to_string()));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.output_dir.is_none());
        assert!(config.jpeg_quality.is_none());
        assert!(config.camera.is_none());
        assert!(config.location.is_none());
        assert!(config.permissions.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            output_dir: Some("/base".to_string()),
            jpeg_quality: Some(80),
            ..Default::default()
        };
        let other = AppConfig {
            output_dir: Some("/other".to_string()),
            jpeg_quality: None,
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.output_dir, Some("/other".to_string()));
        assert_eq!(merged.jpeg_quality, Some(80));
    }

    #[test]
    fn merge_sections_field_by_field() {
        let base = AppConfig {
            camera: Some(CameraConfig {
                lens: Some("front".to_string()),
                flash: Some("on".to_string()),
            }),
            ..Default::default()
        };
        let other = AppConfig {
            camera: Some(CameraConfig {
                lens: None,
                flash: Some("auto".to_string()),
            }),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.lens_or_default(), LensFacing::Front);
        assert_eq!(merged.flash_or_default(), FlashMode::Auto);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = AppConfig {
            camera: Some(CameraConfig {
                lens: Some("sideways".to_string()),
                flash: Some("strobe".to_string()),
            }),
            location: Some(LocationConfig {
                interval: Some("soon".to_string()),
                min_distance: Some(-1.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.lens_or_default(), LensFacing::Back);
        assert_eq!(config.flash_or_default(), FlashMode::Off);
        assert_eq!(config.location_interval_or_default().as_secs(), 5);
        assert_eq!(config.min_distance_or_default(), 5.0);
    }

    #[test]
    fn jpeg_quality_is_clamped() {
        let config = AppConfig {
            jpeg_quality: Some(0),
            ..Default::default()
        };
        assert_eq!(config.jpeg_quality_or_default(), 1);
    }

    #[test]
    fn output_dir_ends_with_geocam_by_default() {
        let config = AppConfig::empty();
        assert!(config.output_dir_or_default().ends_with("GeoCam"));

        let config = AppConfig {
            output_dir: Some("/tmp/shots".to_string()),
            ..Default::default()
        };
        assert_eq!(config.output_dir_or_default(), PathBuf::from("/tmp/shots"));
    }

    #[test]
    fn blank_media_index_command_is_ignored() {
        let config = AppConfig {
            media_index: Some(MediaIndexConfig {
                command: Some("  ".to_string()),
            }),
            ..Default::default()
        };
        assert!(config.media_index_command().is_none());
    }

    #[test]
    fn permissions_default_to_granted() {
        let config = AppConfig::empty();
        assert!(config.microphone_granted_or_default());
        assert!(config.location_granted_or_default());
    }

    #[test]
    fn toml_round_trip_keeps_sections() {
        let config = AppConfig::defaults();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.geocoder_url_or_default(), DEFAULT_GEOCODER_URL);
        assert_eq!(parsed.jpeg_quality, Some(95));
    }
}
