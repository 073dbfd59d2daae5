//! Configuration value objects

mod app_config;

pub use app_config::{
    AppConfig, CameraConfig, LocationConfig, MediaIndexConfig, OverlayConfig, PermissionsConfig,
    DEFAULT_GEOCODER_URL, DEFAULT_JPEG_QUALITY, DEFAULT_MIN_DISTANCE_M,
};
