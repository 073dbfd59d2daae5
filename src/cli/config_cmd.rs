//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::capture::{FlashMode, LensFacing};
use crate::domain::config::{
    AppConfig, CameraConfig, LocationConfig, MediaIndexConfig, OverlayConfig, PermissionsConfig,
};
use crate::domain::error::ConfigError;
use crate::domain::interval::Interval;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    require_valid_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    require_valid_key(key)?;

    let config = store.load().await?;
    presenter.output(read_value(&config, key).as_deref().unwrap_or(NOT_SET));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, read_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn require_valid_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Validate `value` for `key` and store it in `config`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "output_dir" => config.output_dir = Some(value.to_string()),
        "jpeg_quality" => {
            let quality = value
                .parse::<u8>()
                .ok()
                .filter(|q| (1..=100).contains(q))
                .ok_or_else(|| invalid("Value must be a number from 1 to 100".to_string()))?;
            config.jpeg_quality = Some(quality);
        }
        "camera.lens" => {
            let lens: LensFacing = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            camera(config).lens = Some(lens.to_string());
        }
        "camera.flash" => {
            let flash: FlashMode = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            camera(config).flash = Some(flash.to_string());
        }
        "location.interval" | "location.stale_after" => {
            let interval: Interval = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            let section = location(config);
            if key == "location.interval" {
                section.interval = Some(interval.to_string());
            } else {
                section.stale_after = Some(interval.to_string());
            }
        }
        "location.min_distance" => {
            let distance = value
                .parse::<f32>()
                .ok()
                .filter(|d| d.is_finite() && *d >= 0.0)
                .ok_or_else(|| invalid("Value must be a non-negative number of metres".to_string()))?;
            location(config).min_distance = Some(distance);
        }
        "location.geocoder_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid("Value must be an http(s) URL".to_string()));
            }
            location(config).geocoder_url = Some(value.to_string());
        }
        "overlay.enabled" => overlay(config).enabled = Some(parse_bool(value).map_err(invalid)?),
        "overlay.font_path" => overlay(config).font_path = Some(value.to_string()),
        "media_index.command" => {
            config
                .media_index
                .get_or_insert_with(MediaIndexConfig::default)
                .command = Some(value.to_string());
        }
        "permissions.microphone" => {
            permissions(config).microphone = Some(parse_bool(value).map_err(invalid)?)
        }
        "permissions.location" => {
            permissions(config).location = Some(parse_bool(value).map_err(invalid)?)
        }
        _ => return Err(invalid("Unknown key".to_string())),
    }
    Ok(())
}

/// Stored value for `key`, formatted for display
fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    let camera = config.camera.as_ref();
    let location = config.location.as_ref();
    let overlay = config.overlay.as_ref();
    let permissions = config.permissions.as_ref();

    match key {
        "output_dir" => config.output_dir.clone(),
        "jpeg_quality" => config.jpeg_quality.map(|q| q.to_string()),
        "camera.lens" => camera.and_then(|c| c.lens.clone()),
        "camera.flash" => camera.and_then(|c| c.flash.clone()),
        "location.interval" => location.and_then(|l| l.interval.clone()),
        "location.min_distance" => location.and_then(|l| l.min_distance).map(|d| d.to_string()),
        "location.stale_after" => location.and_then(|l| l.stale_after.clone()),
        "location.geocoder_url" => location.and_then(|l| l.geocoder_url.clone()),
        "overlay.enabled" => overlay.and_then(|o| o.enabled).map(|b| b.to_string()),
        "overlay.font_path" => overlay.and_then(|o| o.font_path.clone()),
        "media_index.command" => config.media_index_command().map(str::to_string),
        "permissions.microphone" => permissions.and_then(|p| p.microphone).map(|b| b.to_string()),
        "permissions.location" => permissions.and_then(|p| p.location).map(|b| b.to_string()),
        _ => None,
    }
}

fn camera(config: &mut AppConfig) -> &mut CameraConfig {
    config.camera.get_or_insert_with(CameraConfig::default)
}

fn location(config: &mut AppConfig) -> &mut LocationConfig {
    config.location.get_or_insert_with(LocationConfig::default)
}

fn overlay(config: &mut AppConfig) -> &mut OverlayConfig {
    config.overlay.get_or_insert_with(OverlayConfig::default)
}

fn permissions(config: &mut AppConfig) -> &mut PermissionsConfig {
    config.permissions.get_or_insert_with(PermissionsConfig::default)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err("Value must be 'true' or 'false'".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(key: &str, value: &str) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::empty();
        apply_value(&mut config, key, value)?;
        Ok(config)
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("No"), Ok(false));
        assert_eq!(parse_bool("1"), Ok(true));
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn lens_is_normalized() {
        let config = set("camera.lens", "rear").unwrap();
        assert_eq!(read_value(&config, "camera.lens").as_deref(), Some("back"));
    }

    #[test]
    fn invalid_flash_is_rejected() {
        assert!(matches!(
            set("camera.flash", "strobe"),
            Err(ConfigError::ValidationError { key, .. }) if key == "camera.flash"
        ));
    }

    #[test]
    fn intervals_are_validated_and_normalized() {
        let config = set("location.stale_after", "90s").unwrap();
        assert_eq!(read_value(&config, "location.stale_after").as_deref(), Some("1m30s"));
        assert!(set("location.interval", "soon").is_err());
    }

    #[test]
    fn jpeg_quality_range() {
        assert!(set("jpeg_quality", "100").is_ok());
        assert!(set("jpeg_quality", "0").is_err());
        assert!(set("jpeg_quality", "101").is_err());
    }

    #[test]
    fn min_distance_must_be_non_negative() {
        assert!(set("location.min_distance", "12.5").is_ok());
        assert!(set("location.min_distance", "-1").is_err());
    }

    #[test]
    fn geocoder_url_must_be_http() {
        assert!(set("location.geocoder_url", "http://localhost:8080").is_ok());
        assert!(set("location.geocoder_url", "localhost").is_err());
    }

    #[test]
    fn booleans_round_trip() {
        let config = set("overlay.enabled", "no").unwrap();
        assert_eq!(read_value(&config, "overlay.enabled").as_deref(), Some("false"));
        assert!(set("permissions.location", "perhaps").is_err());
    }

    #[test]
    fn every_key_is_readable() {
        let config = AppConfig::defaults();
        for key in VALID_CONFIG_KEYS {
            let _ = read_value(&config, key);
        }
        assert_eq!(read_value(&config, "jpeg_quality").as_deref(), Some("95"));
        assert_eq!(read_value(&config, "output_dir"), None);
    }
}
