//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::domain::capture::{FlashMode, LensFacing};
use crate::domain::interval::Interval;
use crate::domain::location::Coordinates;

/// GeoCam - geotagged photo capture
#[derive(Parser, Debug)]
#[command(name = "geocam")]
#[command(version)]
#[command(about = "Capture photos with a burned-in location and time overlay")]
#[command(long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Take one photo through the capture pipeline
    Capture(CaptureArgs),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `geocam capture`
#[derive(Args, Debug, Clone, Default)]
pub struct CaptureArgs {
    /// Image the virtual camera "captures" (default: generated test pattern)
    #[arg(short = 's', long, value_name = "FILE")]
    pub source: Option<PathBuf>,

    /// Latitude of the fixed location, in signed degrees
    #[arg(long, value_name = "DEG", allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude of the fixed location, in signed degrees
    #[arg(long, value_name = "DEG", allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Use this place description instead of reverse geocoding
    #[arg(short = 'a', long, value_name = "TEXT", conflicts_with = "no_geocode")]
    pub address: Option<String>,

    /// Skip reverse geocoding (the overlay shows placeholders)
    #[arg(long)]
    pub no_geocode: bool,

    /// Camera lens
    #[arg(short = 'l', long, value_name = "LENS")]
    pub lens: Option<LensArg>,

    /// Flash mode
    #[arg(short = 'f', long, value_name = "MODE")]
    pub flash: Option<FlashArg>,

    /// Output directory (overrides config)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Save the photo without the location overlay
    #[arg(long)]
    pub no_overlay: bool,

    /// How long to wait for a location fix and its address (e.g., 3s)
    #[arg(short = 'w', long, value_name = "TIME", default_value = "5s")]
    pub wait: String,
}

impl CaptureArgs {
    /// Fixed position from `--lat`/`--lon`, if given
    pub fn position(&self) -> Option<Result<Coordinates, String>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon).map_err(|e| e.to_string())),
            _ => None,
        }
    }
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Lens argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LensArg {
    Back,
    Front,
}

impl From<LensArg> for LensFacing {
    fn from(arg: LensArg) -> Self {
        match arg {
            LensArg::Back => LensFacing::Back,
            LensArg::Front => LensFacing::Front,
        }
    }
}

/// Flash argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FlashArg {
    Off,
    On,
    Auto,
}

impl From<FlashArg> for FlashMode {
    fn from(arg: FlashArg) -> Self {
        match arg {
            FlashArg::Off => FlashMode::Off,
            FlashArg::On => FlashMode::On,
            FlashArg::Auto => FlashMode::Auto,
        }
    }
}

/// Parsed capture options (config merged with flags)
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub source: Option<PathBuf>,
    pub position: Option<Coordinates>,
    pub address: Option<String>,
    /// Reverse geocoder base URL; `None` disables geocoding
    pub geocoder_url: Option<String>,
    pub lens: LensFacing,
    pub flash: FlashMode,
    pub output_dir: PathBuf,
    pub overlay: bool,
    pub font_path: Option<String>,
    pub jpeg_quality: u8,
    pub location_interval: Interval,
    pub min_distance: f32,
    pub stale_after: Interval,
    pub wait: Interval,
    pub media_index_command: Option<String>,
    pub microphone: bool,
    pub location: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "output_dir",
    "jpeg_quality",
    "camera.lens",
    "camera.flash",
    "location.interval",
    "location.min_distance",
    "location.stale_after",
    "location.geocoder_url",
    "overlay.enabled",
    "overlay.font_path",
    "media_index.command",
    "permissions.microphone",
    "permissions.location",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn capture(args: &[&str]) -> CaptureArgs {
        let cli = Cli::parse_from(["geocam", "capture"].iter().chain(args));
        match cli.command {
            Commands::Capture(args) => args,
            other => panic!("Expected capture command, got {:?}", other),
        }
    }

    #[test]
    fn capture_parses_defaults() {
        let args = capture(&[]);
        assert!(args.source.is_none());
        assert!(args.position().is_none());
        assert!(args.address.is_none());
        assert!(!args.no_geocode);
        assert!(!args.no_overlay);
        assert_eq!(args.wait, "5s");
    }

    #[test]
    fn capture_parses_negative_coordinates() {
        let args = capture(&["--lat", "-33.8688", "--lon", "151.2093"]);
        let position = args.position().unwrap().unwrap();
        assert_eq!(position.latitude(), -33.8688);
        assert_eq!(position.longitude(), 151.2093);
    }

    #[test]
    fn capture_rejects_out_of_range_position() {
        let args = capture(&["--lat", "91", "--lon", "0"]);
        assert!(args.position().unwrap().is_err());
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["geocam", "capture", "--lat", "10"]).is_err());
    }

    #[test]
    fn address_conflicts_with_no_geocode() {
        assert!(Cli::try_parse_from([
            "geocam",
            "capture",
            "--address",
            "Home",
            "--no-geocode"
        ])
        .is_err());
    }

    #[test]
    fn capture_parses_camera_flags() {
        let args = capture(&["-l", "front", "-f", "auto", "-o", "/tmp/out"]);
        assert_eq!(args.lens.map(LensFacing::from), Some(LensFacing::Front));
        assert_eq!(args.flash.map(FlashMode::from), Some(FlashMode::Auto));
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["geocam", "capture", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["geocam", "config", "set", "camera.lens", "front"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "camera.lens");
            assert_eq!(value, "front");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("output_dir"));
        assert!(is_valid_config_key("location.geocoder_url"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
