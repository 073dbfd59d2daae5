//! GeoCam CLI entry point

use std::process::ExitCode;

use clap::Parser;

use geocam::cli::{
    app::{load_merged_config, run_capture, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{CaptureArgs, Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    CaptureOptions,
};
use geocam::domain::capture::{FlashMode, LensFacing};
use geocam::domain::config::{AppConfig, CameraConfig, OverlayConfig};
use geocam::domain::interval::Interval;
use geocam::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut presenter = Presenter::new();

    let args = match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Commands::Capture(args) => args,
    };

    let wait = match args.wait.parse::<Interval>() {
        Ok(interval) => interval,
        Err(e) => {
            presenter.error(&format!("Invalid wait: {}", e));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };
    let position = match args.position().transpose() {
        Ok(position) => position,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    // Merge config
    let config = load_merged_config(cli_config(&args)).await;

    let options = CaptureOptions {
        source: args.source,
        position,
        address: args.address,
        geocoder_url: if args.no_geocode {
            None
        } else {
            Some(config.geocoder_url_or_default().to_string())
        },
        lens: config.lens_or_default(),
        flash: config.flash_or_default(),
        output_dir: config.output_dir_or_default(),
        overlay: config.overlay_enabled_or_default(),
        font_path: config.font_path().map(str::to_string),
        jpeg_quality: config.jpeg_quality_or_default(),
        location_interval: config.location_interval_or_default(),
        min_distance: config.min_distance_or_default(),
        stale_after: config.stale_after_or_default(),
        wait,
        media_index_command: config.media_index_command().map(str::to_string),
        microphone: config.microphone_granted_or_default(),
        location: config.location_granted_or_default(),
    };

    run_capture(options, &mut presenter).await
}

/// Build the CLI layer of the config from capture flags
fn cli_config(args: &CaptureArgs) -> AppConfig {
    let camera = (args.lens.is_some() || args.flash.is_some()).then(|| CameraConfig {
        lens: args.lens.map(|l| LensFacing::from(l).to_string()),
        flash: args.flash.map(|f| FlashMode::from(f).to_string()),
    });

    AppConfig {
        output_dir: args
            .output_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().into_owned()),
        camera,
        overlay: args.no_overlay.then(|| OverlayConfig {
            enabled: Some(false),
            font_path: None,
        }),
        ..Default::default()
    }
}

/// Initialize logging on stderr.
/// RUST_LOG wins; otherwise `-v` raises the level from warn.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}
