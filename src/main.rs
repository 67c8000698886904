//! DrishtiView - live point-cloud viewer for 2D lidars
//!
//! Usage:
//!
//! - `drishti-view` (uses `./drishti.toml` if present, else defaults)
//! - `drishti-view --config <path>`
//! - `drishti-view --port /dev/ttyUSB0 --frames 100 --null-sink`
//!
//! Frames are written to the snapshot PNG; type ESC (then Enter) or press
//! Ctrl-C to stop.

use clap::Parser;
use drishti_view::config::AppConfig;
use drishti_view::core::sink::RenderSink;
use drishti_view::devices::create_source;
use drishti_view::devices::ports::{
    FirstPortSelector, IndexPortSelector, discover_ports, resolve_port,
};
use drishti_view::error::{Error, Result};
use drishti_view::render::sinks::{NullSink, SnapshotSink, spawn_stdin_keys};
use drishti_view::{AcquisitionLoop, EXIT_FAILURE, Failure, exit_code};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser, Debug)]
#[command(name = "drishti-view", version, about = "Live 2D lidar point-cloud viewer")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port, skips discovery
    #[arg(short, long)]
    port: Option<String>,

    /// Pick the Nth discovered port when several are present
    #[arg(long)]
    port_index: Option<usize>,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    frames: Option<u64>,

    /// Snapshot PNG path (overrides config)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Discard frames instead of writing snapshots
    #[arg(long)]
    null_sink: bool,

    /// Do not read key presses from stdin
    #[arg(long)]
    no_input: bool,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None if Path::new("drishti.toml").exists() => AppConfig::from_file("drishti.toml")?,
        None => AppConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Fill in the serial port: CLI, then config, then discovery + selector
fn resolve_serial_port(cli: &Cli, config: &mut AppConfig) -> Result<()> {
    if let Some(port) = &cli.port {
        config.device.options.serial_port = port.clone();
        return Ok(());
    }
    if !config.device.options.serial_port.is_empty() {
        return Ok(());
    }

    let candidates = discover_ports().unwrap_or_else(|e| {
        warn!("Serial port discovery failed: {}", e);
        Vec::new()
    });

    if candidates.is_empty() && config.device.kind == "simulated" {
        config.device.options.serial_port = "sim://room".to_string();
        return Ok(());
    }

    let port = match cli.port_index {
        Some(index) => resolve_port(&candidates, &mut IndexPortSelector(index))?,
        None => resolve_port(&candidates, &mut FirstPortSelector)?,
    };
    config.device.options.serial_port = port;
    Ok(())
}

fn build_sink(cli: &Cli, config: &AppConfig) -> Result<Box<dyn RenderSink>> {
    if cli.null_sink {
        return Ok(Box::new(NullSink::new()));
    }
    let path = cli
        .snapshot
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.display.snapshot_path));
    let keys = if cli.no_input {
        None
    } else {
        Some(spawn_stdin_keys()?)
    };
    info!("Writing snapshots to {}", path.display());
    Ok(Box::new(SnapshotSink::new(
        path,
        config.display.snapshot_every,
        keys,
    )))
}

fn run(cli: &Cli, mut config: AppConfig) -> std::result::Result<(), Failure> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Failure::Setup(Error::Other(format!("Error setting Ctrl-C handler: {}", e))))?;

    resolve_serial_port(cli, &mut config).map_err(Failure::DeviceStart)?;
    info!(
        "Device: {} on {} @ {} baud",
        config.device.kind, config.device.options.serial_port, config.device.options.baud_rate
    );

    let source = create_source(&config).map_err(Failure::DeviceStart)?;
    let sink = build_sink(cli, &config).map_err(Failure::Setup)?;
    let render = config.render_settings().map_err(Failure::Setup)?;
    let mut settings = config.loop_settings();
    settings.max_frames = cli.frames;

    let mut acquisition = AcquisitionLoop::new(
        source,
        sink,
        config.device.options.clone(),
        render,
        settings,
        running,
    );

    acquisition.start().map_err(Failure::DeviceStart)?;
    info!("Starting lidar visualization. Press ESC to exit.");

    let stats = acquisition.run().map_err(Failure::Runtime)?;
    info!(
        "Session finished: {} frames, {} failed fetches",
        stats.frames, stats.failed_fetches
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .init();
            error!("Invalid configuration: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    info!("DrishtiView v{} starting...", env!("CARGO_PKG_VERSION"));

    let outcome = run(&cli, config);
    match &outcome {
        Ok(()) => {}
        Err(Failure::DeviceStart(e)) => error!("Fail to start: {}", e),
        Err(failure) => error!("{}", failure.error()),
    }
    ExitCode::from(exit_code(&outcome))
}
