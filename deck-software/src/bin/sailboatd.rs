//! Control daemon for the autonomous sailboat.
//!
//! Runs the helm at a fixed tick rate against the file-backed sensor and
//! actuator interfaces. Shore tooling steers it entirely through the
//! runtime directory; see `helm-tool` for the matching CLI.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use deck_software::{PathLayout, Runtime};
use helm::HelmConfig;
use log::info;

/// Autonomous sailboat control daemon
#[derive(Parser, Debug)]
#[command(name = "sailboatd")]
#[command(about = "Runs the sailboat helm against the file-backed deck interfaces")]
#[command(version)]
struct Args {
    /// Directory of control and telemetry files shared with shore tooling
    #[arg(long, default_value = "/tmp/sailboat")]
    runtime_dir: PathBuf,

    /// Directory of sensor feed files
    #[arg(long, default_value = "/tmp/u200")]
    sensor_dir: PathBuf,

    /// Voyage log directory
    #[arg(long, default_value = "sailboat-log")]
    log_dir: PathBuf,

    /// Helm configuration file (JSON); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Control tick period in milliseconds
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => HelmConfig::default(),
    };

    let paths = PathLayout::new(args.runtime_dir, args.sensor_dir, args.log_dir);
    let mut runtime = Runtime::new(config, paths, Duration::from_millis(args.tick_ms))?;
    info!("sailboatd starting, tick every {} ms", args.tick_ms);
    runtime.run()
}
