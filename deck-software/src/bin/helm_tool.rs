//! Shore-side CLI for the sailboat control daemon.
//!
//! Writes the same runtime files the GUI writes, so the boat can be
//! commanded from a shell over ssh:
//! - `status`: Show navigation state and live telemetry
//! - `nav`: Switch the navigation state
//! - `target`: Set the target point
//! - `manual`: Take or release manual control of rudder and sail
//! - `heading-mode` / `sail-mode`: Select the helm controllers
//! - `tune`: Adjust the optimizer tunables

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use deck_software::navigation::NavState;
use deck_software::paths::{read_value, write_value, PathLayout};
use helm::{HeadingMode, SailMode};

/// Sailboat shore control tool
#[derive(Parser, Debug)]
#[command(name = "helm-tool")]
#[command(about = "Command the sailboat control daemon through its runtime files")]
#[command(version)]
struct Args {
    /// Runtime directory shared with the daemon
    #[arg(long, global = true, default_value = "/tmp/sailboat")]
    runtime_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show navigation state and live telemetry
    Status,

    /// Switch the navigation state (0 idle, 1 sail, 3 hold, 4 route)
    Nav {
        /// Navigation state code
        code: i32,
    },

    /// Set the target point
    Target {
        /// Target latitude, degrees
        lat: f64,
        /// Target longitude, degrees
        lon: f64,
    },

    /// Take manual control of rudder and sail, or release it
    Manual {
        /// Rudder angle, degrees
        #[arg(long)]
        rudder: Option<i32>,
        /// Sail actuator position, ticks
        #[arg(long)]
        sail: Option<i32>,
        /// Release manual control
        #[arg(long)]
        off: bool,
    },

    /// Select the heading controller (1 guidance .. 6 heel climb)
    HeadingMode {
        /// Heading mode code
        code: i32,
    },

    /// Select the sail controller (1 manual, 2 climb, 3 geometric)
    SailMode {
        /// Sail mode code
        code: i32,
    },

    /// Adjust the optimizer tunables
    Tune {
        /// Seconds between optimizer steps
        #[arg(long)]
        steptime: Option<u32>,
        /// Heading climb step size, degrees
        #[arg(long)]
        stepsize: Option<f64>,
        /// Target speed-vs-heading slope for the slope climber
        #[arg(long)]
        slope: Option<f64>,
        /// Reference bearing for velocity-made-good, degrees
        #[arg(long)]
        vmg_bearing: Option<f64>,
        /// Step sequence direction (negative steps to port)
        #[arg(long)]
        direction: Option<i32>,
        /// Heading climber seed, degrees
        #[arg(long)]
        seed: Option<f64>,
        /// Fixed bearing to steer, degrees
        #[arg(long)]
        bearing: Option<f64>,
        /// Sail climb step size, degrees of boom angle
        #[arg(long)]
        sail_step: Option<f64>,
        /// Manual sail position, ticks
        #[arg(long)]
        sail_pos: Option<i32>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let paths = PathLayout {
        runtime_dir: args.runtime_dir,
        ..PathLayout::default()
    };

    match args.command {
        Command::Status => status(&paths),
        Command::Nav { code } => {
            let Some(state) = NavState::from_code(code) else {
                bail!("unknown navigation state code {code}");
            };
            write_value(&paths.runtime("Navigation_System"), code)?;
            println!("navigation -> {state:?} ({code})");
            Ok(())
        }
        Command::Target { lat, lon } => {
            write_value(&paths.runtime("Point_End_Lat"), format!("{lat:.6}"))?;
            write_value(&paths.runtime("Point_End_Lon"), format!("{lon:.6}"))?;
            println!("target -> {lat:.6}, {lon:.6}");
            Ok(())
        }
        Command::Manual { rudder, sail, off } => {
            if off {
                write_value(&paths.runtime("Manual_Control"), 0)?;
                println!("manual control released");
                return Ok(());
            }
            if let Some(angle) = rudder {
                write_value(&paths.runtime("Manual_Control_Rudder"), angle)?;
            }
            if let Some(ticks) = sail {
                write_value(&paths.runtime("Manual_Control_Sail"), ticks)?;
            }
            write_value(&paths.runtime("Manual_Control"), 1)?;
            println!("manual control taken (rudder {rudder:?}, sail {sail:?})");
            Ok(())
        }
        Command::HeadingMode { code } => {
            let mode = HeadingMode::try_from(code)?;
            write_value(&paths.runtime("ext_heading_state"), code)?;
            println!("heading mode -> {mode:?} ({code})");
            Ok(())
        }
        Command::SailMode { code } => {
            let mode = SailMode::try_from(code)?;
            write_value(&paths.runtime("ext_sail_state"), code)?;
            println!("sail mode -> {mode:?} ({code})");
            Ok(())
        }
        Command::Tune {
            steptime,
            stepsize,
            slope,
            vmg_bearing,
            direction,
            seed,
            bearing,
            sail_step,
            sail_pos,
        } => {
            write_tunable(&paths, "ext_steptime", steptime)?;
            write_tunable(&paths, "ext_stepsize", stepsize)?;
            write_tunable(&paths, "ext_des_slope", slope)?;
            write_tunable(&paths, "ext_vLOS", vmg_bearing)?;
            write_tunable(&paths, "ext_DIR", direction)?;
            write_tunable(&paths, "ext_DIR_init", seed)?;
            write_tunable(&paths, "ext_des_heading", bearing)?;
            write_tunable(&paths, "ext_sail_stepsize", sail_step)?;
            write_tunable(&paths, "ext_act_pos", sail_pos)?;
            Ok(())
        }
    }
}

fn write_tunable<T: std::fmt::Display>(
    paths: &PathLayout,
    name: &str,
    value: Option<T>,
) -> Result<()> {
    if let Some(value) = value {
        write_value(&paths.runtime(name), &value)?;
        println!("{name} -> {value}");
    }
    Ok(())
}

fn status(paths: &PathLayout) -> Result<()> {
    let nav = read_value::<i32>(&paths.runtime("Navigation_System"))
        .and_then(NavState::from_code)
        .map(|state| format!("{state:?}"))
        .unwrap_or_else(|| "?".to_string());
    println!("navigation:       {nav}");
    println!(
        "manual control:   {}",
        show::<i32>(paths, "Manual_Control")
    );
    println!("guidance heading: {}", show::<f64>(paths, "Guidance_Heading"));
    println!("mean wind:        {}", show::<i32>(paths, "mean_wind"));
    println!("sail duty:        {}", show::<f64>(paths, "duty"));
    println!(
        "target:           {}, {}",
        show::<f64>(paths, "Point_End_Lat"),
        show::<f64>(paths, "Point_End_Lon")
    );
    println!(
        "rudder cmd/fb:    {} / {}",
        show::<i32>(paths, "Navigation_System_Rudder"),
        show::<i32>(paths, "Rudder_Feedback")
    );
    println!(
        "sail cmd/fb:      {} / {}",
        show::<i32>(paths, "Navigation_System_Sail"),
        show::<i32>(paths, "Sail_Feedback")
    );
    Ok(())
}

fn show<T: std::str::FromStr + std::fmt::Display>(paths: &PathLayout, name: &str) -> String {
    read_value::<T>(&paths.runtime(name))
        .map(|value| value.to_string())
        .unwrap_or_else(|| "?".to_string())
}
