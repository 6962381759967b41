//! Actuator command and telemetry writes.

use std::io;

use helm::{ActuatorError, ActuatorSink, GeoPoint, HelmCommand};

use crate::paths::{write_value, PathLayout};

/// Writes rudder and sail commands where the drive processes pick them up.
///
/// Both commands are absolute positions. The drives seek them on their own
/// time and report progress through the feedback files.
pub struct FileActuatorSink {
    paths: PathLayout,
}

impl FileActuatorSink {
    pub fn new(paths: PathLayout) -> Self {
        Self { paths }
    }
}

impl ActuatorSink for FileActuatorSink {
    fn set_rudder(&mut self, angle_deg: i32) -> Result<(), ActuatorError> {
        write_value(&self.paths.runtime("Navigation_System_Rudder"), angle_deg).map_err(
            |source| ActuatorError::Write {
                name: "rudder",
                source,
            },
        )
    }

    fn set_sail(&mut self, position_ticks: i32) -> Result<(), ActuatorError> {
        write_value(&self.paths.runtime("Navigation_System_Sail"), position_ticks).map_err(
            |source| ActuatorError::Write {
                name: "sail",
                source,
            },
        )
    }
}

/// Publishes one helm tick's telemetry for the shore display.
pub struct TelemetryWriter {
    paths: PathLayout,
}

impl TelemetryWriter {
    pub fn new(paths: PathLayout) -> Self {
        Self { paths }
    }

    /// Write the display files the shore side polls. The corridor corners
    /// are only rewritten on ticks where waypoint guidance produced them,
    /// so the overlay keeps showing the last corridor during a maneuver.
    pub fn publish(&self, command: &HelmCommand) -> io::Result<()> {
        write_value(
            &self.paths.runtime("Guidance_Heading"),
            format!("{:4.1}", command.target_bearing_deg),
        )?;
        write_value(
            &self.paths.runtime("mean_wind"),
            command.mean_wind_deg as i32,
        )?;
        write_value(&self.paths.runtime("duty"), format!("{:.2}", command.duty))?;
        if let Some(corners) = &command.boundaries {
            write_value(&self.paths.runtime("boundaries"), format_boundaries(corners))?;
        }
        Ok(())
    }
}

/// Corner points as `lat;lon` pairs, the format the chart overlay parses.
fn format_boundaries(corners: &[GeoPoint; 4]) -> String {
    let mut out: String = corners
        .iter()
        .map(|corner| format!("{:.6};{:.6},", corner.lat, corner.lon))
        .collect();
    out.push('\n');
    out
}
