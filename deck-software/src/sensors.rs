//! Weather-station and actuator-feedback reads.

use std::fs;

use helm::{SensorError, SensorSnapshot, SensorSource};

use crate::paths::{read_value, PathLayout};

/// The IMU reports roll in raw sensor units; this converts it to degrees.
const ROLL_SCALE: f64 = 3.26;

/// Sensor feeds read from the instrument files.
///
/// Each optional feed keeps its previous value when its file is missing or
/// holds something unparseable; the drivers rewrite the files on their own
/// cadence and a dropped sample is routine. The rate-of-turn feed doubles
/// as the liveness check for the whole instrument stack and fails the read
/// instead.
pub struct FileSensorSource {
    paths: PathLayout,
    last: SensorSnapshot,
}

impl FileSensorSource {
    pub fn new(paths: PathLayout) -> Self {
        Self {
            paths,
            last: SensorSnapshot::default(),
        }
    }

    /// Most recent snapshot, without touching the files.
    pub fn last(&self) -> SensorSnapshot {
        self.last
    }

    /// Reduced read used while the autopilot is off: position, heading and
    /// wind keep the log and shore display alive without insisting on the
    /// full instrument stack.
    pub fn read_essential(&mut self) -> SensorSnapshot {
        self.last.heading_deg = self.optional("Heading", self.last.heading_deg);
        self.last.position.lat = self.optional("Latitude", self.last.position.lat);
        self.last.position.lon = self.optional("Longitude", self.last.position.lon);
        self.last.wind_speed_ms = self.optional("Wind_Speed", self.last.wind_speed_ms);
        self.last.wind_angle_deg = self.optional("Wind_Angle", self.last.wind_angle_deg);
        self.read_feedback();
        self.last
    }

    fn optional(&self, name: &str, previous: f64) -> f64 {
        read_value(&self.paths.sensor(name)).unwrap_or(previous)
    }

    /// Actuator feedback lives with the control files, not the instrument
    /// feeds; the drive processes publish it there.
    fn read_feedback(&mut self) {
        if let Some(ticks) = read_value(&self.paths.runtime("Sail_Feedback")) {
            self.last.sail_feedback_ticks = ticks;
        }
        if let Some(angle) = read_value(&self.paths.runtime("Rudder_Feedback")) {
            self.last.rudder_feedback_deg = angle;
        }
    }
}

impl SensorSource for FileSensorSource {
    fn read_snapshot(&mut self) -> Result<SensorSnapshot, SensorError> {
        let text = fs::read_to_string(self.paths.sensor("Rate"))
            .map_err(|source| SensorError::MandatoryFeed {
                name: "Rate",
                source,
            })?;
        self.last.rate_deg_s = text.trim().parse().map_err(|_| SensorError::Malformed {
            name: "Rate",
            value: text.trim().to_string(),
        })?;

        self.last.heading_deg = self.optional("Heading", self.last.heading_deg);
        self.last.pitch_deg = self.optional("Pitch", self.last.pitch_deg);
        if let Some(roll) = read_value::<f64>(&self.paths.sensor("Roll")) {
            self.last.roll_deg = roll * ROLL_SCALE;
        }
        self.last.position.lat = self.optional("Latitude", self.last.position.lat);
        self.last.position.lon = self.optional("Longitude", self.last.position.lon);
        self.last.cog_deg = self.optional("COG", self.last.cog_deg);
        self.last.sog_ms = self.optional("SOG", self.last.sog_ms);
        self.last.wind_speed_ms = self.optional("Wind_Speed", self.last.wind_speed_ms);
        self.last.wind_angle_deg = self.optional("Wind_Angle", self.last.wind_angle_deg);
        self.read_feedback();
        Ok(self.last)
    }
}
