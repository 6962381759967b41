//! Sensor and actuator boundary types.
//!
//! The helm itself never touches a file, socket, or device: it consumes one
//! [`SensorSnapshot`] per tick and produces one [`HelmCommand`]. The two
//! traits here are the only seam between the control laws and whatever
//! transport the deck process uses; tests drive the helm with in-memory
//! implementations.

use thiserror::Error;

use crate::frame::GeoPoint;

/// All sensor values the helm consumes, captured once per tick.
///
/// A snapshot is a consistent set: the control loop must never observe two
/// different values of the same feed within one tick, or the wind-frame
/// transform would desynchronize from the guidance decision built on it.
/// Angles follow the compass convention (degrees clockwise from north)
/// unless noted otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    /// Boat heading in degrees.
    pub heading_deg: f64,
    /// Rate of turn in degrees per second. This is the one mandatory feed;
    /// sources fail the whole read when it is lost.
    pub rate_deg_s: f64,
    /// Pitch in degrees, bow-up positive.
    pub pitch_deg: f64,
    /// Roll in degrees, starboard-down positive.
    pub roll_deg: f64,
    /// Current position.
    pub position: GeoPoint,
    /// Course over ground in degrees.
    pub cog_deg: f64,
    /// Speed over ground in meters per second.
    pub sog_ms: f64,
    /// Wind speed in meters per second.
    pub wind_speed_ms: f64,
    /// Direction the wind blows from, degrees.
    pub wind_angle_deg: f64,
    /// Sail actuator position feedback in ticks.
    pub sail_feedback_ticks: i32,
    /// Rudder position feedback in degrees.
    pub rudder_feedback_deg: i32,
}

/// One tick's worth of actuator commands and telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmCommand {
    /// Commanded rudder angle in degrees, clamped to the mechanical limit.
    pub rudder_deg: i32,
    /// Sail actuator write in ticks. None while the duty guard is
    /// blocking motion; the desired position is still tracked in
    /// `sail_target_ticks`.
    pub sail_ticks: Option<i32>,
    /// The sail position the helm currently wants, before the duty gate.
    pub sail_target_ticks: i32,
    /// Bearing the rudder is steering toward, degrees.
    pub target_bearing_deg: f64,
    /// Mean wind direction over the averaging window, degrees.
    pub mean_wind_deg: f64,
    /// Sail actuator duty ratio over the observation window.
    pub duty: f64,
    /// Tacking-corridor corner points for the shore display, present only
    /// on ticks where waypoint guidance ran.
    pub boundaries: Option<[GeoPoint; 4]>,
}

/// Failure to produce a sensor snapshot.
///
/// Individual feeds dropping out is not an error; sources hold the previous
/// value and try again next tick. Only the mandatory rate-of-turn feed is
/// load-bearing enough to fail the read.
#[derive(Debug, Error)]
pub enum SensorError {
    /// A feed the helm cannot run without could not be read at all.
    #[error("mandatory sensor feed '{name}' unavailable: {source}")]
    MandatoryFeed {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
    /// A feed the helm cannot run without produced an unparseable sample.
    #[error("mandatory sensor feed '{name}' returned malformed sample {value:?}")]
    Malformed { name: &'static str, value: String },
}

/// Failure to deliver an actuator command.
#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("failed to command {name}: {source}")]
    Write {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Source of one sensor snapshot per tick.
///
/// # Caller Responsibilities
///
/// The control loop calls this exactly once per tick and reuses the
/// returned snapshot for every computation in that tick. Implementations
/// may poll, cache, or subscribe however they like, as long as one call
/// returns an internally consistent set of values.
pub trait SensorSource {
    /// Read the current snapshot.
    ///
    /// Implementations keep the previous value for any individual feed
    /// that cannot be read this tick; only loss of the mandatory
    /// rate-of-turn feed fails the read.
    fn read_snapshot(&mut self) -> Result<SensorSnapshot, SensorError>;
}

/// Sink for actuator position commands.
///
/// Writes are best-effort absolute positions with no acknowledgement or
/// completion signal; the drivers seek the commanded position on their own
/// time and the next snapshot's feedback shows how far they got.
pub trait ActuatorSink {
    /// Command the rudder angle in degrees.
    fn set_rudder(&mut self, angle_deg: i32) -> Result<(), ActuatorError>;

    /// Command the sail actuator position in ticks.
    fn set_sail(&mut self, position_ticks: i32) -> Result<(), ActuatorError>;
}
