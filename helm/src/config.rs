//! Static configuration and live tunables for the helm.
//!
//! `HelmConfig` covers everything fixed at startup: zone geometry, gains,
//! rig dimensions, actuator limits. Defaults match the boat the controllers
//! were tuned on; deployments override individual fields from a JSON file.
//! `Tunables` holds the handful of values an operator may change while the
//! loop is running (optimizer step sizes, seeds, reference bearings).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::PlanarScale;

/// Rejection of a request the helm cannot act on.
#[derive(Debug, Error)]
pub enum HelmError {
    /// A numeric mode code from the wire matched no controller.
    #[error("unknown {kind} mode code {code}")]
    InvalidMode { kind: &'static str, code: i32 },
}

/// Active heading controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingMode {
    /// Waypoint guidance with tack/jibe management.
    Guidance,
    /// Hill climb on the speed-vs-heading slope (tracks the no-go edge).
    SlopeClimb,
    /// Hill climb on velocity made good toward a reference bearing.
    VmgClimb,
    /// Scripted sweep of wind-relative headings for polar measurements.
    StepSequence,
    /// Hold a fixed compass bearing.
    FixedBearing,
    /// Hill climb on mean heel magnitude.
    HeelClimb,
}

impl Default for HeadingMode {
    fn default() -> Self {
        Self::Guidance
    }
}

impl TryFrom<i32> for HeadingMode {
    type Error = HelmError;

    /// Map a numeric mode code from the wire onto a controller.
    fn try_from(code: i32) -> Result<Self, HelmError> {
        match code {
            1 => Ok(HeadingMode::Guidance),
            2 => Ok(HeadingMode::SlopeClimb),
            3 => Ok(HeadingMode::VmgClimb),
            4 => Ok(HeadingMode::StepSequence),
            5 => Ok(HeadingMode::FixedBearing),
            6 => Ok(HeadingMode::HeelClimb),
            _ => Err(HelmError::InvalidMode {
                kind: "heading",
                code,
            }),
        }
    }
}

impl HeadingMode {
    /// Numeric mode code used on the wire.
    pub fn code(self) -> i32 {
        match self {
            HeadingMode::Guidance => 1,
            HeadingMode::SlopeClimb => 2,
            HeadingMode::VmgClimb => 3,
            HeadingMode::StepSequence => 4,
            HeadingMode::FixedBearing => 5,
            HeadingMode::HeelClimb => 6,
        }
    }
}

/// Active sail controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SailMode {
    /// Pass the externally seeded actuator position straight through.
    Manual,
    /// Hill climb on boom angle.
    Climb,
    /// Geometric sheet law from the boat-wind angle.
    Geometric,
}

impl Default for SailMode {
    fn default() -> Self {
        Self::Geometric
    }
}

impl TryFrom<i32> for SailMode {
    type Error = HelmError;

    /// Map a numeric mode code from the wire onto a controller.
    fn try_from(code: i32) -> Result<Self, HelmError> {
        match code {
            1 => Ok(SailMode::Manual),
            2 => Ok(SailMode::Climb),
            3 => Ok(SailMode::Geometric),
            _ => Err(HelmError::InvalidMode { kind: "sail", code }),
        }
    }
}

impl SailMode {
    /// Numeric mode code used on the wire.
    pub fn code(self) -> i32 {
        match self {
            SailMode::Manual => 1,
            SailMode::Climb => 2,
            SailMode::Geometric => 3,
        }
    }
}

/// Zone geometry for the guidance engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Half-angle of the upwind no-go zone, degrees from the wind axis.
    pub nogo_deg: f64,
    /// Half-angle of the downwind zone, degrees from the dead-downwind axis.
    pub downwind_deg: f64,
    /// Width of the tacking corridor around the direct line, meters.
    pub tacking_range_m: f64,
    /// Extra margin added to each side of the no-go zone when testing
    /// whether the line of sight falls inside it, degrees.
    pub zone_margin_deg: f64,
    /// Half-width of the band around a zone boundary inside which the
    /// current course counts as already pinned to that boundary, degrees.
    pub pin_tolerance_deg: f64,
    /// Distance to the target below which the leg counts as reached, meters.
    pub arrival_radius_m: f64,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            nogo_deg: 55.0,
            downwind_deg: 30.0,
            tacking_range_m: 100.0,
            zone_margin_deg: 20.0,
            pin_tolerance_deg: 5.0,
            arrival_radius_m: 5.0,
        }
    }
}

/// Maneuver classification and jibe sequencing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManeuverConfig {
    /// Minimum speed over ground for tacking, m/s. Below it an upwind
    /// course reversal is executed as a jibe instead.
    pub min_tack_speed: f64,
    /// Heading convergence cone for advancing a jibe phase, degrees.
    pub angle_lim_deg: f64,
    /// Sail feedback above this counts as "sail out", ticks.
    pub sail_out_ticks: i32,
    /// Sail feedback below this counts as "sail in", ticks.
    pub sail_in_ticks: i32,
}

impl Default for ManeuverConfig {
    fn default() -> Self {
        Self {
            min_tack_speed: 0.5,
            angle_lim_deg: 5.0,
            sail_out_ticks: 300,
            sail_in_ticks: 20,
        }
    }
}

/// Rudder proportional controller parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RudderConfig {
    /// Proportional gain on the wrapped heading error.
    pub gain_p: f64,
    /// Integral gain. Zero leaves the integrator inert.
    pub gain_i: f64,
    /// Clamp on the integrator accumulator, degrees.
    pub integrator_max: f64,
    /// Mechanical rudder limit, degrees.
    pub max_angle_deg: i32,
}

impl Default for RudderConfig {
    fn default() -> Self {
        Self {
            gain_p: -1.0,
            gain_i: 0.0,
            integrator_max: 20.0,
            max_angle_deg: 35,
        }
    }
}

/// Sail rig geometry and trim-law parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SailConfig {
    /// Boom length, meters.
    pub boom_length_m: f64,
    /// Horizontal distance between the sheet hole and the mast, meters.
    pub sheet_hole_dist_m: f64,
    /// Vertical distance between the sheet hole and the boom, meters.
    pub sheet_height_m: f64,
    /// Actuator stroke length, meters.
    pub stroke_length_m: f64,
    /// Mechanical advantage of the sheet tackle.
    pub sheet_purchase: f64,
    /// Actuator travel, ticks.
    pub act_max: i32,
    /// Fully eased sheet angle, radians.
    pub max_sheet_rad: f64,
    /// Boat-wind angle where the linear ramp ends and the sheet stays
    /// fully eased, degrees.
    pub ramp_end_deg: f64,
    /// Boat-wind angle beyond which the sheet is hauled back in, degrees.
    pub flat_end_deg: f64,
    /// Roll magnitude that triggers the emergency release, degrees.
    pub roll_limit_deg: f64,
    /// Actuator error that justifies a new trim command, ticks.
    pub tolerance_ticks: i32,
    /// Quiet time after an emergency release before trimming resumes, seconds.
    pub roll_hold_s: u32,
    /// Cap on the roll-recovery counter, seconds.
    pub roll_count_cap_s: u32,
    /// Maximum quiet period between trim commands, seconds.
    pub retune_timeout_s: u32,
}

impl Default for SailConfig {
    fn default() -> Self {
        Self {
            boom_length_m: 1.6,
            sheet_hole_dist_m: 1.43,
            sheet_height_m: 0.6,
            stroke_length_m: 0.5,
            sheet_purchase: 3.0,
            act_max: 870,
            max_sheet_rad: 1.23,
            ramp_end_deg: 135.0,
            flat_end_deg: 170.0,
            roll_limit_deg: 15.0,
            tolerance_ticks: 150,
            roll_hold_s: 5,
            roll_count_cap_s: 10,
            retune_timeout_s: 10,
        }
    }
}

/// Optimizer smoothing windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbConfig {
    /// Performance smoothing window for the hill climbers, seconds.
    pub perf_window_s: u32,
    /// Mean-wind averaging window, seconds.
    pub mean_wind_window_s: u32,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            perf_window_s: 10,
            mean_wind_window_s: 10,
        }
    }
}

/// Sail actuator duty-cycle guard parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DutyConfig {
    /// Number of ticks in the observation window.
    pub window: usize,
    /// Duty ratio above which motion commands are blocked.
    pub max_duty: f64,
    /// Duty ratio at or below which the block clears.
    pub clear_duty: f64,
    /// Actuator error below which the sail counts as settled, ticks.
    pub precision_ticks: i32,
}

impl Default for DutyConfig {
    fn default() -> Self {
        Self {
            window: 60,
            max_duty: 0.6,
            clear_duty: 0.25,
            precision_ticks: 20,
        }
    }
}

/// Complete helm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    /// Control loop rate, ticks per second.
    pub tick_rate_hz: u32,
    /// Meters-per-degree scale of the local planar approximation.
    pub scale: PlanarScale,
    pub guidance: GuidanceConfig,
    pub maneuver: ManeuverConfig,
    pub rudder: RudderConfig,
    pub sail: SailConfig,
    pub climb: ClimbConfig,
    pub duty: DutyConfig,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 4,
            scale: PlanarScale::default(),
            guidance: GuidanceConfig::default(),
            maneuver: ManeuverConfig::default(),
            rudder: RudderConfig::default(),
            sail: SailConfig::default(),
            climb: ClimbConfig::default(),
            duty: DutyConfig::default(),
        }
    }
}

/// Operator-adjustable values, applied while the loop is running.
///
/// The optimizers watch the seed fields for changes: a new value overwrites
/// the corresponding search state on the tick it arrives, which lets an
/// operator re-home a climb without restarting the process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Seconds between optimizer steps.
    pub steptime_s: u32,
    /// Heading climb step size, degrees.
    pub heading_step_deg: f64,
    /// Sail climb step size, degrees of boom angle.
    pub sail_step_deg: f64,
    /// Target speed-vs-heading slope for the slope climber.
    pub target_slope: f64,
    /// Reference bearing for velocity-made-good, degrees.
    pub reference_bearing_deg: f64,
    /// Sweep direction for the step sequence: negative steps to port.
    pub step_direction: i32,
    /// Seed for the heading climbers, degrees.
    pub heading_seed_deg: f64,
    /// Commanded bearing for fixed-bearing mode, degrees.
    pub fixed_bearing_deg: f64,
    /// Seed position for the sail, ticks. Doubles as the manual sail
    /// position when the sail controller is off.
    pub sail_position_ticks: i32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            steptime_s: 30,
            heading_step_deg: 10.0,
            sail_step_deg: 5.0,
            target_slope: -0.07114,
            reference_bearing_deg: 0.0,
            step_direction: 0,
            heading_seed_deg: 0.0,
            fixed_bearing_deg: 0.0,
            sail_position_ticks: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_codes_roundtrip() {
        for code in 1..=6 {
            let mode = HeadingMode::try_from(code).unwrap();
            assert_eq!(mode.code(), code);
        }
        for code in 1..=3 {
            let mode = SailMode::try_from(code).unwrap();
            assert_eq!(mode.code(), code);
        }
    }

    #[test]
    fn test_unknown_mode_codes_rejected() {
        assert!(HeadingMode::try_from(0).is_err());
        assert!(HeadingMode::try_from(7).is_err());
        assert!(SailMode::try_from(4).is_err());
        let err = SailMode::try_from(0).unwrap_err();
        assert_eq!(err.to_string(), "unknown sail mode code 0");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: HelmConfig =
            serde_json::from_str(r#"{"guidance": {"tacking_range_m": 60.0}}"#).unwrap();
        assert_eq!(config.guidance.tacking_range_m, 60.0);
        assert_eq!(config.guidance.nogo_deg, 55.0);
        assert_eq!(config.rudder.max_angle_deg, 35);
        assert_eq!(config.tick_rate_hz, 4);
    }
}
