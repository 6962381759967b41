//! Sail trim: the geometric sheet law and its safety gates.
//!
//! The desired sheet angle is a piecewise function of the boat-wind angle:
//! sheeted flat inside the no-go sector, eased linearly out to the run
//! band, held fully eased there, and hauled back in when sailing almost
//! dead downwind. The sheet angle maps to actuator ticks through the rig
//! triangle (sheet hole, mast, boom end) via the law of cosines.
//!
//! Two gates sit between the law and the actuator. A roll above the limit
//! releases the sail immediately and starts a recovery hold before normal
//! trimming resumes. Normal trimming itself is rate limited: a new command
//! goes out only when the actuator is well off target or a quiet-period
//! timeout expires. An active jibe overrides everything and hauls the
//! sail fully in.

use crate::angle::wrap_pi;
use crate::config::SailConfig;

/// Sail trim controller for one rig.
#[derive(Debug)]
pub struct SailTrim {
    config: SailConfig,
    /// Sheet angle where the ease ramp starts, radians.
    ramp_start: f64,
    /// Ticks since roll was last over the limit, capped.
    roll_recovery_ticks: u32,
    /// Ticks since the last issued trim command.
    retune_ticks: u32,
    roll_hold_ticks: u32,
    roll_cap_ticks: u32,
    retune_timeout_ticks: u32,
}

impl SailTrim {
    /// `nogo_deg` is the guidance no-go half-angle; the ease ramp starts
    /// there, since inside the no-go sector the sail is kept flat.
    pub fn new(config: SailConfig, nogo_deg: f64, tick_rate_hz: u32) -> Self {
        Self {
            ramp_start: nogo_deg.to_radians(),
            roll_recovery_ticks: 0,
            retune_ticks: 0,
            roll_hold_ticks: config.roll_hold_s * tick_rate_hz,
            roll_cap_ticks: config.roll_count_cap_s * tick_rate_hz,
            retune_timeout_ticks: config.retune_timeout_s * tick_rate_hz,
            config,
        }
    }

    /// Desired sheet angle for a boat-wind angle, both radians.
    fn sheet_angle(&self, bwa: f64) -> f64 {
        let ramp_end = self.config.ramp_end_deg.to_radians();
        let flat_end = self.config.flat_end_deg.to_radians();
        if bwa < self.ramp_start {
            0.0
        } else if bwa < ramp_end {
            self.config.max_sheet_rad / (ramp_end - self.ramp_start) * (bwa - self.ramp_start)
        } else if bwa < flat_end {
            self.config.max_sheet_rad
        } else {
            0.0
        }
    }

    /// Sheet length for a boom angle, law of cosines on the rig triangle.
    fn sheet_length(&self, boom_rad: f64) -> f64 {
        let a = self.config.sheet_hole_dist_m;
        let b = self.config.boom_length_m;
        let h = self.config.sheet_height_m;
        (a * a + b * b - 2.0 * a * b * boom_rad.cos() + h * h).sqrt()
    }

    /// Actuator ticks that realize a boom angle, clamped to the travel.
    pub fn angle_to_ticks(&self, boom_rad: f64) -> i32 {
        let slack = self.sheet_length(boom_rad) - self.sheet_length(0.0);
        let ticks = (slack / self.config.sheet_purchase * self.config.act_max as f64
            / self.config.stroke_length_m)
            .round() as i32;
        ticks.clamp(0, self.config.act_max)
    }

    /// Boom angle represented by an actuator position, radians. Inverse of
    /// [`SailTrim::angle_to_ticks`], used to re-home the sail optimizer
    /// from a tick seed.
    pub fn ticks_to_angle(&self, ticks: i32) -> f64 {
        let a = self.config.sheet_hole_dist_m;
        let b = self.config.boom_length_m;
        let h = self.config.sheet_height_m;
        let c = self.sheet_length(0.0)
            + self.config.sheet_purchase * self.config.stroke_length_m * ticks as f64
                / self.config.act_max as f64;
        let cos = (a * a + b * b + h * h - c * c) / (2.0 * a * b);
        cos.clamp(-1.0, 1.0).acos()
    }

    /// One tick of the geometric trim law.
    ///
    /// Returns the actuator position to take as the new target, or None to
    /// leave the current target standing. Emergency release and the jibe
    /// override bypass the rate limiting; the jibe override wins over the
    /// release within a tick.
    pub fn step(
        &mut self,
        heading_deg: f64,
        wind_deg: f64,
        roll_deg: f64,
        sail_feedback_ticks: i32,
        maneuver_tighten: bool,
    ) -> Option<i32> {
        let bwa = wrap_pi((heading_deg - wind_deg).to_radians()).abs();
        let law_ticks = self.angle_to_ticks(self.sheet_angle(bwa));

        let mut issue = None;
        if roll_deg.abs() > self.config.roll_limit_deg {
            issue = Some(self.config.act_max);
            self.roll_recovery_ticks = 0;
        } else if self.roll_recovery_ticks < self.roll_cap_ticks {
            self.roll_recovery_ticks += 1;
        }

        if maneuver_tighten {
            issue = Some(0);
        } else if self.roll_recovery_ticks > self.roll_hold_ticks
            && ((law_ticks - sail_feedback_ticks).abs() > self.config.tolerance_ticks
                || self.retune_ticks > self.retune_timeout_ticks)
        {
            issue = Some(law_ticks);
            self.retune_ticks = 0;
        } else {
            self.retune_ticks += 1;
        }

        issue
    }
}
