//! Course-change classification and the jibe sequencer.
//!
//! When guidance proposes a new course, the maneuver layer decides what it
//! takes to get there: a plain rudder movement, a tack (shooting the bow
//! through the wind, allowed only with enough way on), or a jibe. Jibes are
//! the dangerous one — the boom swings through the whole arc — so they run
//! as a sequenced procedure: come onto the departure-side downwind
//! boundary, haul the sail in, swing through dead downwind to the arrival
//! side, ease the sail back out. The sequencer is reentered every tick and
//! never blocks; each phase holds until heading and sail feedback both
//! confirm it.

use crate::config::ManeuverConfig;

/// Side of the wind frame the current course lies on when the jibe starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JibeSide {
    /// Course in the left (-x) half of the wind frame.
    Port,
    /// Course in the right (+x) half.
    Starboard,
}

/// What a proposed course change requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverPlan {
    /// Same side of the wind: just steer there.
    Direct,
    /// Opposite side through the no-go zone with enough speed: steer
    /// straight through, no sail handling needed.
    Tack,
    /// Opposite side around the downwind arc, or too slow to tack.
    Jibe(JibeSide),
}

/// Three-valued sign, distinguishing exact zero.
fn sign3(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Classify the change from the `held` course to the `proposed` one.
///
/// Both courses are wind-frame math angles in radians. A change within one
/// side of the wind is direct. Crossing sides is a tack only when both
/// courses point upwind and the boat carries more than the minimum speed;
/// otherwise it is a jibe, departing from whichever side the held course
/// is on.
pub fn plan_course_change(
    held: f64,
    proposed: f64,
    sog_ms: f64,
    config: &ManeuverConfig,
) -> ManeuverPlan {
    let (held_sin, held_cos) = held.sin_cos();
    let (proposed_sin, proposed_cos) = proposed.sin_cos();

    if sign3(held_cos) == sign3(proposed_cos) {
        ManeuverPlan::Direct
    } else if held_sin > 0.0 && proposed_sin > 0.0 && sog_ms > config.min_tack_speed {
        ManeuverPlan::Tack
    } else if held_cos < 0.0 {
        ManeuverPlan::Jibe(JibeSide::Port)
    } else {
        ManeuverPlan::Jibe(JibeSide::Starboard)
    }
}

/// Phases of a jibe, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JibePhase {
    /// Come onto the departure-side downwind boundary, sail still out.
    Approach,
    /// Hold course, haul the sail fully in.
    Tighten,
    /// Swing through dead downwind to the arrival-side boundary.
    Execute,
    /// Hold the arrival course, ease the sail back out.
    Release,
}

/// A jibe in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveJibe {
    side: JibeSide,
    phase: JibePhase,
}

/// One tick of sequencer output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JibeStep {
    /// Course to steer this tick, wind-frame radians.
    pub steer: f64,
    /// Command the sail hauled fully in this tick.
    pub tighten_sail: bool,
    /// The sequence finished this tick; the caller drops the jibe and
    /// resumes steering its held course.
    pub complete: bool,
}

impl ActiveJibe {
    pub fn new(side: JibeSide) -> Self {
        Self {
            side,
            phase: JibePhase::Approach,
        }
    }

    pub fn phase(&self) -> JibePhase {
        self.phase
    }

    /// Target course for the current phase: the departure-side downwind
    /// boundary through Tighten, the arrival side from Execute on.
    fn target(&self, down_left: f64, down_right: f64) -> f64 {
        let departing = matches!(self.phase, JibePhase::Approach | JibePhase::Tighten);
        match (self.side, departing) {
            (JibeSide::Port, true) | (JibeSide::Starboard, false) => down_left,
            (JibeSide::Starboard, true) | (JibeSide::Port, false) => down_right,
        }
    }

    fn tighten(&self) -> bool {
        matches!(self.phase, JibePhase::Tighten | JibePhase::Execute)
    }

    /// Advance the sequencer by one tick.
    ///
    /// `heading_angle` is the boat heading as a wind-frame math angle;
    /// `down_left`/`down_right` are the downwind boundary courses from the
    /// guidance engine. The phase advances at most once per call, and only
    /// when the heading has converged into the phase's cone AND the sail
    /// feedback confirms the commanded state (in when tightened, out
    /// otherwise).
    pub fn step(
        &mut self,
        heading_angle: f64,
        sail_feedback_ticks: i32,
        down_left: f64,
        down_right: f64,
        config: &ManeuverConfig,
    ) -> JibeStep {
        let steer = self.target(down_left, down_right);
        let tighten_sail = self.tighten();

        let converged =
            (heading_angle - steer).cos() > config.angle_lim_deg.to_radians().cos();
        let sail_ready = if tighten_sail {
            sail_feedback_ticks < config.sail_in_ticks
        } else {
            sail_feedback_ticks > config.sail_out_ticks
        };

        let mut complete = false;
        if converged && sail_ready {
            self.phase = match self.phase {
                JibePhase::Approach => JibePhase::Tighten,
                JibePhase::Tighten => JibePhase::Execute,
                JibePhase::Execute => JibePhase::Release,
                JibePhase::Release => {
                    complete = true;
                    JibePhase::Release
                }
            };
        }

        JibeStep {
            steer,
            tighten_sail,
            complete,
        }
    }
}

/// Cross-tick guidance memory: the held desired course and any jibe in
/// progress.
///
/// Nothing here is cleared when a new leg begins or when the heading mode
/// switches away mid-maneuver; a jibe in progress keeps running against
/// the new geometry once guidance resumes. That carries over long-standing
/// behavior afloat; [`GuidanceState::reset`] gives embedders a clean slate
/// when they want one instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuidanceState {
    /// Desired course currently held, wind-frame radians.
    pub desired: f64,
    /// Jibe in progress, if any.
    pub active_jibe: Option<ActiveJibe>,
}

impl GuidanceState {
    /// Drop any maneuver in progress and zero the held course.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DOWN_LEFT: f64 = -2.0943951023931953; // -120 degrees
    const DOWN_RIGHT: f64 = -1.0471975511965976; // -60 degrees

    fn config() -> ManeuverConfig {
        ManeuverConfig::default()
    }

    #[test]
    fn test_same_side_change_is_direct() {
        let plan = plan_course_change(60f64.to_radians(), 20f64.to_radians(), 1.0, &config());
        assert_eq!(plan, ManeuverPlan::Direct);
    }

    #[test]
    fn test_upwind_side_change_with_speed_is_tack() {
        let plan = plan_course_change(120f64.to_radians(), 60f64.to_radians(), 1.0, &config());
        assert_eq!(plan, ManeuverPlan::Tack);
    }

    #[test]
    fn test_slow_upwind_side_change_falls_back_to_jibe() {
        let plan = plan_course_change(120f64.to_radians(), 60f64.to_radians(), 0.3, &config());
        assert_eq!(plan, ManeuverPlan::Jibe(JibeSide::Port));
    }

    #[test]
    fn test_downwind_side_change_is_jibe() {
        let plan =
            plan_course_change((-60f64).to_radians(), (-120f64).to_radians(), 1.0, &config());
        assert_eq!(plan, ManeuverPlan::Jibe(JibeSide::Starboard));
    }

    #[test]
    fn test_jibe_holds_phase_until_heading_converges() {
        let mut jibe = ActiveJibe::new(JibeSide::Port);
        for _ in 0..3 {
            let step = jibe.step(0.0, 400, DOWN_LEFT, DOWN_RIGHT, &config());
            assert_eq!(jibe.phase(), JibePhase::Approach);
            assert!(!step.complete);
            assert!(!step.tighten_sail);
        }
    }

    #[test]
    fn test_jibe_holds_phase_until_sail_confirms() {
        let mut jibe = ActiveJibe::new(JibeSide::Port);
        // On course but sail not out far enough.
        jibe.step(DOWN_LEFT, 100, DOWN_LEFT, DOWN_RIGHT, &config());
        assert_eq!(jibe.phase(), JibePhase::Approach);
    }

    #[test]
    fn test_jibe_runs_to_completion_in_four_qualifying_ticks() {
        let mut jibe = ActiveJibe::new(JibeSide::Port);

        // Approach: on the departure boundary, sail out.
        let step = jibe.step(DOWN_LEFT, 400, DOWN_LEFT, DOWN_RIGHT, &config());
        assert_relative_eq!(step.steer, DOWN_LEFT);
        assert!(!step.tighten_sail);
        assert!(!step.complete);

        // Tighten: holds the departure course, wants the sail in.
        let step = jibe.step(DOWN_LEFT, 10, DOWN_LEFT, DOWN_RIGHT, &config());
        assert_relative_eq!(step.steer, DOWN_LEFT);
        assert!(step.tighten_sail);
        assert!(!step.complete);

        // Execute: target flips to the arrival boundary, sail stays in.
        let step = jibe.step(DOWN_RIGHT, 10, DOWN_LEFT, DOWN_RIGHT, &config());
        assert_relative_eq!(step.steer, DOWN_RIGHT);
        assert!(step.tighten_sail);
        assert!(!step.complete);

        // Release: sail back out, sequence completes.
        let step = jibe.step(DOWN_RIGHT, 400, DOWN_LEFT, DOWN_RIGHT, &config());
        assert_relative_eq!(step.steer, DOWN_RIGHT);
        assert!(!step.tighten_sail);
        assert!(step.complete);
    }

    #[test]
    fn test_starboard_jibe_mirrors_targets() {
        let mut jibe = ActiveJibe::new(JibeSide::Starboard);
        let step = jibe.step(DOWN_RIGHT, 400, DOWN_LEFT, DOWN_RIGHT, &config());
        assert_relative_eq!(step.steer, DOWN_RIGHT);
        // After Approach and Tighten, the target flips to the left boundary.
        jibe.step(DOWN_RIGHT, 10, DOWN_LEFT, DOWN_RIGHT, &config());
        let step = jibe.step(DOWN_LEFT, 10, DOWN_LEFT, DOWN_RIGHT, &config());
        assert_relative_eq!(step.steer, DOWN_LEFT);
    }

    #[test]
    fn test_state_reset_clears_maneuver() {
        let mut state = GuidanceState {
            desired: 1.2,
            active_jibe: Some(ActiveJibe::new(JibeSide::Port)),
        };
        state.reset();
        assert_eq!(state, GuidanceState::default());
    }
}
