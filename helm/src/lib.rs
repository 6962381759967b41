//! Control core for an autonomous sailboat.
//!
//! The crate is a pure control library: one [`Autopilot`] consumes a
//! [`SensorSnapshot`] per tick and yields a [`HelmCommand`] with rudder
//! and sail positions plus telemetry. All I/O lives behind the
//! [`SensorSource`] and [`ActuatorSink`] traits, so the same control laws
//! run against device files afloat and against scripted fakes in tests.
//!
//! Heading control offers waypoint guidance (tack and jibe management in
//! a wind-aligned planar frame), hill-climbing optimizers on speed,
//! velocity made good, and heel, a scripted polar-measurement sweep, and
//! a fixed bearing hold. Sail control offers a geometric sheet law, a
//! boom-angle optimizer, and a manual pass-through; every sail command
//! crosses a duty-cycle guard that protects the winch.

pub mod angle;
pub mod climb;
pub mod config;
pub mod duty;
pub mod frame;
pub mod guidance;
pub mod io;
pub mod maneuver;
pub mod ring_buffer;
pub mod rudder;
pub mod sail;

pub use config::{HeadingMode, HelmConfig, HelmError, SailMode, Tunables};
pub use frame::{GeoPoint, Leg, PlanarScale};
pub use io::{
    ActuatorError, ActuatorSink, HelmCommand, SensorError, SensorSnapshot, SensorSource,
};

use angle::CircularMean;
use climb::{velocity_made_good, HeadingClimb, PeriodClock, SailClimb, SlopeClimb, StepSequence};
use duty::DutyGuard;
use frame::WindFrame;
use guidance::GuidanceEngine;
use maneuver::{plan_course_change, ActiveJibe, GuidanceState, ManeuverPlan};
use rudder::RudderController;
use sail::SailTrim;

/// The complete helm: one instance owns every controller and all
/// cross-tick state.
///
/// Call [`Autopilot::tick`] once per control cycle with a fresh sensor
/// snapshot. Mode switches, leg changes, and tunable updates apply
/// between ticks and take effect on the next one.
pub struct Autopilot {
    config: HelmConfig,
    tunables: Tunables,
    heading_mode: HeadingMode,
    sail_mode: SailMode,
    leg: Leg,
    engine: GuidanceEngine,
    state: GuidanceState,
    rudder: RudderController,
    trim: SailTrim,
    duty: DutyGuard,
    clock: PeriodClock,
    slope: SlopeClimb,
    vmg: HeadingClimb,
    heel: HeadingClimb,
    sail_climb: SailClimb,
    steps: StepSequence,
    mean_wind: CircularMean,
    /// Sail position the helm wants, ticks. Shared across sail modes: a
    /// mode that stays quiet this tick leaves the previous target standing.
    sail_target: i32,
    /// Jibe sail-tighten flag as of the last guidance tick. Deliberately
    /// sticky: it keeps its value while another heading mode runs, so a
    /// jibe interrupted by a mode switch leaves the sail hauled in until
    /// guidance resumes and finishes the maneuver.
    jibe_tighten: bool,
}

impl Autopilot {
    pub fn new(config: HelmConfig) -> Self {
        let perf_window = (config.climb.perf_window_s * config.tick_rate_hz) as usize;
        let wind_window = (config.climb.mean_wind_window_s * config.tick_rate_hz) as usize;
        Self {
            engine: GuidanceEngine::new(&config.guidance),
            state: GuidanceState::default(),
            rudder: RudderController::new(config.rudder.clone()),
            trim: SailTrim::new(config.sail.clone(), config.guidance.nogo_deg, config.tick_rate_hz),
            duty: DutyGuard::new(config.duty.clone()),
            clock: PeriodClock::new(),
            slope: SlopeClimb::new(perf_window),
            vmg: HeadingClimb::new(perf_window),
            heel: HeadingClimb::new(perf_window),
            sail_climb: SailClimb::new(perf_window),
            steps: StepSequence::new(),
            mean_wind: CircularMean::new(wind_window),
            sail_target: 0,
            jibe_tighten: false,
            heading_mode: HeadingMode::default(),
            sail_mode: SailMode::default(),
            tunables: Tunables::default(),
            leg: Leg::default(),
            config,
        }
    }

    /// Replace the current leg. Guidance state is deliberately not
    /// cleared: a jibe in progress keeps running against the new
    /// geometry. Use [`Autopilot::reset_guidance`] for a clean slate.
    pub fn set_leg(&mut self, leg: Leg) {
        log::info!(
            "new leg: start ({:.6}, {:.6}) target ({:.6}, {:.6})",
            leg.start.lat,
            leg.start.lon,
            leg.target.lat,
            leg.target.lon
        );
        self.leg = leg;
    }

    pub fn leg(&self) -> Leg {
        self.leg
    }

    pub fn heading_mode(&self) -> HeadingMode {
        self.heading_mode
    }

    pub fn set_heading_mode(&mut self, mode: HeadingMode) {
        if mode != self.heading_mode {
            log::info!("heading mode {:?} -> {:?}", self.heading_mode, mode);
            self.heading_mode = mode;
        }
    }

    pub fn sail_mode(&self) -> SailMode {
        self.sail_mode
    }

    pub fn set_sail_mode(&mut self, mode: SailMode) {
        if mode != self.sail_mode {
            log::info!("sail mode {:?} -> {:?}", self.sail_mode, mode);
            self.sail_mode = mode;
        }
    }

    pub fn tunables(&self) -> Tunables {
        self.tunables
    }

    /// Apply a new set of live tunables. Seed fields are change-detected
    /// by the optimizers themselves, so applying an identical set is a
    /// no-op.
    pub fn apply_tunables(&mut self, tunables: Tunables) {
        self.tunables = tunables;
    }

    /// Drop any maneuver in progress and zero the held course.
    pub fn reset_guidance(&mut self) {
        self.state.reset();
        self.jibe_tighten = false;
    }

    /// Straight-line distance from `position` to the leg target, meters.
    pub fn distance_to_target(&self, position: GeoPoint) -> f64 {
        self.config.scale.offset_m(position, self.leg.target).norm()
    }

    /// True once the boat is inside the arrival radius of the leg target.
    pub fn reached_target(&self, position: GeoPoint) -> bool {
        self.distance_to_target(position) < self.config.guidance.arrival_radius_m
    }

    /// Run one control cycle.
    pub fn tick(&mut self, snapshot: &SensorSnapshot) -> HelmCommand {
        self.mean_wind.push(snapshot.wind_angle_deg);
        let period_ticks = self.tunables.steptime_s * self.config.tick_rate_hz;
        let boundary = self.clock.tick(period_ticks);

        let (target_bearing, boundaries) = self.steer_target(snapshot, boundary, period_ticks);
        let rudder_deg = self.rudder.command(target_bearing, snapshot.heading_deg);

        self.update_sail_target(snapshot, boundary);
        let sail_ticks = self.duty.gate(self.sail_target, snapshot.sail_feedback_ticks);

        HelmCommand {
            rudder_deg,
            sail_ticks,
            sail_target_ticks: self.sail_target,
            target_bearing_deg: target_bearing,
            mean_wind_deg: self.mean_wind.mean_deg(),
            duty: self.duty.duty(),
            boundaries,
        }
    }

    /// Heading-mode dispatch: the bearing to steer this tick, plus the
    /// corridor corners when waypoint guidance produced them.
    fn steer_target(
        &mut self,
        snapshot: &SensorSnapshot,
        boundary: bool,
        period_ticks: u32,
    ) -> (f64, Option<[GeoPoint; 4]>) {
        match self.heading_mode {
            HeadingMode::Guidance => self.run_guidance(snapshot),
            HeadingMode::SlopeClimb => {
                self.slope.step(
                    boundary,
                    snapshot.sog_ms,
                    self.tunables.heading_step_deg,
                    self.tunables.target_slope,
                    self.tunables.heading_seed_deg,
                );
                (self.slope.heading(), None)
            }
            HeadingMode::VmgClimb => {
                let metric = velocity_made_good(
                    snapshot.sog_ms,
                    snapshot.heading_deg,
                    self.tunables.reference_bearing_deg,
                );
                self.vmg.step(
                    boundary,
                    metric,
                    self.tunables.heading_step_deg,
                    self.tunables.heading_seed_deg,
                );
                (self.vmg.heading(), None)
            }
            HeadingMode::StepSequence => {
                let bearing = self.steps.step(
                    self.mean_wind.mean_deg(),
                    self.tunables.step_direction,
                    period_ticks,
                );
                (bearing, None)
            }
            HeadingMode::FixedBearing => (self.tunables.fixed_bearing_deg, None),
            HeadingMode::HeelClimb => {
                self.heel.step(
                    boundary,
                    snapshot.roll_deg.abs(),
                    self.tunables.heading_step_deg,
                    self.tunables.heading_seed_deg,
                );
                (self.heel.heading(), None)
            }
        }
    }

    /// Waypoint guidance for one tick.
    ///
    /// While no jibe is running: classify the geometry, and when the
    /// classifier picks a fresh course that needs a jibe, start one (it
    /// is stepped the same tick). While a jibe runs, classification is
    /// suspended and the sequencer steers; the proposed course holds at
    /// the last classified one and is resumed the tick the jibe
    /// completes.
    fn run_guidance(&mut self, snapshot: &SensorSnapshot) -> (f64, Option<[GeoPoint; 4]>) {
        let frame = WindFrame::new(self.leg.start, snapshot.wind_angle_deg, self.config.scale);
        let boat = frame.project(snapshot.position);
        let target = frame.project(self.leg.target);
        let (down_left, down_right) = self.engine.downwind_boundaries();

        let mut boundaries = None;
        let mut proposed = self.state.desired;

        if self.state.active_jibe.is_none() {
            let classified = self.engine.classify(boat, target, self.state.desired);
            boundaries = Some(classified.corridor.corners(target).map(|z| frame.unproject(z)));
            proposed = classified.desired;
            if classified.new_course {
                let plan = plan_course_change(
                    self.state.desired,
                    proposed,
                    snapshot.sog_ms,
                    &self.config.maneuver,
                );
                if let ManeuverPlan::Jibe(side) = plan {
                    log::info!(
                        "starting {:?} jibe toward {:.1} deg",
                        side,
                        frame.to_bearing(proposed)
                    );
                    self.state.active_jibe = Some(ActiveJibe::new(side));
                }
            }
        }

        let mut steer = proposed;
        if let Some(ref mut jibe) = self.state.active_jibe {
            let step = jibe.step(
                frame.heading_angle(snapshot.heading_deg),
                snapshot.sail_feedback_ticks,
                down_left,
                down_right,
                &self.config.maneuver,
            );
            self.jibe_tighten = step.tighten_sail;
            if step.complete {
                log::info!("jibe complete, resuming {:.1} deg", frame.to_bearing(proposed));
                self.state.active_jibe = None;
                steer = proposed;
            } else {
                steer = step.steer;
            }
        }

        self.state.desired = proposed;
        (frame.to_bearing(steer), boundaries)
    }

    /// Sail-mode dispatch: update the shared sail target when the active
    /// controller has something to say this tick.
    fn update_sail_target(&mut self, snapshot: &SensorSnapshot, boundary: bool) {
        match self.sail_mode {
            SailMode::Manual => {
                self.sail_target = self.tunables.sail_position_ticks;
            }
            SailMode::Climb => {
                let metric = if self.heading_mode == HeadingMode::VmgClimb {
                    velocity_made_good(
                        snapshot.sog_ms,
                        snapshot.heading_deg,
                        self.tunables.reference_bearing_deg,
                    )
                } else {
                    snapshot.sog_ms
                };
                let seed_ticks = self.tunables.sail_position_ticks;
                let seed_angle_deg = self.trim.ticks_to_angle(seed_ticks).to_degrees();
                if let Some(angle_deg) = self.sail_climb.step(
                    boundary,
                    metric,
                    self.tunables.sail_step_deg,
                    seed_ticks,
                    seed_angle_deg,
                ) {
                    self.sail_target = self.trim.angle_to_ticks(angle_deg.to_radians());
                }
            }
            SailMode::Geometric => {
                if let Some(ticks) = self.trim.step(
                    snapshot.heading_deg,
                    snapshot.wind_angle_deg,
                    snapshot.roll_deg,
                    snapshot.sail_feedback_ticks,
                    self.jibe_tighten,
                ) {
                    self.sail_target = ticks;
                }
            }
        }
    }
}
