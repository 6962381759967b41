//! Hill-climbing optimizers for heading and sail trim.
//!
//! Each optimizer perturbs its control (a bearing or a boom angle) by a
//! fixed step once per evaluation period and watches a performance metric
//! to decide the next step's direction. Metrics are smoothed over the
//! period with a windowed mean so a single wave or gust does not flip the
//! search. All optimizers share one [`PeriodClock`] so their evaluation
//! boundaries line up with the stepped-heading sequencer.
//!
//! Operators can re-home a search mid-run by changing the seed value; the
//! seed is change-detected, so a constant seed leaves the search alone.

use crate::angle::{sign_or_one, WindowedMean};

/// Shared evaluation-period timer, ticked once per control cycle.
#[derive(Debug, Default)]
pub struct PeriodClock {
    counter: u32,
}

impl PeriodClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one tick; true when the evaluation period elapses. A
    /// period of zero or one fires every tick.
    pub fn tick(&mut self, period_ticks: u32) -> bool {
        if self.counter >= period_ticks.saturating_sub(1) {
            self.counter = 0;
            true
        } else {
            self.counter += 1;
            false
        }
    }
}

/// Steepest-ascent state shared by the heading and sail optimizers.
///
/// The previous-control and previous-metric fields start at sentinel
/// values (13 and 20) chosen so the first evaluation drives the control
/// downward from its starting point rather than standing still.
#[derive(Debug)]
struct ClimbCore {
    u: f64,
    u_prev: f64,
    v_prev: f64,
}

impl ClimbCore {
    fn new(u0: f64) -> Self {
        Self {
            u: u0,
            u_prev: 13.0,
            v_prev: 20.0,
        }
    }

    /// One steepest-ascent step: move the control in the direction that
    /// last raised the metric. Zero deltas count as positive, so a flat
    /// metric keeps the current direction.
    fn ascend(&mut self, v: f64, step: f64) {
        let dir = sign_or_one(v - self.v_prev) * sign_or_one(self.u - self.u_prev);
        self.u_prev = self.u;
        self.v_prev = v;
        self.u += step * dir;
    }

    fn seed(&mut self, u: f64) {
        self.u = u;
    }
}

/// Heading optimizer: climbs a metric (speed over ground, velocity made
/// good, or heel angle) by stepping the commanded bearing.
#[derive(Debug)]
pub struct HeadingClimb {
    core: ClimbCore,
    perf: WindowedMean,
    last_seed: f64,
}

impl HeadingClimb {
    pub fn new(window_ticks: usize) -> Self {
        Self {
            core: ClimbCore::new(180.0),
            perf: WindowedMean::new(window_ticks),
            last_seed: 0.0,
        }
    }

    /// Feeds one metric sample; steps the bearing when `boundary` is set.
    pub fn step(&mut self, boundary: bool, metric: f64, step_deg: f64, seed_deg: f64) {
        self.perf.push(metric);
        if boundary {
            let v = self.perf.mean();
            self.core.ascend(v, step_deg);
        }
        if seed_deg != self.last_seed {
            self.core.seed(seed_deg);
            self.last_seed = seed_deg;
        }
    }

    /// Bearing to steer, degrees.
    pub fn heading(&self) -> f64 {
        self.core.u
    }
}

/// Heading optimizer that seeks a target slope of the speed polar rather
/// than a peak. Useful near the edge of the no-go zone, where speed falls
/// off steadily and a peak search would wander.
#[derive(Debug)]
pub struct SlopeClimb {
    u: f64,
    u_prev: f64,
    v_prev: f64,
    perf: WindowedMean,
    last_seed: f64,
}

impl SlopeClimb {
    pub fn new(window_ticks: usize) -> Self {
        Self {
            u: 180.0,
            u_prev: 13.0,
            v_prev: 20.0,
            perf: WindowedMean::new(window_ticks),
            last_seed: 0.0,
        }
    }

    /// Feeds one speed sample; steps the bearing toward the target slope
    /// when `boundary` is set.
    ///
    /// Bookkeeping differs from [`HeadingClimb`]: the previous control is
    /// recorded after the step, so in steady state the control delta reads
    /// as zero and only the sign of the measured slope error steers.
    pub fn step(
        &mut self,
        boundary: bool,
        metric: f64,
        step_deg: f64,
        target_slope: f64,
        seed_deg: f64,
    ) {
        self.perf.push(metric);
        if boundary {
            let v = self.perf.mean();
            let signu = sign_or_one(self.u_prev - self.u);
            let slope_err = signu * (self.v_prev - v) / step_deg - target_slope;
            self.u += step_deg * sign_or_one(slope_err);
            self.v_prev = v;
            self.u_prev = self.u;
        }
        if seed_deg != self.last_seed {
            self.u = seed_deg;
            self.last_seed = seed_deg;
        }
    }

    /// Bearing to steer, degrees.
    pub fn heading(&self) -> f64 {
        self.u
    }
}

/// Sail optimizer: climbs boat speed (or velocity made good) by stepping
/// the boom angle in degrees. Emits an updated angle only on evaluation
/// boundaries; between boundaries the last commanded trim stands.
#[derive(Debug)]
pub struct SailClimb {
    core: ClimbCore,
    perf: WindowedMean,
    last_seed_ticks: i32,
}

impl SailClimb {
    pub fn new(window_ticks: usize) -> Self {
        Self {
            core: ClimbCore::new(0.0),
            perf: WindowedMean::new(window_ticks),
            last_seed_ticks: 0,
        }
    }

    /// Feeds one metric sample. Returns the boom angle to command, in
    /// degrees, on evaluation boundaries.
    ///
    /// The seed arrives as an actuator position; `seed_angle_deg` is that
    /// position expressed as a boom angle. A changed seed re-homes the
    /// search but does not emit a command until the next boundary.
    pub fn step(
        &mut self,
        boundary: bool,
        metric: f64,
        step_deg: f64,
        seed_ticks: i32,
        seed_angle_deg: f64,
    ) -> Option<f64> {
        self.perf.push(metric);
        let mut out = None;
        if boundary {
            let v = self.perf.mean();
            self.core.ascend(v, step_deg);
            out = Some(self.core.u);
        }
        if seed_ticks != self.last_seed_ticks {
            self.core.seed(seed_angle_deg);
            self.last_seed_ticks = seed_ticks;
        }
        out
    }
}

/// Apparent-wind offsets, degrees, walked by the stepped-heading
/// sequencer for polar characterization runs. The table sweeps from dead
/// downwind up to close-hauled; the final zero entry is a guard and is
/// never commanded.
const APPARENT_STEPS: [f64; 23] = [
    180.0, 180.0, 160.0, 140.0, 120.0, 100.0, 90.0, 80.0, 70.0, 60.0, 65.0, 55.0, 50.0, 45.0,
    40.0, 35.0, 30.0, 25.0, 20.0, 15.0, 10.0, 5.0, 0.0,
];

/// Stepped-heading sequencer: holds each apparent-wind offset for one
/// period, then advances to the next table entry, wrapping at the end.
#[derive(Debug, Default)]
pub struct StepSequence {
    counter: u32,
    index: usize,
}

impl StepSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// One tick: returns the bearing to steer, mean wind plus the current
    /// table offset on the side given by `direction` (negative steps to
    /// port). The bearing is reported raw, without compass wrapping.
    pub fn step(&mut self, mean_wind_deg: f64, direction: i32, period_ticks: u32) -> f64 {
        if self.counter >= period_ticks {
            self.counter = 0;
            self.index += 1;
        } else {
            self.counter += 1;
        }
        if self.index >= APPARENT_STEPS.len() - 1 {
            self.index = 0;
        }
        let side = if direction >= 0 { 1.0 } else { -1.0 };
        mean_wind_deg + side * APPARENT_STEPS[self.index]
    }
}

/// Speed made good toward a reference bearing, from speed over ground and
/// the heading's offset off that bearing.
pub fn velocity_made_good(sog_ms: f64, heading_deg: f64, bearing_deg: f64) -> f64 {
    sog_ms * (heading_deg - bearing_deg).to_radians().cos()
}
