//! Waypoint guidance: zone classification and the tacking corridor.
//!
//! All angles here are math angles in the wind frame (radians,
//! counterclockwise, 0 = +x), where +y points dead upwind. The engine
//! looks at the line of sight to the target and decides whether the boat
//! can steer straight at it or has to hold a zone boundary instead:
//!
//! - LOS inside the upwind no-go sector: sail close-hauled along the
//!   nearer no-go boundary, tacking between boundaries at the edges of a
//!   corridor around the direct line.
//! - LOS inside the downwind sector: same scheme along the downwind
//!   boundaries, to keep an accidental jibe out of reach.
//! - Otherwise: steer the LOS bearing directly.
//!
//! The corridor is the pair of lines `x = a·y ± b` parallel to the
//! start-to-target line; its four corner points are exported for the shore
//! display.

use num_complex::Complex64;
use std::f64::consts::FRAC_PI_2;

use crate::angle::wrap_pi;
use crate::config::GuidanceConfig;

/// Which sector the line of sight fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// LOS inside the widened no-go sector.
    Upwind,
    /// LOS inside the downwind sector.
    Downwind,
    /// LOS freely sailable.
    Clear,
}

/// Tacking corridor around the start-to-target line.
///
/// Both boundary lines have the form `x = slope * y ± half_width`. The
/// half-width carries the sign of the LOS-from-start angle, so a target in
/// the lower half-plane flips the lines; the crossing tests in the
/// classifier use the same signed value and stay consistent. Degenerate
/// legs (target on the x axis, or on top of the start) produce non-finite
/// coefficients; the classifier tolerates them and the display ignores the
/// resulting corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corridor {
    /// Slope of the boundary lines in x-per-y.
    pub slope: f64,
    /// Signed horizontal offset of each boundary line, meters.
    pub half_width: f64,
}

impl Corridor {
    fn new(target: Complex64, tacking_range_m: f64) -> Self {
        let slope = if target.re != 0.0 {
            target.re / target.im
        } else {
            0.0
        };
        let los_from_start = target.im.atan2(target.re);
        Self {
            slope,
            half_width: tacking_range_m / (2.0 * los_from_start.sin()),
        }
    }

    /// x coordinate of the left boundary line at height `y`.
    fn left_x(&self, y: f64) -> f64 {
        self.slope * y - self.half_width
    }

    /// x coordinate of the right boundary line at height `y`.
    fn right_x(&self, y: f64) -> f64 {
        self.slope * y + self.half_width
    }

    /// The four corner points of the corridor, wind-frame meters.
    ///
    /// Ordered left line at the start, left line at the target, right line
    /// at the target, right line at the start. Display only.
    pub fn corners(&self, target: Complex64) -> [Complex64; 4] {
        let denom = target.re * self.slope + target.im;
        let left_y_at = |anchor: Complex64| {
            (target.re * (self.half_width + anchor.re) + target.im * anchor.im) / denom
        };
        let right_y_at = |anchor: Complex64| {
            (target.re * (-self.half_width + anchor.re) + target.im * anchor.im) / denom
        };
        let start = Complex64::new(0.0, 0.0);
        let y1 = left_y_at(start);
        let y2 = left_y_at(target);
        let y3 = right_y_at(target);
        let y4 = right_y_at(start);
        [
            Complex64::new(self.left_x(y1), y1),
            Complex64::new(self.left_x(y2), y2),
            Complex64::new(self.right_x(y3), y3),
            Complex64::new(self.right_x(y4), y4),
        ]
    }
}

/// One classification result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Desired course, wind-frame math angle in radians.
    pub desired: f64,
    /// True when `desired` is a newly chosen course; false when the engine
    /// held the previous one (boat pinned to a boundary, still inside the
    /// corridor).
    pub new_course: bool,
    /// Sector the line of sight fell into.
    pub region: Region,
    /// Corridor geometry for this leg, for the display corner points.
    pub corridor: Corridor,
}

/// Zone classifier for one leg geometry.
pub struct GuidanceEngine {
    /// Left no-go boundary course, radians.
    nogo_left: f64,
    /// Right no-go boundary course, radians.
    nogo_right: f64,
    /// Left downwind boundary course, radians.
    down_left: f64,
    /// Right downwind boundary course, radians.
    down_right: f64,
    /// Widening of the no-go sector test, radians.
    margin: f64,
    /// Half-width of the pinned-to-boundary bands, radians.
    pin: f64,
    tacking_range_m: f64,
}

impl GuidanceEngine {
    pub fn new(config: &GuidanceConfig) -> Self {
        let nogo = config.nogo_deg.to_radians();
        let down = config.downwind_deg.to_radians();
        Self {
            nogo_left: FRAC_PI_2 + nogo,
            nogo_right: FRAC_PI_2 - nogo,
            down_left: -FRAC_PI_2 - down,
            down_right: -FRAC_PI_2 + down,
            margin: config.zone_margin_deg.to_radians(),
            pin: config.pin_tolerance_deg.to_radians(),
            tacking_range_m: config.tacking_range_m,
        }
    }

    /// Classify the current geometry and pick the next desired course.
    ///
    /// `boat` and `target` are wind-frame positions relative to the leg
    /// start; `held` is the desired course currently being steered. The
    /// pinned-to-boundary cases return `new_course = false` and echo
    /// `held` until the boat crosses the far corridor line, which is what
    /// keeps the boat on one tack for the full corridor width instead of
    /// flapping between boundaries every tick.
    pub fn classify(&self, boat: Complex64, target: Complex64, held: f64) -> Classification {
        let corridor = Corridor::new(target, self.tacking_range_m);
        let los = (target.im - boat.im).atan2(target.re - boat.re);

        let (desired, new_course, region) = if self.nogo_right - self.margin <= los
            && los <= self.nogo_left + self.margin
        {
            let choice = if self.pinned(held, self.nogo_left) {
                // Close-hauled on port: flip only past the left line.
                if boat.re < corridor.left_x(boat.im) {
                    (self.nogo_right, true)
                } else {
                    (held, false)
                }
            } else if self.pinned(held, self.nogo_right) {
                if boat.re > corridor.right_x(boat.im) {
                    (self.nogo_left, true)
                } else {
                    (held, false)
                }
            } else if Self::nearer(los, self.nogo_left, self.nogo_right) {
                (self.nogo_left, true)
            } else {
                (self.nogo_right, true)
            };
            (choice.0, choice.1, Region::Upwind)
        } else if self.down_left <= los && los <= self.down_right {
            let choice = if self.pinned(held, self.down_left) {
                // Running on the left boundary: flip only past the left line.
                if boat.re > corridor.left_x(boat.im) {
                    (self.down_right, true)
                } else {
                    (held, false)
                }
            } else if self.pinned(held, self.down_right) {
                if boat.re < corridor.right_x(boat.im) {
                    (self.down_left, true)
                } else {
                    (held, false)
                }
            } else if Self::nearer(los, self.down_left, self.down_right) {
                (self.down_left, true)
            } else {
                (self.down_right, true)
            };
            (choice.0, choice.1, Region::Downwind)
        } else {
            (los, true, Region::Clear)
        };

        Classification {
            desired,
            new_course,
            region,
            corridor,
        }
    }

    /// Downwind boundary courses, used as jibe targets.
    pub fn downwind_boundaries(&self) -> (f64, f64) {
        (self.down_left, self.down_right)
    }

    fn pinned(&self, held: f64, boundary: f64) -> bool {
        boundary - self.pin <= held && held <= boundary + self.pin
    }

    /// True when `a` is angularly closer to `los` than `b`.
    fn nearer(los: f64, a: f64, b: f64) -> bool {
        wrap_pi(a - los).abs() < wrap_pi(b - los).abs()
    }
}
