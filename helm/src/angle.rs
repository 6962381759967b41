//! Angle conventions, wrapping, and windowed averages.
//!
//! Two conventions meet in this crate. Sensor and operator values are
//! compass bearings: degrees, clockwise, 0 = north. All planar geometry is
//! done in math convention: radians, counterclockwise, 0 = east (+x axis).
//! Conversions between the two live here so the rest of the crate never
//! mixes them up.

use crate::ring_buffer::RingBuffer;

/// Convert a compass bearing in degrees to a math angle in radians.
pub fn compass_to_math(bearing_deg: f64) -> f64 {
    std::f64::consts::FRAC_PI_2 - bearing_deg.to_radians()
}

/// Convert a math angle in radians back to a compass bearing in degrees.
pub fn math_to_compass(angle_rad: f64) -> f64 {
    (std::f64::consts::FRAC_PI_2 - angle_rad).to_degrees()
}

/// Wrap an angle in radians to (-pi, pi].
///
/// The `atan2(sin, cos)` form survives any input magnitude and lands
/// exactly on the branch the trig identities expect.
pub fn wrap_pi(angle_rad: f64) -> f64 {
    angle_rad.sin().atan2(angle_rad.cos())
}

/// Wrap an angle in degrees to (-180, 180].
pub fn wrap_180(angle_deg: f64) -> f64 {
    wrap_pi(angle_deg.to_radians()).to_degrees()
}

/// Sign function with `sign(0) = +1`.
///
/// The hill-climbing correlation step needs a strict two-valued sign: a
/// perfectly static system must keep stepping in the positive direction
/// rather than stall on a zero product.
pub fn sign_or_one(value: f64) -> f64 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Arithmetic mean over a sliding window of samples.
#[derive(Debug, Clone)]
pub struct WindowedMean {
    window: RingBuffer<f64>,
}

impl WindowedMean {
    /// Create a mean over the most recent `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            window: RingBuffer::new(capacity),
        }
    }

    /// Add a sample to the window.
    pub fn push(&mut self, sample: f64) {
        self.window.push(sample);
    }

    /// Mean of the samples currently in the window; 0.0 while empty.
    pub fn mean(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.window.iter().sum();
        sum / self.window.len() as f64
    }

    /// Forget all samples.
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

/// Circular mean over a sliding window of compass bearings.
///
/// Each bearing is summed as a unit vector (east component `sin`, north
/// component `cos`) so that a window straddling north averages correctly:
/// 350 deg and 10 deg mean 0 deg, not 180 deg.
#[derive(Debug, Clone)]
pub struct CircularMean {
    window: RingBuffer<f64>,
}

impl CircularMean {
    /// Create a circular mean over the most recent `capacity` bearings.
    pub fn new(capacity: usize) -> Self {
        Self {
            window: RingBuffer::new(capacity),
        }
    }

    /// Add a bearing in degrees to the window.
    pub fn push(&mut self, bearing_deg: f64) {
        self.window.push(bearing_deg);
    }

    /// Mean bearing in degrees, in (-180, 180]; 0.0 while empty.
    pub fn mean_deg(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let (east, north) = self
            .window
            .iter()
            .map(|b| b.to_radians())
            .fold((0.0, 0.0), |(e, n), b| (e + b.sin(), n + b.cos()));
        east.atan2(north).to_degrees()
    }

    /// Forget all samples.
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compass_math_roundtrip() {
        for bearing in [0.0, 45.0, 90.0, 135.0, 180.0, 270.0] {
            let restored = math_to_compass(compass_to_math(bearing));
            assert_relative_eq!(restored, bearing, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_compass_axes() {
        // North is straight up the +y axis, east along +x.
        assert_relative_eq!(compass_to_math(0.0), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(compass_to_math(90.0), 0.0);
    }

    #[test]
    fn test_wrap_180_shortest_arm() {
        // Desired 10, current 350: error is +20, never -340.
        assert_relative_eq!(wrap_180(10.0 - 350.0), 20.0, epsilon = 1e-9);
        assert_relative_eq!(wrap_180(350.0 - 10.0), -20.0, epsilon = 1e-9);
        assert_relative_eq!(wrap_180(540.0), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sign_or_one_zero_is_positive() {
        assert_eq!(sign_or_one(0.0), 1.0);
        assert_eq!(sign_or_one(3.2), 1.0);
        assert_eq!(sign_or_one(-0.001), -1.0);
    }

    #[test]
    fn test_windowed_mean_slides() {
        let mut mean = WindowedMean::new(3);
        assert_eq!(mean.mean(), 0.0);

        mean.push(1.0);
        mean.push(2.0);
        assert_relative_eq!(mean.mean(), 1.5);

        mean.push(3.0);
        mean.push(4.0); // drops the 1.0
        assert_relative_eq!(mean.mean(), 3.0);
    }

    #[test]
    fn test_circular_mean_across_north() {
        let mut mean = CircularMean::new(4);
        mean.push(350.0);
        mean.push(10.0);
        assert_relative_eq!(mean.mean_deg(), 0.0, epsilon = 1e-9);

        mean.reset();
        mean.push(170.0);
        mean.push(190.0);
        // Both sides of south; answer is south, sign depends on branch.
        assert_relative_eq!(mean.mean_deg().abs(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circular_mean_plain_average() {
        let mut mean = CircularMean::new(8);
        mean.push(80.0);
        mean.push(100.0);
        assert_relative_eq!(mean.mean_deg(), 90.0, epsilon = 1e-9);
    }
}
