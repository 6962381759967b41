//! Rudder proportional controller.

use crate::angle::wrap_180;
use crate::config::RudderConfig;

/// Steers the boat heading toward a desired bearing.
///
/// A plain proportional law on the wrapped heading error. The integrator
/// is carried and clamped every tick but contributes nothing at the
/// default zero integral gain; setting `gain_i` in the config activates
/// it without code changes.
#[derive(Debug)]
pub struct RudderController {
    config: RudderConfig,
    integrator: f64,
}

impl RudderController {
    pub fn new(config: RudderConfig) -> Self {
        Self {
            config,
            integrator: 0.0,
        }
    }

    /// Rudder angle in whole degrees for this tick, clamped to the
    /// mechanical limit.
    pub fn command(&mut self, desired_deg: f64, heading_deg: f64) -> i32 {
        let error = wrap_180(desired_deg - heading_deg);

        self.integrator = (self.integrator + error)
            .clamp(-self.config.integrator_max, self.config.integrator_max);

        let output = self.config.gain_p * error + self.config.gain_i * self.integrator;
        (output.round() as i32).clamp(-self.config.max_angle_deg, self.config.max_angle_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> RudderController {
        RudderController::new(RudderConfig::default())
    }

    #[test]
    fn test_error_wraps_to_shortest_arm() {
        // Desired 10, heading 350: the error is +20 across north, not -340.
        let mut rudder = controller();
        assert_eq!(rudder.command(10.0, 350.0), -20);
    }

    #[test]
    fn test_command_clamps_to_mechanical_limit() {
        let mut rudder = controller();
        // 200 degrees of raw error wraps to -160; with gain -1 the
        // proportional term is +160, clamped to the limit.
        assert_eq!(rudder.command(200.0, 0.0), 35);
        assert_eq!(rudder.command(-200.0, 40.0), -35);
    }

    #[test]
    fn test_negative_gain_sign_convention() {
        let mut rudder = controller();
        assert_eq!(rudder.command(20.0, 0.0), -20);
        assert_eq!(rudder.command(-20.0, 0.0), 20);
    }

    #[test]
    fn test_integrator_inert_at_zero_gain() {
        let mut rudder = controller();
        for _ in 0..100 {
            assert_eq!(rudder.command(30.0, 0.0), -30);
        }
    }

    #[test]
    fn test_integrator_engages_with_nonzero_gain() {
        let mut rudder = RudderController::new(RudderConfig {
            gain_i: 0.1,
            ..RudderConfig::default()
        });
        // Accumulates 10 degrees of error per tick, clamped at 20.
        assert_eq!(rudder.command(10.0, 0.0), -9);
        assert_eq!(rudder.command(10.0, 0.0), -8);
        assert_eq!(rudder.command(10.0, 0.0), -8);
    }
}
