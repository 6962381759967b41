//! Duty-cycle guard for the sail winch.
//!
//! The winch is not rated for continuous running. The guard watches how
//! often the actuator has been in motion over a sliding window and, past
//! a duty limit, withholds new position commands until the duty falls
//! back below a clear threshold. While blocked, the actuator is treated
//! as parked, so the window drains and the guard reopens on its own.

use crate::config::DutyConfig;
use crate::ring_buffer::RingBuffer;

#[derive(Debug)]
pub struct DutyGuard {
    config: DutyConfig,
    history: RingBuffer<bool>,
    blocked: bool,
    duty: f64,
}

impl DutyGuard {
    pub fn new(config: DutyConfig) -> Self {
        Self {
            history: RingBuffer::new(config.window),
            blocked: false,
            duty: 0.0,
            config,
        }
    }

    /// Passes a position command through the guard.
    ///
    /// The actuator counts as in motion when its feedback is further from
    /// the command than the precision band. Returns the command when the
    /// guard is open, None while it is blocked. Blocking and clearing
    /// take effect on the same tick they are decided.
    pub fn gate(&mut self, command_ticks: i32, feedback_ticks: i32) -> Option<i32> {
        let moving =
            (feedback_ticks - command_ticks).abs() > self.config.precision_ticks && !self.blocked;
        self.history.push(moving);

        // The window is sized in ticks and counts as if zero-filled, so
        // duty ramps up from zero during the first pass through it.
        let in_motion = self.history.iter().filter(|&&m| m).count();
        self.duty = in_motion as f64 / self.history.capacity() as f64;

        if self.duty > self.config.max_duty {
            if !self.blocked {
                log::warn!("sail duty {:.2} over limit, holding the winch", self.duty);
            }
            self.blocked = true;
        } else if self.duty <= self.config.clear_duty {
            if self.blocked {
                log::info!("sail duty {:.2} cleared, winch released", self.duty);
            }
            self.blocked = false;
        }

        if self.blocked {
            None
        } else {
            Some(command_ticks)
        }
    }

    /// Fraction of the window the actuator spent in motion.
    pub fn duty(&self) -> f64 {
        self.duty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn guard() -> DutyGuard {
        DutyGuard::new(DutyConfig::default())
    }

    #[test]
    fn test_gate_passes_when_on_target() {
        let mut guard = guard();
        assert_eq!(guard.gate(400, 405), Some(400));
        assert_relative_eq!(guard.duty(), 0.0);
    }

    #[test]
    fn test_gate_blocks_past_duty_limit() {
        let mut guard = guard();
        // Feedback far off target: every tick counts toward duty. The
        // limit of 0.6 over a 60-tick window trips on the 37th.
        for _ in 0..36 {
            assert_eq!(guard.gate(800, 0), Some(800));
        }
        assert_eq!(guard.gate(800, 0), None);
        assert!(guard.duty() > 0.6);
    }

    #[test]
    fn test_gate_reopens_after_cooldown() {
        let mut guard = guard();
        for _ in 0..37 {
            guard.gate(800, 0);
        }
        // Actuator parked: motion samples age out until duty reaches the
        // clear threshold of 0.25, which takes 44 more ticks.
        for _ in 0..44 {
            assert_eq!(guard.gate(800, 800), None);
        }
        assert_eq!(guard.gate(800, 800), Some(800));
        assert_relative_eq!(guard.duty(), 0.25);
    }

    #[test]
    fn test_blocked_guard_counts_actuator_as_parked() {
        let mut guard = guard();
        for _ in 0..37 {
            guard.gate(800, 0);
        }
        // Still far off target, but while blocked no motion accrues, so
        // the guard drains on the same schedule as a parked actuator.
        for _ in 0..44 {
            assert_eq!(guard.gate(800, 0), None);
        }
        assert_eq!(guard.gate(800, 0), Some(800));
    }

    #[test]
    fn test_duty_reports_fraction_of_window() {
        let mut guard = guard();
        for _ in 0..6 {
            guard.gate(800, 0);
        }
        assert_relative_eq!(guard.duty(), 0.1);
    }
}
