//! Stuck detection over a displacement window.
//!
//! The detector keeps a baseline position and timestamp and
//! re-evaluates only after a debounce window of mission time has
//! elapsed; checking more often would flag normal deceleration as
//! stuck. At each evaluation the rover is stuck if its whole-unit
//! position has not changed since the baseline while it was neither
//! turning in place nor picking up a sample. A first stuck entry
//! stores an escape heading 180° from the current yaw; a second
//! consecutive entry escalates to [`StuckLevel::StuckAgain`], which the
//! drive controller answers with reverse throttle.
//!
//! Reads/writes: the detector owns its baseline; on `RoverState` it
//! reads and writes `stuck` and `turning` and writes
//! `opposite_heading` and `stuck_episodes`. Actuation during recovery
//! is the drive controller's job, not the detector's.

use log::{debug, warn};

use crate::config::StuckConfig;
use crate::control::{RoverState, StuckLevel};
use crate::core::RoverPose;

#[derive(Clone, Copy, Debug)]
struct Baseline {
    x: f32,
    y: f32,
    time: f64,
}

/// Displacement-window stuck detector.
#[derive(Clone, Debug)]
pub struct StuckDetector {
    /// Debounce window in seconds of mission time.
    window_secs: f64,
    /// Last evaluation position and timestamp.
    baseline: Option<Baseline>,
}

impl StuckDetector {
    /// Create a detector with the configured debounce window.
    pub fn new(config: &StuckConfig) -> Self {
        Self {
            window_secs: config.window_secs,
            baseline: None,
        }
    }

    /// Evaluate stuck state for this tick.
    ///
    /// The first tick only captures the baseline. Subsequent ticks do
    /// nothing until the window has elapsed, then escalate or clear
    /// and re-baseline.
    pub fn update(
        &mut self,
        state: &mut RoverState,
        pose: &RoverPose,
        total_time: f64,
        picking_up: bool,
    ) {
        let current = Baseline {
            x: pose.x,
            y: pose.y,
            time: total_time,
        };

        let baseline = match self.baseline {
            None => {
                self.baseline = Some(current);
                return;
            }
            Some(b) => b,
        };

        if total_time - baseline.time <= self.window_secs {
            return;
        }

        let unmoved =
            baseline.x.round() == pose.x.round() && baseline.y.round() == pose.y.round();

        if unmoved && !state.turning && !picking_up {
            let entering = state.stuck == StuckLevel::NotStuck;
            state.stuck = state.stuck.escalated();
            if entering {
                state.opposite_heading = (pose.yaw + 180.0).rem_euclid(360.0);
                state.turning = true;
                state.stuck_episodes += 1;
                warn!(
                    "Rover stuck at ({:.1}, {:.1}), episode {}; turning toward {:.0}°",
                    pose.x, pose.y, state.stuck_episodes, state.opposite_heading
                );
            } else if state.stuck == StuckLevel::StuckAgain {
                warn!("Still stuck after turning, escalating to reverse");
            }
        } else {
            if state.stuck.is_stuck() {
                debug!("Stuck cleared at ({:.1}, {:.1})", pose.x, pose.y);
            }
            state.stuck = StuckLevel::NotStuck;
            state.turning = false;
        }

        self.baseline = Some(current);
    }

    /// Time since the last evaluation, if one has happened.
    pub fn baseline_age(&self, total_time: f64) -> Option<f64> {
        self.baseline.map(|b| total_time - b.time)
    }

    /// Drop the baseline (mission restart).
    pub fn reset(&mut self) {
        self.baseline = None;
    }
}

/// Decadegree bucket of a heading: headings that round to the same
/// multiple of 10° share a bucket, with 360° wrapping onto 0°.
pub fn decadegree_bucket(deg: f32) -> i32 {
    ((deg / 10.0).round() as i32).rem_euclid(36)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StuckConfig;

    fn detector() -> StuckDetector {
        StuckDetector::new(&StuckConfig::default())
    }

    #[test]
    fn test_first_tick_captures_baseline() {
        let mut det = detector();
        let mut state = RoverState::new();
        let pose = RoverPose::new(10.0, 10.0, 0.0, 0.0);

        det.update(&mut state, &pose, 0.0, false);
        assert_eq!(state.stuck, StuckLevel::NotStuck);
        assert_eq!(det.baseline_age(0.0), Some(0.0));
    }

    #[test]
    fn test_no_evaluation_inside_window() {
        let mut det = detector();
        let mut state = RoverState::new();
        let pose = RoverPose::new(10.0, 10.0, 0.0, 0.0);

        det.update(&mut state, &pose, 0.0, false);
        det.update(&mut state, &pose, 3.0, false);
        assert_eq!(state.stuck, StuckLevel::NotStuck);
    }

    #[test]
    fn test_escalation_over_two_windows() {
        let mut det = detector();
        let mut state = RoverState::new();
        let pose = RoverPose::new(10.0, 10.0, 90.0, 0.0);

        det.update(&mut state, &pose, 0.0, false);

        det.update(&mut state, &pose, 6.0, false);
        assert_eq!(state.stuck, StuckLevel::Stuck);
        assert_eq!(state.stuck_episodes, 1);
        assert!(state.turning);
        assert!((state.opposite_heading - 270.0).abs() < 1e-4);

        // Second failed window (the recovery turn was interrupted and
        // the flag dropped, but the rover still has not moved).
        state.turning = false;
        det.update(&mut state, &pose, 12.0, false);
        assert_eq!(state.stuck, StuckLevel::StuckAgain);
        // The escape heading from the first entry is kept.
        assert!((state.opposite_heading - 270.0).abs() < 1e-4);
        assert_eq!(state.stuck_episodes, 1);
    }

    #[test]
    fn test_movement_clears_stuck() {
        let mut det = detector();
        let mut state = RoverState::new();

        det.update(&mut state, &RoverPose::new(10.0, 10.0, 0.0, 0.0), 0.0, false);
        det.update(&mut state, &RoverPose::new(10.0, 10.0, 0.0, 0.0), 6.0, false);
        assert_eq!(state.stuck, StuckLevel::Stuck);

        // A whole unit of displacement before the next window
        state.turning = false;
        det.update(&mut state, &RoverPose::new(11.2, 10.0, 0.0, 0.5), 12.0, false);
        assert_eq!(state.stuck, StuckLevel::NotStuck);
        assert!(!state.turning);
    }

    #[test]
    fn test_sub_unit_drift_still_counts_as_unmoved() {
        let mut det = detector();
        let mut state = RoverState::new();

        det.update(&mut state, &RoverPose::new(10.2, 10.0, 0.0, 0.0), 0.0, false);
        det.update(&mut state, &RoverPose::new(10.3, 10.1, 0.0, 0.0), 6.0, false);
        assert_eq!(state.stuck, StuckLevel::Stuck);
    }

    #[test]
    fn test_turning_suppresses_escalation() {
        let mut det = detector();
        let mut state = RoverState::new();
        state.turning = true;
        let pose = RoverPose::new(10.0, 10.0, 0.0, 0.0);

        det.update(&mut state, &pose, 0.0, false);
        det.update(&mut state, &pose, 6.0, false);
        assert_eq!(state.stuck, StuckLevel::NotStuck);
        // A four-wheel turn holding position is not stuck; the flag is
        // dropped so the next window evaluates fresh.
        assert!(!state.turning);
    }

    #[test]
    fn test_pickup_suppresses_escalation() {
        let mut det = detector();
        let mut state = RoverState::new();
        let pose = RoverPose::new(10.0, 10.0, 0.0, 0.0);

        det.update(&mut state, &pose, 0.0, true);
        det.update(&mut state, &pose, 6.0, true);
        assert_eq!(state.stuck, StuckLevel::NotStuck);
    }

    #[test]
    fn test_opposite_heading_wraps() {
        let mut det = detector();
        let mut state = RoverState::new();
        let pose = RoverPose::new(10.0, 10.0, 270.0, 0.0);

        det.update(&mut state, &pose, 0.0, false);
        det.update(&mut state, &pose, 6.0, false);
        assert!((state.opposite_heading - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_decadegree_bucket() {
        assert_eq!(decadegree_bucket(0.0), 0);
        assert_eq!(decadegree_bucket(4.9), 0);
        assert_eq!(decadegree_bucket(5.1), 1);
        assert_eq!(decadegree_bucket(90.0), 9);
        // 360 wraps onto 0
        assert_eq!(decadegree_bucket(359.9), 0);
        assert_eq!(decadegree_bucket(355.1), 0);
    }
}
