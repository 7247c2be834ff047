//! Telemetry pose for the rover.

use serde::{Deserialize, Serialize};

/// Rover pose as reported by telemetry each tick.
///
/// Position is in world grid units, angles in degrees. Yaw is
/// counter-clockwise from the world +X axis. Roll and pitch are
/// reported in [0, 360): a level rover reads near 0° or near 360°.
/// Velocity is signed; negative values mean the rover is moving
/// backward.
///
/// The pose is externally supplied and read-only to the core; there is
/// no state estimation here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoverPose {
    /// World X position (grid units).
    pub x: f32,
    /// World Y position (grid units).
    pub y: f32,
    /// Heading, degrees counter-clockwise from world +X.
    pub yaw: f32,
    /// Pitch, degrees in [0, 360).
    pub pitch: f32,
    /// Roll, degrees in [0, 360).
    pub roll: f32,
    /// Signed forward velocity.
    pub velocity: f32,
}

impl RoverPose {
    /// Create a pose with level attitude and the given planar state.
    pub fn new(x: f32, y: f32, yaw: f32, velocity: f32) -> Self {
        Self {
            x,
            y,
            yaw,
            pitch: 0.0,
            roll: 0.0,
            velocity,
        }
    }

    /// Yaw in radians.
    #[inline]
    pub fn yaw_rad(&self) -> f32 {
        self.yaw.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_new_is_level() {
        let pose = RoverPose::new(10.0, 20.0, 45.0, 1.5);
        assert_eq!(pose.pitch, 0.0);
        assert_eq!(pose.roll, 0.0);
        assert!((pose.yaw_rad() - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }
}
