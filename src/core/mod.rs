//! Core types for the AnveshaNav control loop.
//!
//! All types follow the rover-frame convention used throughout the crate:
//! - **X-axis**: Forward (positive ahead of the rover)
//! - **Y-axis**: Left (positive to the rover's left)
//! - **Bearing**: Counter-clockwise from +X, forward-zero (positive = left)
//!
//! Angles arriving from telemetry (yaw, pitch, roll) are in degrees;
//! roll and pitch are reported in [0, 360) where "level" shows up as a
//! value near 0° or near 360°.
//!
//! ## Type Categories
//!
//! ### Coordinates
//! - [`RoverPoint`]: Rover-centric Cartesian coordinates (warped-image pixels)
//! - [`PolarPoint`]: Rover-centric polar coordinates (distance, bearing)
//! - [`WorldPoint`]: Floating-point world coordinates
//! - [`GridCoord`]: Integer cell indices into the world confidence map
//!
//! ### Rover State
//! - [`RoverPose`]: Telemetry pose (position, yaw, pitch, roll, velocity)

mod point;
mod pose;

pub use point::{GridCoord, PolarPoint, RoverPoint, WorldPoint};
pub use pose::RoverPose;

/// Steer actuator authority in degrees. Steering commands and the
/// bearing statistics that feed them are clipped to this range.
pub const STEER_RANGE_DEG: f32 = 15.0;
