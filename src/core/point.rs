//! Coordinate types for the rover, polar, and world frames.

use serde::{Deserialize, Serialize};

/// Rover-centric Cartesian point in warped-image pixel units.
///
/// Origin is the camera footprint at image bottom-center: x grows
/// forward (up the warped image), y grows to the rover's left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoverPoint {
    /// Forward offset (pixels).
    pub x: f32,
    /// Leftward offset (pixels).
    pub y: f32,
}

impl RoverPoint {
    /// Create a new rover-frame point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance from the rover origin.
    #[inline]
    pub fn distance(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Bearing from the forward axis in radians (positive = left).
    #[inline]
    pub fn bearing(&self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Convert to polar coordinates (distance, bearing).
    #[inline]
    pub fn to_polar(self) -> PolarPoint {
        PolarPoint {
            distance: self.distance(),
            bearing: self.bearing(),
        }
    }
}

/// Rover-centric polar point.
///
/// Bearing is radians counter-clockwise from the forward axis, so a
/// positive bearing points to the rover's left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    /// Distance from the rover origin (pixels).
    pub distance: f32,
    /// Bearing from forward (radians, positive = left).
    pub bearing: f32,
}

impl PolarPoint {
    /// Bearing in degrees.
    #[inline]
    pub fn bearing_deg(&self) -> f32 {
        self.bearing.to_degrees()
    }
}

/// Floating-point world coordinates, in world grid units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    /// Create a new world point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer cell coordinates into the world confidence map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    /// Create a new grid coordinate.
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
