//! Shared helpers for driving the rover core in integration tests.

#![allow(dead_code)]

use anvesha_nav::{RoverConfig, RoverPose, TickInput};
use image::{Rgb, RgbImage};

/// A frame of one uniform color at the configured camera dimensions.
pub fn uniform_frame(config: &RoverConfig, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(
        config.perspective.frame_width,
        config.perspective.frame_height,
        Rgb(color),
    )
}

/// Bright navigable ground everywhere.
pub fn open_ground(config: &RoverConfig) -> RgbImage {
    uniform_frame(config, [200, 200, 200])
}

/// Dark obstacle everywhere.
pub fn blocked_ground(config: &RoverConfig) -> RgbImage {
    uniform_frame(config, [20, 20, 20])
}

/// A tick with no pickup activity.
pub fn tick_at(frame: RgbImage, pose: RoverPose, total_time: f64) -> TickInput {
    TickInput {
        frame,
        pose,
        total_time,
        picking_up: false,
        near_sample: false,
    }
}
