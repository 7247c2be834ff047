//! Configuration loading for AnveshaNav.
//!
//! All calibration constants live here and load from a single TOML
//! file with sensible defaults, so a rover can run with no config file
//! at all.
//!
//! ## Example TOML
//!
//! ```toml
//! [perspective]
//! frame_width = 320
//! frame_height = 160
//! dst_half_width = 5.0
//! bottom_offset = 6.0
//!
//! [color]
//! navigable_min = [171, 153, 141]
//! obstacle_max = [170, 152, 140]
//!
//! [map]
//! world_size = 200
//! world_scale = 10.0
//!
//! [drive]
//! max_velocity = 2.0
//! throttle_set = 0.2
//!
//! [stuck]
//! window_secs = 5.0
//! ```

use crate::error::{AnveshaError, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoverConfig {
    #[serde(default)]
    pub perspective: PerspectiveConfig,
    #[serde(default)]
    pub color: ColorConfig,
    #[serde(default)]
    pub map: WorldMapConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub stuck: StuckConfig,
}

/// Camera perspective calibration.
///
/// The four source corners are measured once from a calibration frame
/// showing a square patch of ground ahead of the rover; the warp maps
/// them to a small rectangle sitting at image bottom-center.
#[derive(Clone, Debug, Deserialize)]
pub struct PerspectiveConfig {
    /// Camera frame width in pixels (default: 320).
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,

    /// Camera frame height in pixels (default: 160).
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,

    /// Source quadrilateral corners in image pixels, ordered
    /// bottom-left, bottom-right, top-right, top-left.
    #[serde(default = "default_src_corners")]
    pub src_corners: [[f32; 2]; 4],

    /// Half-width of the destination rectangle in pixels (default: 5.0).
    #[serde(default = "default_dst_half_width")]
    pub dst_half_width: f32,

    /// Vertical offset of the destination rectangle above the image
    /// bottom edge, in pixels (default: 6.0).
    #[serde(default = "default_bottom_offset")]
    pub bottom_offset: f32,
}

/// Color-band thresholds for terrain classification (RGB, inclusive).
#[derive(Clone, Debug, Deserialize)]
pub struct ColorConfig {
    /// Navigable terrain: every channel at or above this triple.
    #[serde(default = "default_navigable_min")]
    pub navigable_min: [u8; 3],

    /// Obstacle terrain: every channel at or below this triple.
    #[serde(default = "default_obstacle_max")]
    pub obstacle_max: [u8; 3],

    /// Rock sample band, lower bound.
    #[serde(default = "default_rock_min")]
    pub rock_min: [u8; 3],

    /// Rock sample band, upper bound.
    #[serde(default = "default_rock_max")]
    pub rock_max: [u8; 3],
}

/// World confidence map parameters and the pose-stability gate.
#[derive(Clone, Debug, Deserialize)]
pub struct WorldMapConfig {
    /// Side length of the square world grid in cells (default: 200).
    #[serde(default = "default_world_size")]
    pub world_size: usize,

    /// Warped-image pixels per world grid unit (default: 10.0).
    #[serde(default = "default_world_scale")]
    pub world_scale: f32,

    /// Roll tolerance for map updates, degrees from level (default: 0.4).
    ///
    /// Projection error grows quickly with attitude excursions, so map
    /// writes are skipped outside this band.
    #[serde(default = "default_roll_tolerance")]
    pub roll_tolerance: f32,

    /// Pitch tolerance for map updates, degrees from level (default: 0.3).
    #[serde(default = "default_pitch_tolerance")]
    pub pitch_tolerance: f32,

    /// Navigable-hit count below which a cell still counts as
    /// unmapped territory for the exploration bias (default: 30).
    #[serde(default = "default_novelty_threshold")]
    pub novelty_threshold: u32,
}

/// Drive controller thresholds and set-points.
#[derive(Clone, Debug, Deserialize)]
pub struct DriveConfig {
    /// Navigable-point count below which forward mode stops (default: 125).
    #[serde(default = "default_stop_forward")]
    pub stop_forward: usize,

    /// Navigable-point count required to leave stop mode (default: 900).
    #[serde(default = "default_go_forward")]
    pub go_forward: usize,

    /// Maximum forward velocity; at or above it the rover coasts
    /// (default: 2.0).
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f32,

    /// Throttle set-point for forward driving (default: 0.2).
    #[serde(default = "default_throttle_set")]
    pub throttle_set: f32,

    /// Brake set-point for stopping (default: 10.0).
    #[serde(default = "default_brake_set")]
    pub brake_set: f32,

    /// Frontal clearance at which a collision is flagged while at max
    /// velocity (default: 15.0 pixels).
    #[serde(default = "default_obstacle_distance")]
    pub obstacle_distance: f32,

    /// Distance within which a rock sample can be picked up
    /// (default: 10.0 pixels).
    #[serde(default = "default_rock_pickup_range")]
    pub rock_pickup_range: f32,

    /// Mean rock distance below which a sample counts as nearby
    /// (default: 30.0 pixels).
    #[serde(default = "default_rock_proximity")]
    pub rock_proximity: f32,

    /// Steering gain applied to navigable-mean bearings (default: 0.8).
    #[serde(default = "default_steer_dampener")]
    pub steer_dampener: f32,

    /// Unmapped-point count above which steering blends toward
    /// unexplored territory (default: 30).
    #[serde(default = "default_unmapped_blend_count")]
    pub unmapped_blend_count: usize,
}

/// Stuck detection and recovery parameters.
#[derive(Clone, Debug, Deserialize)]
pub struct StuckConfig {
    /// Debounce window between stuck evaluations, seconds of mission
    /// time (default: 5.0). Short windows false-positive on normal
    /// deceleration.
    #[serde(default = "default_window_secs")]
    pub window_secs: f64,

    /// Throttle commanded while escaping a repeat stuck episode in
    /// reverse (default: -2.0).
    #[serde(default = "default_reverse_throttle")]
    pub reverse_throttle: f32,
}

// Default value functions

fn default_frame_width() -> u32 {
    320
}
fn default_frame_height() -> u32 {
    160
}
fn default_src_corners() -> [[f32; 2]; 4] {
    [[14.0, 140.0], [301.0, 140.0], [200.0, 96.0], [118.0, 96.0]]
}
fn default_dst_half_width() -> f32 {
    5.0
}
fn default_bottom_offset() -> f32 {
    6.0
}

fn default_navigable_min() -> [u8; 3] {
    [171, 153, 141]
}
fn default_obstacle_max() -> [u8; 3] {
    [170, 152, 140]
}
fn default_rock_min() -> [u8; 3] {
    [130, 50, 0]
}
fn default_rock_max() -> [u8; 3] {
    [198, 172, 79]
}

fn default_world_size() -> usize {
    200
}
fn default_world_scale() -> f32 {
    10.0
}
fn default_roll_tolerance() -> f32 {
    0.4
}
fn default_pitch_tolerance() -> f32 {
    0.3
}
fn default_novelty_threshold() -> u32 {
    30
}

fn default_stop_forward() -> usize {
    125
}
fn default_go_forward() -> usize {
    900
}
fn default_max_velocity() -> f32 {
    2.0
}
fn default_throttle_set() -> f32 {
    0.2
}
fn default_brake_set() -> f32 {
    10.0
}
fn default_obstacle_distance() -> f32 {
    15.0
}
fn default_rock_pickup_range() -> f32 {
    10.0
}
fn default_rock_proximity() -> f32 {
    30.0
}
fn default_steer_dampener() -> f32 {
    0.8
}
fn default_unmapped_blend_count() -> usize {
    30
}

fn default_window_secs() -> f64 {
    5.0
}
fn default_reverse_throttle() -> f32 {
    -2.0
}

impl Default for PerspectiveConfig {
    fn default() -> Self {
        Self {
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            src_corners: default_src_corners(),
            dst_half_width: default_dst_half_width(),
            bottom_offset: default_bottom_offset(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            navigable_min: default_navigable_min(),
            obstacle_max: default_obstacle_max(),
            rock_min: default_rock_min(),
            rock_max: default_rock_max(),
        }
    }
}

impl Default for WorldMapConfig {
    fn default() -> Self {
        Self {
            world_size: default_world_size(),
            world_scale: default_world_scale(),
            roll_tolerance: default_roll_tolerance(),
            pitch_tolerance: default_pitch_tolerance(),
            novelty_threshold: default_novelty_threshold(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            stop_forward: default_stop_forward(),
            go_forward: default_go_forward(),
            max_velocity: default_max_velocity(),
            throttle_set: default_throttle_set(),
            brake_set: default_brake_set(),
            obstacle_distance: default_obstacle_distance(),
            rock_pickup_range: default_rock_pickup_range(),
            rock_proximity: default_rock_proximity(),
            steer_dampener: default_steer_dampener(),
            unmapped_blend_count: default_unmapped_blend_count(),
        }
    }
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            reverse_throttle: default_reverse_throttle(),
        }
    }
}

impl RoverConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AnveshaError::Config(format!("Failed to read config file: {}", e)))?;
        let config: RoverConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RoverConfig::default();
        assert_eq!(config.map.world_size, 200);
        assert_eq!(config.drive.stop_forward, 125);
        assert_eq!(config.drive.go_forward, 900);
        assert_eq!(config.color.navigable_min, [171, 153, 141]);
        assert!((config.stuck.window_secs - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RoverConfig = toml::from_str(
            r#"
            [drive]
            max_velocity = 5.0
            throttle_set = 0.5

            [map]
            world_size = 100
            "#,
        )
        .unwrap();

        assert!((config.drive.max_velocity - 5.0).abs() < 1e-6);
        assert!((config.drive.throttle_set - 0.5).abs() < 1e-6);
        assert_eq!(config.map.world_size, 100);
        // Untouched sections keep their defaults
        assert_eq!(config.drive.go_forward, 900);
        assert_eq!(config.perspective.frame_width, 320);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = toml::from_str::<RoverConfig>("drive = 12").unwrap_err();
        let err: crate::error::AnveshaError = err.into();
        assert!(matches!(err, crate::error::AnveshaError::Config(_)));
    }
}
