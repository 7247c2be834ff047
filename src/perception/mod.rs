//! Perception pipeline: camera frame to terrain geometry and statistics.
//!
//! Per tick the pipeline runs in a fixed order:
//!
//! 1. [`PerspectiveWarp`] un-warps the camera frame into a top-down view.
//! 2. [`classify`] thresholds the warped frame into per-class masks.
//! 3. [`rover_points`] / [`to_world`] project mask pixels into the
//!    rover frame and the world grid.
//! 4. [`TerrainSummary`] reduces the projected point sets to the scalar
//!    signals the drive controller consumes.
//!
//! Everything here is ephemeral per tick; the only persistent artifact
//! of perception is the world confidence map, written by
//! [`crate::grid::WorldMap::observe`].

mod classify;
mod stats;
mod transform;

pub use classify::{classify, ColorBand, TerrainMask, TerrainMasks};
pub use stats::TerrainSummary;
pub use transform::{
    clip_to_grid, rotate_point, rover_points, to_world, translate_scale, PerspectiveWarp,
};
