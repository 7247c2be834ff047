//! World confidence map.
//!
//! A fixed-size square grid accumulating per-class observation counts:
//! how often each cell was seen as obstacle, rock sample, or navigable
//! ground. Counts only ever grow, with one exception: a rock
//! observation is authoritative and zeroes the cell's obstacle and
//! navigable history, since a sample sitting on a cell explains away
//! whatever the classifier thought was there before.
//!
//! Updates are gated on pose stability. The camera-to-world projection
//! assumes a level rover, so frames taken during roll/pitch excursions
//! or while reversing would smear misprojected pixels into the map;
//! those ticks are skipped entirely rather than blended in.
//!
//! Storage is one array per counter (the structure-of-arrays layout),
//! indexed row-major by cell.

use crate::config::WorldMapConfig;
use crate::core::{GridCoord, RoverPose};

/// Per-cell observation counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellCounts {
    /// Times this cell was classified as obstacle.
    pub obstacle: u32,
    /// Times this cell was classified as rock sample.
    pub rock: u32,
    /// Times this cell was classified as navigable ground.
    pub navigable: u32,
}

/// Map coverage statistics (cells with any confidence per class).
#[derive(Clone, Copy, Debug, Default)]
pub struct MapCoverage {
    /// Cells with at least one navigable observation.
    pub navigable_cells: usize,
    /// Cells with at least one obstacle observation.
    pub obstacle_cells: usize,
    /// Cells with at least one rock observation.
    pub rock_cells: usize,
    /// Navigable cells at or above the novelty threshold.
    pub confirmed_navigable_cells: usize,
    /// Total cells in the grid.
    pub total_cells: usize,
}

/// The persistent world confidence map.
#[derive(Clone, Debug)]
pub struct WorldMap {
    size: usize,
    obstacle: Vec<u32>,
    rock: Vec<u32>,
    navigable: Vec<u32>,
}

impl WorldMap {
    /// Create an empty map of `size` x `size` cells.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            obstacle: vec![0; size * size],
            rock: vec![0; size * size],
            navigable: vec![0; size * size],
        }
    }

    /// Side length of the grid in cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, cell: GridCoord) -> usize {
        debug_assert!(cell.x >= 0 && (cell.x as usize) < self.size);
        debug_assert!(cell.y >= 0 && (cell.y as usize) < self.size);
        cell.y as usize * self.size + cell.x as usize
    }

    /// All three counters at a cell.
    pub fn counts(&self, cell: GridCoord) -> CellCounts {
        let i = self.index(cell);
        CellCounts {
            obstacle: self.obstacle[i],
            rock: self.rock[i],
            navigable: self.navigable[i],
        }
    }

    /// Navigable-hit count at a cell.
    #[inline]
    pub fn navigable_hits(&self, cell: GridCoord) -> u32 {
        self.navigable[self.index(cell)]
    }

    /// Obstacle-hit count at a cell.
    #[inline]
    pub fn obstacle_hits(&self, cell: GridCoord) -> u32 {
        self.obstacle[self.index(cell)]
    }

    /// Rock-hit count at a cell.
    #[inline]
    pub fn rock_hits(&self, cell: GridCoord) -> u32 {
        self.rock[self.index(cell)]
    }

    /// Integrate one tick's world-projected observations.
    ///
    /// Skips the whole update (and returns `false`) when the pose
    /// stability gate fails. Otherwise each class's cells gain one
    /// observation apiece — a cell observed by the same class through
    /// several pixels in one tick still counts once — and cells that
    /// gained a rock observation have their obstacle and navigable
    /// counters zeroed.
    ///
    /// This is the only write path into the map.
    pub fn observe(
        &mut self,
        pose: &RoverPose,
        config: &WorldMapConfig,
        obstacle: &[GridCoord],
        rock: &[GridCoord],
        navigable: &[GridCoord],
    ) -> bool {
        if !pose_is_stable(pose, config) {
            return false;
        }

        for cell in unique_cells(obstacle) {
            let i = self.index(cell);
            self.obstacle[i] = self.obstacle[i].saturating_add(1);
        }
        for cell in unique_cells(navigable) {
            let i = self.index(cell);
            self.navigable[i] = self.navigable[i].saturating_add(1);
        }
        // Rock last: the override must win over this tick's own
        // obstacle/navigable increments at shared cells.
        for cell in unique_cells(rock) {
            let i = self.index(cell);
            self.rock[i] = self.rock[i].saturating_add(1);
            self.obstacle[i] = 0;
            self.navigable[i] = 0;
        }

        true
    }

    /// Read-only coverage statistics for host telemetry.
    pub fn coverage(&self, novelty_threshold: u32) -> MapCoverage {
        let mut coverage = MapCoverage {
            total_cells: self.size * self.size,
            ..MapCoverage::default()
        };
        for i in 0..self.navigable.len() {
            if self.navigable[i] > 0 {
                coverage.navigable_cells += 1;
                if self.navigable[i] >= novelty_threshold {
                    coverage.confirmed_navigable_cells += 1;
                }
            }
            if self.obstacle[i] > 0 {
                coverage.obstacle_cells += 1;
            }
            if self.rock[i] > 0 {
                coverage.rock_cells += 1;
            }
        }
        coverage
    }

    /// Clear all counters (mission restart).
    pub fn clear(&mut self) {
        self.obstacle.fill(0);
        self.rock.fill(0);
        self.navigable.fill(0);
    }
}

/// Pose stability gate for map updates: roll and pitch within their
/// tolerance of level (either side of the 0°/360° seam) and the rover
/// not reversing.
pub fn pose_is_stable(pose: &RoverPose, config: &WorldMapConfig) -> bool {
    let roll_ok = pose.roll < config.roll_tolerance || pose.roll > 360.0 - config.roll_tolerance;
    let pitch_ok =
        pose.pitch < config.pitch_tolerance || pose.pitch > 360.0 - config.pitch_tolerance;
    roll_ok && pitch_ok && pose.velocity >= 0.0
}

fn unique_cells(cells: &[GridCoord]) -> Vec<GridCoord> {
    let mut unique = cells.to_vec();
    unique.sort_unstable();
    unique.dedup();
    unique
}
