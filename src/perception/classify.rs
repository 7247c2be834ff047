//! Color-band terrain classification.
//!
//! The warped frame is thresholded into three binary masks: navigable
//! ground (bright), obstacles (dark), and rock samples (a yellow-ish
//! band). The bands are calibrated independently and may overlap; a
//! pixel can be both navigable and obstacle if the thresholds say so.
//! Rock-versus-other conflicts are resolved later by the world map's
//! rock-override rule; navigable/obstacle overlap is tolerated and the
//! downstream statistics operate per mask.

use image::{Rgb, RgbImage};

use crate::config::ColorConfig;

/// Inclusive RGB band: a pixel matches when every channel lies within
/// [min, max].
#[derive(Clone, Copy, Debug)]
pub struct ColorBand {
    pub min: [u8; 3],
    pub max: [u8; 3],
}

impl ColorBand {
    /// Band matching every channel at or above `min`.
    pub fn at_least(min: [u8; 3]) -> Self {
        Self {
            min,
            max: [255, 255, 255],
        }
    }

    /// Band matching every channel at or below `max`.
    pub fn at_most(max: [u8; 3]) -> Self {
        Self { min: [0, 0, 0], max }
    }

    /// Band matching every channel within [min, max].
    pub fn between(min: [u8; 3], max: [u8; 3]) -> Self {
        Self { min, max }
    }

    /// Does the pixel fall inside the band?
    #[inline]
    pub fn contains(&self, px: &Rgb<u8>) -> bool {
        (0..3).all(|c| px[c] >= self.min[c] && px[c] <= self.max[c])
    }
}

/// Binary mask over a warped frame.
#[derive(Clone, Debug)]
pub struct TerrainMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl TerrainMask {
    /// Create an empty mask of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width * height) as usize],
        }
    }

    /// Mask width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set the pixel at (col, row).
    #[inline]
    pub fn set(&mut self, col: u32, row: u32) {
        self.bits[(row * self.width + col) as usize] = true;
    }

    /// Is the pixel at (col, row) set?
    #[inline]
    pub fn get(&self, col: u32, row: u32) -> bool {
        self.bits[(row * self.width + col) as usize]
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Iterate set pixels as (col, row), row-major.
    pub fn iter_set(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(move |(i, _)| (i as u32 % width, i as u32 / width))
    }
}

/// The three per-class masks produced from one warped frame.
#[derive(Clone, Debug)]
pub struct TerrainMasks {
    pub navigable: TerrainMask,
    pub obstacle: TerrainMask,
    pub rock: TerrainMask,
}

/// Classify a warped frame into navigable/obstacle/rock masks using
/// the calibrated color bands.
pub fn classify(frame: &RgbImage, config: &ColorConfig) -> TerrainMasks {
    let (w, h) = frame.dimensions();
    let navigable_band = ColorBand::at_least(config.navigable_min);
    let obstacle_band = ColorBand::at_most(config.obstacle_max);
    let rock_band = ColorBand::between(config.rock_min, config.rock_max);

    let mut masks = TerrainMasks {
        navigable: TerrainMask::new(w, h),
        obstacle: TerrainMask::new(w, h),
        rock: TerrainMask::new(w, h),
    };

    for (x, y, px) in frame.enumerate_pixels() {
        if navigable_band.contains(px) {
            masks.navigable.set(x, y);
        }
        if obstacle_band.contains(px) {
            masks.obstacle.set(x, y);
        }
        if rock_band.contains(px) {
            masks.rock.set(x, y);
        }
    }

    masks
}
