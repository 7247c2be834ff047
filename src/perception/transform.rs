//! Geometric transforms between the camera, rover, and world frames.
//!
//! Three coordinate frames are involved:
//!
//! - **image**: pixel (col, row) in the camera or warped frame
//! - **rover**: x forward, y left, origin at image bottom-center
//! - **world**: the fixed grid the confidence map lives in
//!
//! The perspective un-warp maps the calibrated ground quadrilateral to
//! a small rectangle at image bottom-center, turning the camera view
//! into a top-down view at a fixed pixels-per-world-unit scale. The
//! remaining transforms are pure 2D rotation, scaling, translation, and
//! saturating grid clipping.

use image::{Rgb, RgbImage};
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

use crate::config::PerspectiveConfig;
use crate::core::{GridCoord, RoverPoint, RoverPose, WorldPoint};
use crate::error::{AnveshaError, Result};
use crate::perception::TerrainMask;

/// Perspective un-warp from camera view to top-down view.
///
/// Built once from calibration; applying it is pure per-pixel inverse
/// mapping with bilinear sampling. Output pixels whose pre-image falls
/// outside the camera frame are black, which downstream classification
/// treats as obstacle — the warped border is deliberately
/// non-navigable.
#[derive(Clone, Debug)]
pub struct PerspectiveWarp {
    /// Maps output (top-down) pixels back to source pixels.
    inverse: Matrix3<f64>,
    width: u32,
    height: u32,
}

impl PerspectiveWarp {
    /// Build the warp for the configured camera geometry.
    ///
    /// Fails if the calibration corners are degenerate (collinear or
    /// repeated), which would make the mapping non-invertible.
    pub fn new(config: &PerspectiveConfig) -> Result<Self> {
        let w = config.frame_width as f64;
        let h = config.frame_height as f64;
        let s = config.dst_half_width as f64;
        let off = config.bottom_offset as f64;

        // Destination rectangle at image bottom-center, ordered to
        // match the source corners: bottom-left, bottom-right,
        // top-right, top-left.
        let dst = [
            [w / 2.0 - s, h - off],
            [w / 2.0 + s, h - off],
            [w / 2.0 + s, h - 2.0 * s - off],
            [w / 2.0 - s, h - 2.0 * s - off],
        ];

        let src = [
            [config.src_corners[0][0] as f64, config.src_corners[0][1] as f64],
            [config.src_corners[1][0] as f64, config.src_corners[1][1] as f64],
            [config.src_corners[2][0] as f64, config.src_corners[2][1] as f64],
            [config.src_corners[3][0] as f64, config.src_corners[3][1] as f64],
        ];

        let forward = solve_homography(&src, &dst)?;
        let inverse = forward.try_inverse().ok_or_else(|| {
            AnveshaError::Calibration("perspective homography is singular".into())
        })?;

        Ok(Self {
            inverse,
            width: config.frame_width,
            height: config.frame_height,
        })
    }

    /// Warp a camera frame into the top-down view.
    ///
    /// The output has the same dimensions as the configured frame.
    pub fn apply(&self, frame: &RgbImage) -> RgbImage {
        let mut warped = RgbImage::new(self.width, self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                let p = self.inverse * Vector3::new(x as f64, y as f64, 1.0);
                let px = if p[2].abs() < 1e-12 {
                    Rgb([0, 0, 0])
                } else {
                    bilinear_sample(frame, (p[0] / p[2]) as f32, (p[1] / p[2]) as f32)
                };
                warped.put_pixel(x, y, px);
            }
        }

        warped
    }
}

/// Solve the 3x3 homography mapping four source points onto four
/// destination points, with h22 fixed at 1.
fn solve_homography(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Result<Matrix3<f64>> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for i in 0..4 {
        let [x, y] = src[i];
        let [u, v] = dst[i];

        a[(2 * i, 0)] = x;
        a[(2 * i, 1)] = y;
        a[(2 * i, 2)] = 1.0;
        a[(2 * i, 6)] = -x * u;
        a[(2 * i, 7)] = -y * u;
        b[2 * i] = u;

        a[(2 * i + 1, 3)] = x;
        a[(2 * i + 1, 4)] = y;
        a[(2 * i + 1, 5)] = 1.0;
        a[(2 * i + 1, 6)] = -x * v;
        a[(2 * i + 1, 7)] = -y * v;
        b[2 * i + 1] = v;
    }

    let h = a.lu().solve(&b).ok_or_else(|| {
        AnveshaError::Calibration("perspective corners are degenerate".into())
    })?;

    Ok(Matrix3::new(
        h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0,
    ))
}

/// Sample an RGB image at a sub-pixel position with bilinear
/// interpolation. Out-of-bounds positions sample as black.
fn bilinear_sample(img: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let (w, h) = img.dimensions();
    if x < 0.0 || y < 0.0 || x >= (w - 1) as f32 || y >= (h - 1) as f32 {
        return Rgb([0, 0, 0]);
    }
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = img.get_pixel(x0, y0);
    let p10 = img.get_pixel(x0 + 1, y0);
    let p01 = img.get_pixel(x0, y0 + 1);
    let p11 = img.get_pixel(x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let v = (1.0 - fx) * (1.0 - fy) * p00[c] as f32
            + fx * (1.0 - fy) * p10[c] as f32
            + (1.0 - fx) * fy * p01[c] as f32
            + fx * fy * p11[c] as f32;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Convert a mask's set pixels to rover-frame points.
///
/// The rover sits at image bottom-center looking up the image: a pixel
/// at (col, row) becomes x = height - row (forward), y = width/2 - col
/// (left).
pub fn rover_points(mask: &TerrainMask) -> Vec<RoverPoint> {
    let height = mask.height() as f32;
    let half_width = mask.width() as f32 / 2.0;

    mask.iter_set()
        .map(|(col, row)| RoverPoint::new(height - row as f32, half_width - col as f32))
        .collect()
}

/// Rotate a rover-frame point by the rover's yaw (degrees).
pub fn rotate_point(p: RoverPoint, yaw_deg: f32) -> RoverPoint {
    let yaw = yaw_deg.to_radians();
    let (sin, cos) = yaw.sin_cos();
    RoverPoint::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// Scale a rotated point down to world units and translate it to the
/// rover's world position.
pub fn translate_scale(p: RoverPoint, pose: &RoverPose, scale: f32) -> WorldPoint {
    WorldPoint::new(p.x / scale + pose.x, p.y / scale + pose.y)
}

/// Round a world point to the nearest grid cell, saturating at the
/// grid edges. Never wraps.
pub fn clip_to_grid(p: WorldPoint, world_size: usize) -> GridCoord {
    let max = (world_size - 1) as f32;
    GridCoord::new(
        p.x.round().clamp(0.0, max) as i32,
        p.y.round().clamp(0.0, max) as i32,
    )
}

/// Project rover-frame points into world grid cells: rotate by yaw,
/// scale and translate to the rover position, clip to the grid.
///
/// The output is aligned index-for-index with the input; terrain
/// statistics rely on this to pair each rover-frame point with its
/// world cell.
pub fn to_world(
    points: &[RoverPoint],
    pose: &RoverPose,
    scale: f32,
    world_size: usize,
) -> Vec<GridCoord> {
    points
        .iter()
        .map(|&p| {
            let rotated = rotate_point(p, pose.yaw);
            clip_to_grid(translate_scale(rotated, pose, scale), world_size)
        })
        .collect()
}
