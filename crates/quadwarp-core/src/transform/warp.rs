//! Nearest-neighbor inverse warp.
//!
//! The warp uses inverse mapping: for each pixel in the output image we
//! back-project through the inverted homography and copy the single closest
//! source pixel. Pixels that land outside the source (or at infinity) keep
//! their transparent default.
//!
//! # Sampling
//!
//! ```text
//! Center:  (u, v, w) = H⁻¹ · (x + 0.5, y + 0.5, 1)    src = floor(u / w, v / w)
//! Corner:  (u, v, w) = H⁻¹ · (x, y, 1)                src = round(u / w, v / w)
//! ```
//!
//! [`RoundingMode`] picks how `round` breaks ties on the corner grid.

use super::homography::{self, SolverOptions};
use crate::error::WarpError;
use crate::geometry::PointQuad;
use crate::matrix::Matrix3x3;
use crate::raster::{checked_len, RasterImage, CHANNELS};
use serde::{Deserialize, Serialize};

/// Where inside a destination pixel the warp samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SampleGrid {
    /// Sample at the pixel center `(x + 0.5, y + 0.5)`; source pixel `i`
    /// covers `[i, i + 1)`.
    #[default]
    Center,
    /// Sample at the integer coordinate `(x, y)`.
    Corner,
}

impl SampleGrid {
    #[inline]
    fn offset(self) -> f64 {
        match self {
            SampleGrid::Center => 0.5,
            SampleGrid::Corner => 0.0,
        }
    }

    /// Snap a back-projected source coordinate to a pixel index.
    #[inline]
    fn source_index(self, v: f64, rounding: RoundingMode) -> f64 {
        match self {
            SampleGrid::Center => v.floor(),
            SampleGrid::Corner => rounding.round(v),
        }
    }
}

/// Tie-breaking rule used to snap a source coordinate to a pixel index on
/// [`SampleGrid::Corner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundingMode {
    /// Halves round away from zero (`2.5 -> 3`, `-2.5 -> -3`).
    #[default]
    HalfAwayFromZero,
    /// Halves round to the nearest even integer (`2.5 -> 2`, `3.5 -> 4`).
    HalfToEven,
    /// Halves round toward positive infinity (`-2.5 -> -2`), as browsers do.
    HalfUp,
}

impl RoundingMode {
    #[inline]
    pub fn round(self, v: f64) -> f64 {
        match self {
            RoundingMode::HalfAwayFromZero => v.round(),
            RoundingMode::HalfToEven => v.round_ties_even(),
            RoundingMode::HalfUp => {
                let r = v.round();
                if v - r == 0.5 {
                    r + 1.0
                } else {
                    r
                }
            }
        }
    }
}

/// How the destination rows are distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    #[default]
    Serial,
    /// Split destination rows across the global rayon thread pool.
    #[cfg(feature = "parallel")]
    Parallel,
}

/// Options for [`warp_with`] and [`perspective_transform_with`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WarpOptions {
    pub sample_grid: SampleGrid,
    pub rounding: RoundingMode,
    pub strategy: ExecutionStrategy,
    pub solver: SolverOptions,
}

impl WarpOptions {
    /// Sampling exactly as a plain `round(H⁻¹ · (x, y, 1))` loop does.
    pub fn corner_sampled() -> Self {
        Self {
            sample_grid: SampleGrid::Corner,
            ..Self::default()
        }
    }
}

/// Warp `source` into a `dest_width x dest_height` image with default options.
///
/// `forward` maps source coordinates to destination coordinates; it is
/// inverted here to drive the backward mapping.
pub fn warp(
    source: &RasterImage,
    forward: &Matrix3x3,
    dest_width: u32,
    dest_height: u32,
) -> Result<RasterImage, WarpError> {
    warp_with(source, forward, dest_width, dest_height, &WarpOptions::default())
}

/// Warp `source` into a `dest_width x dest_height` image.
///
/// # Errors
///
/// - [`WarpError::InvalidDimensions`] if a source or destination dimension is
///   zero, or its RGBA buffer size overflows `usize`
/// - [`WarpError::InvalidPixelData`] if the source buffer does not match its size
/// - [`WarpError::SingularMatrix`] if `forward` cannot be inverted
///
/// All checks run before the destination is allocated.
pub fn warp_with(
    source: &RasterImage,
    forward: &Matrix3x3,
    dest_width: u32,
    dest_height: u32,
    options: &WarpOptions,
) -> Result<RasterImage, WarpError> {
    checked_len(dest_width, dest_height)?;

    let expected = checked_len(source.width, source.height)?;
    if source.pixels.len() != expected {
        return Err(WarpError::InvalidPixelData {
            expected,
            actual: source.pixels.len(),
        });
    }

    let inverse = forward.invert_with(options.solver.determinant_tolerance)?;

    log::debug!(
        "warping {}x{} -> {}x{} ({:?}, {:?}, {:?})",
        source.width,
        source.height,
        dest_width,
        dest_height,
        options.sample_grid,
        options.rounding,
        options.strategy
    );

    let mut output = RasterImage::transparent(dest_width, dest_height)?;
    let stride = output.stride();

    match options.strategy {
        ExecutionStrategy::Serial => {
            output
                .pixels
                .chunks_exact_mut(stride)
                .enumerate()
                .for_each(|(y, row)| sample_row(source, &inverse, y as u32, row, options));
        }
        #[cfg(feature = "parallel")]
        ExecutionStrategy::Parallel => {
            use rayon::prelude::*;

            output
                .pixels
                .par_chunks_exact_mut(stride)
                .enumerate()
                .for_each(|(y, row)| sample_row(source, &inverse, y as u32, row, options));
        }
    }

    Ok(output)
}

/// Fill one destination row by back-projecting each of its pixels.
fn sample_row(
    source: &RasterImage,
    inverse: &Matrix3x3,
    y: u32,
    row: &mut [u8],
    options: &WarpOptions,
) {
    let grid = options.sample_grid;
    let offset = grid.offset();
    let gy = y as f64 + offset;
    let src_stride = source.stride();

    for (x, dst_pixel) in row.chunks_exact_mut(CHANNELS).enumerate() {
        let [sx, sy, sw] = inverse.mul_vec([x as f64 + offset, gy, 1.0]);

        // Point at infinity
        if sw == 0.0 {
            continue;
        }

        let px = grid.source_index(sx / sw, options.rounding);
        let py = grid.source_index(sy / sw, options.rounding);
        if !px.is_finite() || !py.is_finite() {
            continue;
        }

        let (px, py) = (px as i64, py as i64);
        if !source.contains(px, py) {
            continue;
        }

        let src_idx = py as usize * src_stride + px as usize * CHANNELS;
        dst_pixel.copy_from_slice(&source.pixels[src_idx..src_idx + CHANNELS]);
    }
}

/// Rectify the region bounded by `quad` into a `dest_width x dest_height` image.
///
/// The quad's points map, in order, onto the destination corners top-left,
/// top-right, bottom-right, bottom-left.
pub fn perspective_transform(
    source: &RasterImage,
    quad: &PointQuad,
    dest_width: u32,
    dest_height: u32,
) -> Result<RasterImage, WarpError> {
    perspective_transform_with(source, quad, dest_width, dest_height, &WarpOptions::default())
}

/// [`perspective_transform`] with explicit options.
///
/// # Errors
///
/// - [`WarpError::InvalidDimensions`] if a destination dimension is zero or too large
/// - [`WarpError::SingularSystem`] if `quad` is degenerate
/// - Any error of [`warp_with`]
pub fn perspective_transform_with(
    source: &RasterImage,
    quad: &PointQuad,
    dest_width: u32,
    dest_height: u32,
    options: &WarpOptions,
) -> Result<RasterImage, WarpError> {
    checked_len(dest_width, dest_height)?;

    let target = PointQuad::from_rect(dest_width, dest_height);
    let forward = homography::solve_with(quad, &target, &options.solver)?;
    warp_with(source, &forward, dest_width, dest_height, options)
}
