//! Perspective transform operations: homography solving and inverse warping.
//!
//! # Pipeline
//!
//! A warp runs these steps in order, synchronously, within one call:
//! 1. Solve the 3x3 homography from four source points to four destination points
//! 2. Invert it to get the destination -> source mapping
//! 3. Back-project every destination pixel and copy the nearest source pixel
//!
//! # Coordinate System
//!
//! - Coordinates are in pixels, origin at the top-left corner
//! - The destination rectangle corners are pixel edges: `(0, 0)` to `(w, h)`

pub mod homography;
mod warp;

pub use homography::{solve, solve_points, solve_with, LinearSystem, SolverOptions};
pub use warp::{
    perspective_transform, perspective_transform_with, warp, warp_with, ExecutionStrategy,
    RoundingMode, SampleGrid, WarpOptions,
};
