//! Error type shared by the solver, the matrix helpers and the rasterizer.

use thiserror::Error;

/// Errors that can occur while solving or applying a perspective warp.
///
/// Every variant is raised before the destination buffer is allocated, so a
/// failed warp never hands back a partially written image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarpError {
    /// A point set did not contain exactly four correspondences.
    #[error("Invalid input: expected {expected} control points, got {actual}")]
    InvalidInput { expected: usize, actual: usize },

    /// Width or height is zero, or the RGBA buffer size overflows `usize`
    #[error("Invalid dimensions: {width}x{height} must be non-zero and fit in memory")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// The 8x8 system has no unique solution (coincident or collinear points).
    #[error("Singular system: control points are coincident or collinear")]
    SingularSystem,

    /// The projective matrix has a zero determinant and cannot be inverted.
    #[error("Singular matrix: determinant is zero")]
    SingularMatrix,
}
