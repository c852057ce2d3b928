//! Quadwarp Core - Perspective warp engine
//!
//! This crate provides the core functionality for Quadwarp: solving the
//! projective transform that maps four control points onto the corners of a
//! destination rectangle, and resampling an RGBA image through it with
//! nearest-neighbor inverse warping.
//!
//! The UI that supplies control points (draggable handles on a canvas) lives
//! outside this crate. It calls [`perspective_transform`] on every update;
//! no state is kept between calls.

pub mod decode;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod raster;
pub mod transform;

pub use error::WarpError;
pub use geometry::{Point2D, PointQuad};
pub use matrix::Matrix3x3;
pub use raster::RasterImage;
pub use transform::{
    perspective_transform, perspective_transform_with, solve, warp, warp_with, SolverOptions,
    WarpOptions,
};
