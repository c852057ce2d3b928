//! Planar geometry types: points and four-point correspondences.
//!
//! # Coordinate System
//!
//! - Coordinates are in pixels, origin at the top-left corner
//! - x grows to the right, y grows downward
//! - A destination rectangle of size `w x h` has corners at pixel edges:
//!   `(0, 0)`, `(w, 0)`, `(w, h)`, `(0, h)`

use crate::error::WarpError;
use serde::{Deserialize, Serialize};

/// Number of correspondences a projective transform is solved from.
pub const QUAD_POINTS: usize = 4;

/// A location in a 2-D coordinate plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Four ordered control points.
///
/// Order is significant: point `i` of a source quad corresponds to point `i`
/// of the destination quad. No geometric constraint is enforced here;
/// degenerate quads are rejected by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointQuad {
    points: [Point2D; QUAD_POINTS],
}

impl PointQuad {
    pub fn new(points: [Point2D; QUAD_POINTS]) -> Self {
        Self { points }
    }

    /// Corners of a `width x height` rectangle anchored at the origin.
    ///
    /// Order: top-left, top-right, bottom-right, bottom-left.
    pub fn from_rect(width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self::new([
            Point2D::new(0.0, 0.0),
            Point2D::new(w, 0.0),
            Point2D::new(w, h),
            Point2D::new(0.0, h),
        ])
    }

    /// Build a quad from interleaved coordinates `[x0, y0, x1, y1, x2, y2, x3, y3]`.
    pub fn from_flat(coords: &[f64]) -> Result<Self, WarpError> {
        if coords.len() != QUAD_POINTS * 2 {
            return Err(WarpError::InvalidInput {
                expected: QUAD_POINTS,
                actual: coords.len() / 2,
            });
        }

        let mut points = [Point2D::default(); QUAD_POINTS];
        for (point, pair) in points.iter_mut().zip(coords.chunks_exact(2)) {
            *point = Point2D::new(pair[0], pair[1]);
        }
        Ok(Self::new(points))
    }

    /// Interleaved coordinates, the inverse of [`PointQuad::from_flat`].
    pub fn to_flat(&self) -> [f64; QUAD_POINTS * 2] {
        let mut coords = [0.0; QUAD_POINTS * 2];
        for (pair, point) in coords.chunks_exact_mut(2).zip(self.points.iter()) {
            pair[0] = point.x;
            pair[1] = point.y;
        }
        coords
    }

    pub fn points(&self) -> &[Point2D; QUAD_POINTS] {
        &self.points
    }

    /// Returns true if two points coincide or any three points are collinear.
    ///
    /// A triple `(a, b, c)` counts as collinear when the sine of the angle
    /// between `b - a` and `c - a` is at most `tolerance`, which keeps the
    /// test independent of the coordinate scale.
    pub fn is_degenerate(&self, tolerance: f64) -> bool {
        const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];

        TRIPLES.iter().any(|&(i, j, k)| {
            let (a, b, c) = (self.points[i], self.points[j], self.points[k]);
            let (ux, uy) = (b.x - a.x, b.y - a.y);
            let (vx, vy) = (c.x - a.x, c.y - a.y);
            let norms = ux.hypot(uy) * vx.hypot(vy);
            let cross = ux * vy - uy * vx;
            // Coincident points leave a zero-length edge
            norms == 0.0 || cross.abs() <= tolerance * norms
        })
    }
}

impl TryFrom<&[Point2D]> for PointQuad {
    type Error = WarpError;

    fn try_from(points: &[Point2D]) -> Result<Self, Self::Error> {
        let points: [Point2D; QUAD_POINTS] =
            points.try_into().map_err(|_| WarpError::InvalidInput {
                expected: QUAD_POINTS,
                actual: points.len(),
            })?;
        Ok(Self::new(points))
    }
}

impl From<[Point2D; QUAD_POINTS]> for PointQuad {
    fn from(points: [Point2D; QUAD_POINTS]) -> Self {
        Self::new(points)
    }
}
