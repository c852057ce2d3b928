//! 3x3 projective matrices in homogeneous coordinates.
//!
//! A point `(x, y)` is lifted to `(x, y, 1)`, multiplied by the matrix and
//! projected back by dividing through the third component:
//!
//! ```text
//! [u]   [m00 m01 m02] [x]
//! [v] = [m10 m11 m12] [y]        (x', y') = (u / w, v / w)
//! [w]   [m20 m21 m22] [1]
//! ```

use crate::error::WarpError;
use crate::geometry::Point2D;
use serde::{Deserialize, Serialize};

/// Default tolerance for [`Matrix3x3::invert`], relative to `‖M‖_F³`.
pub const DEFAULT_DETERMINANT_TOLERANCE: f64 = 1e-24;

/// A 3x3 projective transform, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matrix3x3(pub [[f64; 3]; 3]);

impl Default for Matrix3x3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3x3 {
    pub fn new(rows: [[f64; 3]; 3]) -> Self {
        Self(rows)
    }

    pub fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Build from nine row-major values.
    pub fn from_row_major(m: &[f64; 9]) -> Self {
        Self([[m[0], m[1], m[2]], [m[3], m[4], m[5]], [m[6], m[7], m[8]]])
    }

    /// Flatten to nine row-major values.
    pub fn to_row_major(&self) -> [f64; 9] {
        let m = &self.0;
        [
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        ]
    }

    pub fn rows(&self) -> &[[f64; 3]; 3] {
        &self.0
    }

    #[rustfmt::skip]
    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1]) -
        m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0]) +
        m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Transposed cofactor matrix, so that `M · adj(M) = det(M) · I`.
    #[rustfmt::skip]
    pub fn adjugate(&self) -> Self {
        let m = &self.0;
        Self([
            [
                m[1][1] * m[2][2] - m[1][2] * m[2][1],
                m[0][2] * m[2][1] - m[0][1] * m[2][2],
                m[0][1] * m[1][2] - m[0][2] * m[1][1],
            ],
            [
                m[1][2] * m[2][0] - m[1][0] * m[2][2],
                m[0][0] * m[2][2] - m[0][2] * m[2][0],
                m[0][2] * m[1][0] - m[0][0] * m[1][2],
            ],
            [
                m[1][0] * m[2][1] - m[1][1] * m[2][0],
                m[0][1] * m[2][0] - m[0][0] * m[2][1],
                m[0][0] * m[1][1] - m[0][1] * m[1][0],
            ],
        ])
    }

    /// Frobenius norm.
    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .flatten()
            .map(|v| v * v)
            .sum::<f64>()
            .sqrt()
    }

    /// Invert with the default determinant tolerance.
    pub fn invert(&self) -> Result<Self, WarpError> {
        self.invert_with(DEFAULT_DETERMINANT_TOLERANCE)
    }

    /// Invert via adjugate over determinant.
    ///
    /// Fails with [`WarpError::SingularMatrix`] when
    /// `|det| <= tolerance * ‖M‖_F³`. A tolerance of `0.0` rejects only an
    /// exactly zero determinant.
    pub fn invert_with(&self, tolerance: f64) -> Result<Self, WarpError> {
        let det = self.determinant();
        let scale = self.norm().powi(3);

        if !det.is_finite() || det == 0.0 || det.abs() <= tolerance * scale {
            log::warn!("matrix is singular (det = {det:e}), cannot invert");
            return Err(WarpError::SingularMatrix);
        }

        let inv_det = 1.0 / det;
        let mut inv = self.adjugate();
        inv.0.iter_mut().flatten().for_each(|v| *v *= inv_det);

        log::debug!("inverted projective matrix: {:?}", inv.0);
        Ok(inv)
    }

    /// Matrix product `self · rhs`.
    pub fn mul(&self, rhs: &Matrix3x3) -> Self {
        let (a, b) = (&self.0, &rhs.0);
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        Self(out)
    }

    /// Homogeneous product `self · v`.
    #[inline]
    pub fn mul_vec(&self, v: [f64; 3]) -> [f64; 3] {
        let m = &self.0;
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }

    /// Map a Cartesian point through the transform.
    ///
    /// Returns `None` when the point maps to infinity (`w == 0`).
    pub fn transform_point(&self, p: Point2D) -> Option<Point2D> {
        let [u, v, w] = self.mul_vec([p.x, p.y, 1.0]);
        if w == 0.0 {
            return None;
        }
        let (x, y) = (u / w, v / w);
        (x.is_finite() && y.is_finite()).then_some(Point2D::new(x, y))
    }

    /// Element-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Matrix3x3, tolerance: f64) -> bool {
        self.0
            .iter()
            .flatten()
            .zip(other.0.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}
