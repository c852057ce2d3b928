//! Homography estimation from four point correspondences.
//!
//! # Algorithm
//!
//! A projective transform with `h22 = 1` has eight unknowns. Each
//! correspondence `(sx, sy) -> (dx, dy)` contributes two linear equations,
//! obtained by multiplying out the perspective divide:
//!
//! ```text
//! dx * (h6*sx + h7*sy + 1) = h0*sx + h1*sy + h2
//! dy * (h6*sx + h7*sy + 1) = h3*sx + h4*sy + h5
//! ```
//!
//! Four correspondences give an 8x8 system, solved with Gauss-Jordan
//! elimination and partial pivoting. The solution fills
//! `[[h0, h1, h2], [h3, h4, h5], [h6, h7, 1]]`.

use crate::error::WarpError;
use crate::geometry::{Point2D, PointQuad};
use crate::matrix::{Matrix3x3, DEFAULT_DETERMINANT_TOLERANCE};
use serde::{Deserialize, Serialize};

/// Number of free parameters of a normalized homography.
const UNKNOWNS: usize = 8;

/// Default pivot tolerance, relative to the largest system coefficient.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-12;

/// Default collinearity tolerance (sine of the angle between two edges).
pub const DEFAULT_COLLINEARITY_TOLERANCE: f64 = 1e-9;

/// Numerical tolerances used when solving and inverting homographies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverOptions {
    /// A pivot is treated as zero when `|pivot| <= pivot_tolerance * max|a_ij|`.
    pub pivot_tolerance: f64,
    /// Three points are collinear when the sine of their angle is at most this.
    /// A negative value disables the coincident/collinear screen.
    pub collinearity_tolerance: f64,
    /// A determinant is treated as zero when `|det| <= determinant_tolerance * ‖M‖_F³`.
    pub determinant_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            collinearity_tolerance: DEFAULT_COLLINEARITY_TOLERANCE,
            determinant_tolerance: DEFAULT_DETERMINANT_TOLERANCE,
        }
    }
}

impl SolverOptions {
    /// Reject only exactly-zero pivots and determinants, and skip the
    /// collinearity screen.
    pub fn exact() -> Self {
        Self {
            pivot_tolerance: 0.0,
            collinearity_tolerance: -1.0,
            determinant_tolerance: 0.0,
        }
    }
}

/// Augmented `[A | b]` matrix of the 8x8 homography system.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    rows: [[f64; UNKNOWNS + 1]; UNKNOWNS],
}

impl LinearSystem {
    /// Build the system mapping each point of `src` onto the matching point of `dst`.
    pub fn from_correspondences(src: &PointQuad, dst: &PointQuad) -> Self {
        let mut rows = [[0.0; UNKNOWNS + 1]; UNKNOWNS];

        for (i, (s, d)) in src.points().iter().zip(dst.points().iter()).enumerate() {
            let (sx, sy, dx, dy) = (s.x, s.y, d.x, d.y);
            rows[2 * i] = [sx, sy, 1.0, 0.0, 0.0, 0.0, -sx * dx, -sy * dx, dx];
            rows[2 * i + 1] = [0.0, 0.0, 0.0, sx, sy, 1.0, -sx * dy, -sy * dy, dy];
        }

        Self { rows }
    }

    pub fn rows(&self) -> &[[f64; UNKNOWNS + 1]; UNKNOWNS] {
        &self.rows
    }

    /// Solve in place by Gauss-Jordan elimination with partial pivoting.
    ///
    /// Consumes the system; the augmented matrix is only meaningful for a
    /// single solve.
    #[allow(clippy::needless_range_loop)]
    pub fn solve(mut self, pivot_tolerance: f64) -> Result<[f64; UNKNOWNS], WarpError> {
        let aug = &mut self.rows;

        let scale = aug
            .iter()
            .flat_map(|row| row[..UNKNOWNS].iter())
            .fold(0.0f64, |acc, v| acc.max(v.abs()));
        let threshold = pivot_tolerance * scale;

        for col in 0..UNKNOWNS {
            // Partial pivot
            let mut max_row = col;
            let mut max_val = aug[col][col].abs();
            for row in col + 1..UNKNOWNS {
                if aug[row][col].abs() > max_val {
                    max_val = aug[row][col].abs();
                    max_row = row;
                }
            }
            if max_val == 0.0 || max_val <= threshold || !max_val.is_finite() {
                log::warn!("zero pivot in column {col} (|pivot| = {max_val:e})");
                return Err(WarpError::SingularSystem);
            }
            aug.swap(col, max_row);

            let pivot = aug[col][col];
            for k in col..=UNKNOWNS {
                aug[col][k] /= pivot;
            }

            for row in 0..UNKNOWNS {
                if row == col {
                    continue;
                }
                let factor = aug[row][col];
                if factor == 0.0 {
                    continue;
                }
                for k in col..=UNKNOWNS {
                    let v = aug[col][k];
                    aug[row][k] -= factor * v;
                }
            }
        }

        let mut h = [0.0; UNKNOWNS];
        for (value, row) in h.iter_mut().zip(aug.iter()) {
            *value = row[UNKNOWNS];
        }
        Ok(h)
    }
}

/// Solve the homography mapping `src` onto `dst` with default tolerances.
pub fn solve(src: &PointQuad, dst: &PointQuad) -> Result<Matrix3x3, WarpError> {
    solve_with(src, dst, &SolverOptions::default())
}

/// Solve the homography mapping `src` onto `dst`.
///
/// # Errors
///
/// Returns [`WarpError::SingularSystem`] if either quad has coincident points
/// or three collinear points, or if elimination meets a zero pivot.
pub fn solve_with(
    src: &PointQuad,
    dst: &PointQuad,
    options: &SolverOptions,
) -> Result<Matrix3x3, WarpError> {
    let tolerance = options.collinearity_tolerance;
    if tolerance >= 0.0 && (src.is_degenerate(tolerance) || dst.is_degenerate(tolerance)) {
        log::warn!("rejecting degenerate correspondences: src={src:?} dst={dst:?}");
        return Err(WarpError::SingularSystem);
    }

    let h = LinearSystem::from_correspondences(src, dst).solve(options.pivot_tolerance)?;
    let matrix = Matrix3x3::new([[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]]);

    log::debug!("solved homography: {:?}", matrix.rows());
    Ok(matrix)
}

/// Solve from point slices, validating that each holds exactly four points.
///
/// # Errors
///
/// Returns [`WarpError::InvalidInput`] on a wrong point count, otherwise the
/// errors of [`solve`].
pub fn solve_points(src: &[Point2D], dst: &[Point2D]) -> Result<Matrix3x3, WarpError> {
    let src = PointQuad::try_from(src)?;
    let dst = PointQuad::try_from(dst)?;
    solve(&src, &dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn quad(coords: [(f64, f64); 4]) -> PointQuad {
        PointQuad::new(coords.map(Point2D::from))
    }

    /// Map every point of `quad` through `m`.
    fn project(m: &Matrix3x3, quad: &PointQuad) -> Vec<Point2D> {
        quad.points()
            .iter()
            .map(|p| m.transform_point(*p).expect("finite projection"))
            .collect()
    }

    fn assert_points_close(actual: &[Point2D], expected: &[Point2D], rel: f64) {
        for (a, e) in actual.iter().zip(expected) {
            let scale = 1.0f64.max(e.x.abs()).max(e.y.abs());
            assert!(
                (a.x - e.x).abs() <= rel * scale && (a.y - e.y).abs() <= rel * scale,
                "expected {:?}, got {:?}",
                e,
                a
            );
        }
    }

    #[test]
    fn test_linear_system_rows() {
        let src = quad([(1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 9.0)]);
        let dst = PointQuad::from_rect(10, 20);
        let system = LinearSystem::from_correspondences(&src, &dst);
        let rows = system.rows();

        // Second correspondence: (3, 4) -> (10, 0)
        assert_eq!(rows[2], [3.0, 4.0, 1.0, 0.0, 0.0, 0.0, -30.0, -40.0, 10.0]);
        assert_eq!(rows[3], [0.0, 0.0, 0.0, 3.0, 4.0, 1.0, -0.0, -0.0, 0.0]);
    }

    #[test]
    fn test_square_to_same_rect_is_identity() {
        let src = quad([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let m = solve(&src, &PointQuad::from_rect(10, 10)).unwrap();
        assert!(m.approx_eq(&Matrix3x3::identity(), 1e-12), "{:?}", m);
    }

    #[test]
    fn test_uniform_scale() {
        let src = quad([(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let m = solve(&src, &PointQuad::from_rect(4, 4)).unwrap();
        let expected = Matrix3x3::new([[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(m.approx_eq(&expected, 1e-12), "{:?}", m);
    }

    #[test]
    fn test_translation() {
        let src = quad([(5.0, 7.0), (15.0, 7.0), (15.0, 17.0), (5.0, 17.0)]);
        let m = solve(&src, &PointQuad::from_rect(10, 10)).unwrap();
        let expected = Matrix3x3::new([[1.0, 0.0, -5.0], [0.0, 1.0, -7.0], [0.0, 0.0, 1.0]]);
        assert!(m.approx_eq(&expected, 1e-9), "{:?}", m);
    }

    #[test]
    fn test_perspective_quad_maps_onto_rect() {
        let src = quad([(100.0, 122.0), (296.0, 40.0), (513.0, 262.0), (273.0, 411.0)]);
        let dst = PointQuad::from_rect(640, 480);
        let m = solve(&src, &dst).unwrap();

        assert_eq!(m.rows()[2][2], 1.0);
        assert_points_close(&project(&m, &src), dst.points(), 1e-9);
    }

    #[test]
    fn test_all_points_identical_is_singular() {
        let src = quad([(5.0, 5.0); 4]);
        let result = solve(&src, &PointQuad::from_rect(10, 10));
        assert_eq!(result, Err(WarpError::SingularSystem));

        let origin = quad([(0.0, 0.0); 4]);
        assert_eq!(
            solve(&origin, &PointQuad::from_rect(10, 10)),
            Err(WarpError::SingularSystem)
        );
    }

    #[test]
    fn test_all_points_identical_is_singular_without_screening() {
        // The elimination alone must also catch the zero pivot
        let src = quad([(5.0, 5.0); 4]);
        let result = solve_with(&src, &PointQuad::from_rect(10, 10), &SolverOptions::exact());
        assert_eq!(result, Err(WarpError::SingularSystem));
    }

    #[test]
    fn test_collinear_points_are_singular() {
        let src = quad([(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert_eq!(
            solve(&src, &PointQuad::from_rect(10, 10)),
            Err(WarpError::SingularSystem)
        );
    }

    #[test]
    fn test_degenerate_destination_is_singular() {
        let src = PointQuad::from_rect(10, 10);
        assert_eq!(
            solve(&src, &PointQuad::from_rect(0, 10)),
            Err(WarpError::SingularSystem)
        );
    }

    #[test]
    fn test_solve_points_validates_count() {
        let three = [Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0)];
        let four = *PointQuad::from_rect(1, 1).points();

        assert_eq!(
            solve_points(&three, &four),
            Err(WarpError::InvalidInput {
                expected: 4,
                actual: 3
            })
        );
        assert!(matches!(
            solve_points(&four, &three),
            Err(WarpError::InvalidInput { .. })
        ));
        assert!(solve_points(&four, &four).is_ok());
    }

    #[test]
    fn test_solver_options_default() {
        let opts = SolverOptions::default();
        assert_eq!(opts.pivot_tolerance, DEFAULT_PIVOT_TOLERANCE);
        assert_eq!(opts.collinearity_tolerance, DEFAULT_COLLINEARITY_TOLERANCE);
        assert_eq!(opts.determinant_tolerance, DEFAULT_DETERMINANT_TOLERANCE);
    }

    /// Strategy for convex quads: each corner jittered inside its own quadrant.
    fn convex_quad_strategy() -> impl Strategy<Value = PointQuad> {
        (
            10.0f64..2000.0,
            10.0f64..2000.0,
            prop::array::uniform8(0.0f64..0.3),
        )
            .prop_map(|(w, h, j)| {
                quad([
                    (j[0] * w, j[1] * h),
                    (w - j[2] * w, j[3] * h),
                    (w - j[4] * w, h - j[5] * h),
                    (j[6] * w, h - j[7] * h),
                ])
            })
    }

    /// Strategy for quads with at least three exactly collinear points.
    fn collinear_quad_strategy() -> impl Strategy<Value = PointQuad> {
        (
            (-50i32..50, -50i32..50),
            (-5i32..=5, -5i32..=5),
            -10i32..=10,
            -10i32..=10,
            (-50i32..50, -50i32..50),
            0usize..4,
        )
            .prop_map(|((x0, y0), (dx, dy), a, b, (fx, fy), slot)| {
                let on_line = |t: i32| Point2D::new((x0 + t * dx) as f64, (y0 + t * dy) as f64);
                let mut points = [on_line(0), on_line(a), on_line(b), on_line(0)];
                points[3] = Point2D::new(fx as f64, fy as f64);
                points.swap(3, slot);
                PointQuad::new(points)
            })
    }

    proptest! {
        /// Property: inverting the solved matrix maps the destination back onto the source.
        #[test]
        fn prop_round_trip_recovers_source(
            src in convex_quad_strategy(),
            (w, h) in (1u32..=2000, 1u32..=2000),
        ) {
            let dst = PointQuad::from_rect(w, h);
            let m = solve(&src, &dst).unwrap();
            let inv = m.invert().unwrap();

            let recovered = project(&inv, &dst);
            for (r, s) in recovered.iter().zip(src.points()) {
                let scale = 1.0f64.max(s.x.abs()).max(s.y.abs());
                prop_assert!((r.x - s.x).abs() <= 1e-6 * scale, "{:?} vs {:?}", r, s);
                prop_assert!((r.y - s.y).abs() <= 1e-6 * scale, "{:?} vs {:?}", r, s);
            }
        }

        /// Property: three or more collinear points never yield an invertible matrix.
        #[test]
        fn prop_collinear_quads_fail(
            src in collinear_quad_strategy(),
            (w, h) in (1u32..=64, 1u32..=64),
        ) {
            let result = solve(&src, &PointQuad::from_rect(w, h)).and_then(|m| m.invert());
            prop_assert!(
                matches!(result, Err(WarpError::SingularSystem) | Err(WarpError::SingularMatrix)),
                "degenerate quad {:?} produced {:?}",
                src,
                result
            );
        }

        /// Property: solving is deterministic.
        #[test]
        fn prop_solve_is_deterministic(src in convex_quad_strategy()) {
            let dst = PointQuad::from_rect(320, 240);
            prop_assert_eq!(solve(&src, &dst), solve(&src, &dst));
        }
    }
}
