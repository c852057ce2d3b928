//! WASM bindings for the perspective warp.
//!
//! The browser UI calls `warp_perspective` every time a handle is dragged,
//! passing the four handle positions in source-image pixels. The result is
//! an RGBA buffer sized for the output canvas.

use crate::types::JsRasterImage;
use quadwarp_core::transform::{solve, WarpOptions};
use quadwarp_core::{
    perspective_transform_with, Matrix3x3, Point2D, PointQuad, RasterImage, WarpError,
};
use wasm_bindgen::prelude::*;

/// Convert any displayable error into a JavaScript `Error`.
pub(crate) fn js_error(e: impl std::fmt::Display) -> JsValue {
    let message = e.to_string();
    log::warn!("{}", message);
    js_sys::Error::new(&message).into()
}

/// Warp the region bounded by four handles into a `dest_width x dest_height` image.
///
/// # Arguments
///
/// * `image` - Source image (RGBA)
/// * `points` - Handle positions `[x0, y0, x1, y1, x2, y2, x3, y3]`, mapped in
///   order onto the top-left, top-right, bottom-right and bottom-left corners
/// * `dest_width` - Output width in pixels
/// * `dest_height` - Output height in pixels
///
/// # Errors
///
/// Returns an error if `points` does not hold four points, if three handles
/// are collinear or coincide, or if a dimension is zero.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const points = new Float64Array([100, 122, 296, 40, 513, 262, 273, 411]);
/// const warped = warp_perspective(source, points, canvas.width, canvas.height);
/// const data = new ImageData(new Uint8ClampedArray(warped.pixels()), warped.width);
/// ctx.putImageData(data, 0, 0);
/// ```
#[wasm_bindgen]
pub fn warp_perspective(
    image: &JsRasterImage,
    points: &[f64],
    dest_width: u32,
    dest_height: u32,
) -> Result<JsRasterImage, JsValue> {
    let quad = PointQuad::from_flat(points).map_err(js_error)?;
    warp_quad(image, &quad, dest_width, dest_height, &WarpOptions::default())
        .map(JsRasterImage::from_raster)
        .map_err(js_error)
}

/// Warp with points given as `{x, y}` objects and explicit options.
///
/// # Arguments
///
/// * `points` - Array of four `{x: number, y: number}` objects
/// * `options` - Partial options object, or `undefined` for defaults. Fields:
///   `sampleGrid` (`"center"` | `"corner"`), `rounding`
///   (`"halfAwayFromZero"` | `"halfToEven"` | `"halfUp"`), and `solver`
///   (`{pivotTolerance, collinearityTolerance, determinantTolerance}`)
///
/// # Example (TypeScript)
///
/// ```typescript
/// const warped = warp_perspective_with_options(source, handles, 640, 480, {
///   sampleGrid: 'corner',
///   rounding: 'halfUp',
/// });
/// ```
#[wasm_bindgen]
pub fn warp_perspective_with_options(
    image: &JsRasterImage,
    points: JsValue,
    dest_width: u32,
    dest_height: u32,
    options: JsValue,
) -> Result<JsRasterImage, JsValue> {
    let points: Vec<Point2D> = serde_wasm_bindgen::from_value(points)
        .map_err(|e| js_error(format!("Invalid control points: {}", e)))?;
    let quad = PointQuad::try_from(points.as_slice()).map_err(js_error)?;

    let options: WarpOptions = if options.is_undefined() || options.is_null() {
        WarpOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| js_error(format!("Invalid warp options: {}", e)))?
    };

    warp_quad(image, &quad, dest_width, dest_height, &options)
        .map(JsRasterImage::from_raster)
        .map_err(js_error)
}

/// Compute the homography mapping four source points onto four destination points.
///
/// Both arguments are interleaved `[x0, y0, ..., x3, y3]` arrays. Returns the
/// nine matrix entries in row-major order, with the last entry equal to 1.
#[wasm_bindgen]
pub fn compute_homography(src: &[f64], dst: &[f64]) -> Result<Vec<f64>, JsValue> {
    homography_from_flat(src, dst)
        .map(|m| m.to_row_major().to_vec())
        .map_err(js_error)
}

/// Invert a row-major 3x3 homography.
#[wasm_bindgen]
pub fn invert_homography(matrix: &[f64]) -> Result<Vec<f64>, JsValue> {
    let values: &[f64; 9] = matrix.try_into().map_err(|_| {
        js_error(format!(
            "Invalid matrix: expected 9 values, got {}",
            matrix.len()
        ))
    })?;

    Matrix3x3::from_row_major(values)
        .invert()
        .map(|m| m.to_row_major().to_vec())
        .map_err(js_error)
}

fn warp_quad(
    image: &JsRasterImage,
    quad: &PointQuad,
    dest_width: u32,
    dest_height: u32,
    options: &WarpOptions,
) -> Result<RasterImage, WarpError> {
    perspective_transform_with(&image.to_raster(), quad, dest_width, dest_height, options)
}

fn homography_from_flat(src: &[f64], dst: &[f64]) -> Result<Matrix3x3, WarpError> {
    let src = PointQuad::from_flat(src)?;
    let dst = PointQuad::from_flat(dst)?;
    solve(&src, &dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> JsRasterImage {
        JsRasterImage::from_raster(RasterImage::filled(width, height, rgba).unwrap())
    }

    #[test]
    fn test_warp_perspective_upscale() {
        let img = solid_image(2, 2, RED);
        let points = [0.0, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 2.0];

        let result = warp_perspective(&img, &points, 4, 4).unwrap();

        assert_eq!(result.width(), 4);
        assert_eq!(result.height(), 4);
        assert!(result.pixels().chunks_exact(4).all(|p| p == RED));
    }

    #[test]
    fn test_warp_perspective_drag_sequence() {
        // Each drag step re-runs the full pipeline with the updated handles
        let img =
            JsRasterImage::from_raster(RasterImage::filled(600, 450, [9, 9, 9, 255]).unwrap());
        let mut points = [100.0, 122.0, 296.0, 40.0, 513.0, 262.0, 273.0, 411.0];

        for step in 0..5 {
            points[2] += 3.0 * step as f64;
            points[3] -= 2.0 * step as f64;
            let result = warp_perspective(&img, &points, 120, 90).unwrap();
            assert_eq!(result.byte_length(), 120 * 90 * 4);
        }
    }

    #[test]
    fn test_warp_quad_rejects_degenerate_handles() {
        let img = solid_image(10, 10, RED);
        let quad = PointQuad::from_flat(&[5.0; 8]).unwrap();
        let result = warp_quad(&img, &quad, 10, 10, &WarpOptions::default());
        assert!(matches!(result, Err(WarpError::SingularSystem)));
    }

    #[test]
    fn test_warp_quad_rejects_bad_buffer() {
        let img = JsRasterImage::new(4, 4, vec![0u8; 7]);
        let quad = PointQuad::from_rect(4, 4);
        let result = warp_quad(&img, &quad, 4, 4, &WarpOptions::default());
        assert!(matches!(result, Err(WarpError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_warp_quad_rejects_oversized_image() {
        // The RGBA byte count overflows usize, so an empty buffer must not pass
        let img = JsRasterImage::new(u32::MAX, u32::MAX, Vec::new());
        let quad = PointQuad::from_rect(4, 4);
        let result = warp_quad(&img, &quad, 4, 4, &WarpOptions::default());
        assert!(matches!(result, Err(WarpError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_warp_quad_corner_sampling() {
        let img = solid_image(2, 2, RED);
        let quad = PointQuad::from_rect(2, 2);
        let result = warp_quad(&img, &quad, 4, 4, &WarpOptions::corner_sampled()).unwrap();

        // The last column back-projects past the source edge
        assert_eq!(result.pixel(3, 0), Some([0, 0, 0, 0]));
        assert_eq!(result.pixel(0, 0), Some(RED));
    }

    #[test]
    fn test_compute_homography_identity() {
        let square = [0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0];
        let m = compute_homography(&square, &square).unwrap();

        assert_eq!(m.len(), 9);
        let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        for (a, b) in m.iter().zip(identity.iter()) {
            assert!((a - b).abs() < 1e-12, "{:?}", m);
        }
    }

    #[test]
    fn test_homography_from_flat_wrong_length() {
        let result = homography_from_flat(&[0.0; 6], &[0.0; 8]);
        assert!(matches!(
            result,
            Err(WarpError::InvalidInput {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_invert_homography_scale() {
        let m = [2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0];
        let inv = invert_homography(&m).unwrap();
        assert_eq!(inv, vec![0.5, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 1.0]);
    }
}
