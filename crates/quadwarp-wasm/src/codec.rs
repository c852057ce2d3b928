//! WASM bindings for loading source images and exporting warped results.
//!
//! In the browser, canvas `getImageData` is usually the cheaper way to get
//! RGBA pixels. These bindings cover worker contexts where no canvas is
//! available.

use crate::transform::js_error;
use crate::types::JsRasterImage;
use quadwarp_core::{decode, encode};
use wasm_bindgen::prelude::*;

/// Decode PNG or JPEG file bytes into an RGBA image.
///
/// # Arguments
///
/// * `bytes` - The raw file bytes as a `Uint8Array`
///
/// # Errors
///
/// Returns an error if:
/// - The format is not PNG or JPEG
/// - The file is corrupted or truncated
///
/// # Example
///
/// ```typescript
/// const bytes = new Uint8Array(await file.arrayBuffer());
/// const source = decode_image(bytes);
/// console.log(`Decoded ${source.width}x${source.height}`);
/// ```
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRasterImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsRasterImage::from_raster)
        .map_err(js_error)
}

/// Encode an RGBA image as PNG bytes.
///
/// # Errors
///
/// Returns an error if:
/// - Width or height is zero
/// - The pixel data length doesn't match width * height * 4
///
/// # Example
///
/// ```typescript
/// const warped = warp_perspective(source, points, 800, 600);
/// const png = encode_png(warped);
/// const url = URL.createObjectURL(new Blob([png], { type: 'image/png' }));
/// ```
#[wasm_bindgen]
pub fn encode_png(image: &JsRasterImage) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(&image.to_raster()).map_err(js_error)
}
