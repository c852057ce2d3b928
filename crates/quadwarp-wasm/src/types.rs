//! The RGBA image type passed across the JavaScript boundary.

use quadwarp_core::RasterImage;
use wasm_bindgen::prelude::*;

/// An RGBA image wrapper for JavaScript.
///
/// The pixel layout matches `ImageData.data` on a 2D canvas, so the buffer
/// returned by `pixels()` can be wrapped in an `ImageData` and drawn directly.
///
/// Pixels live in WASM linear memory; `pixels()` hands JavaScript its own
/// `Uint8Array` copy.
#[wasm_bindgen]
pub struct JsRasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRasterImage {
    /// Wrap canvas pixel data, e.g. `ImageData.data` from `getImageData`.
    ///
    /// The buffer must hold `width * height * 4` bytes. It is checked by the
    /// operation the image is passed to, not here.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsRasterImage {
        JsRasterImage {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4 for RGBA)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Release the pixel buffer now instead of waiting for the finalizer.
    pub fn free(self) {}
}

impl JsRasterImage {
    /// Wrap a core RasterImage without copying its pixels.
    pub(crate) fn from_raster(img: RasterImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Convert back to a core RasterImage.
    ///
    /// Note: This clones the pixel data. Dimensions and buffer length are
    /// validated by the core operation the image is passed to.
    pub(crate) fn to_raster(&self) -> RasterImage {
        RasterImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}
