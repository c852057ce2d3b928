//! PNG encoding of warp results.
//!
//! PNG keeps the alpha channel, so pixels left transparent by the warp stay
//! transparent in the encoded file.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

use crate::raster::{buffer_len, RasterImage};

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero, or the RGBA buffer size overflows `usize`
    #[error("Invalid dimensions: {width}x{height} must be non-zero and fit in memory")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode an RGBA raster to PNG bytes.
///
/// # Errors
///
/// Returns an error if the dimensions are zero, the buffer length does not
/// match them, or the encoder fails.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width, image.height);
    let expected = match buffer_len(width, height) {
        Some(len) if len > 0 => len,
        _ => return Err(EncodeError::InvalidDimensions { width, height }),
    };

    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(&image.pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}
