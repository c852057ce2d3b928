//! Image decoding into RGBA rasters.
//!
//! Decodes PNG or JPEG file bytes (format sniffed from the content) into a
//! [`RasterImage`] ready to be used as a warp source.

use std::io::Cursor;

use image::ImageReader;
use thiserror::Error;

use crate::raster::RasterImage;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// Decode PNG or JPEG bytes into an RGBA raster.
///
/// Images without an alpha channel are decoded as fully opaque.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized.
/// Returns `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_image(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let raster = RasterImage::from_rgba_image(img.into_rgba8());
    log::debug!("decoded {}x{} image", raster.width, raster.height);
    Ok(raster)
}
