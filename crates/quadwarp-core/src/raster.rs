//! RGBA raster images.

use crate::error::WarpError;

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// An image with RGBA pixel data.
///
/// Pixels are stored row-major from the top-left corner, four bytes per
/// pixel in R, G, B, A order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Create a RasterImage, validating dimensions and buffer length.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, WarpError> {
        let expected = checked_len(width, height)?;
        if pixels.len() != expected {
            return Err(WarpError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a fully transparent (zero-filled) image.
    pub fn transparent(width: u32, height: u32) -> Result<Self, WarpError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![0u8; len],
        })
    }

    /// Create an image where every pixel has the same color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, WarpError> {
        let len = checked_len(width, height)?;
        let pixels = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a RasterImage from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Returns true if `(x, y)` addresses a pixel of this image.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Read the RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[idx..idx + CHANNELS]);
        Some(rgba)
    }

    /// Write the RGBA value at `(x, y)`. Out-of-range writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.pixels[idx..idx + CHANNELS].copy_from_slice(&rgba);
    }

    /// Bytes in one row of pixels.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride() + x as usize * CHANNELS
    }
}

/// Byte length of an RGBA buffer for the given dimensions, or `None` if it
/// overflows `usize`.
#[inline]
pub fn buffer_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// Buffer length for non-empty dimensions that fit in memory.
pub(crate) fn checked_len(width: u32, height: u32) -> Result<usize, WarpError> {
    match buffer_len(width, height) {
        Some(len) if len > 0 => Ok(len),
        _ => Err(WarpError::InvalidDimensions { width, height }),
    }
}
