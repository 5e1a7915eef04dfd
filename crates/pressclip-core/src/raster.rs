//! Raster image type shared by the composition pipeline.
//!
//! Pixels are RGBA, 4 bytes per pixel, row-major order. The alpha channel
//! matters for logos (transparent PNGs drawn over a band color); page images
//! arrive opaque.

use thiserror::Error;

/// Error types for raster decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a recognized image format.
    #[error("Invalid or unsupported image format: {0}")]
    InvalidFormat(String),

    /// The image decoded to zero pixels.
    #[error("Image decoded to empty dimensions")]
    Empty,
}

/// A decoded raster image with RGBA pixel data.
#[derive(Debug, Clone)]
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
    /// Create a new RasterImage from dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width * height * 4) as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode an encoded image (PNG or JPEG) into RGBA pixels.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let dynamic = image::load_from_memory(bytes)
            .map_err(|e| DecodeError::InvalidFormat(e.to_string()))?;
        let rgba = dynamic.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(DecodeError::Empty);
        }
        Ok(Self::from_rgba_image(rgba))
    }

    /// Create a RasterImage from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
