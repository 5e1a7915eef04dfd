//! WASM-compatible wrapper types for page image data.
//!
//! This module provides JavaScript-friendly types that wrap the core
//! Pressclip types, handling the conversion between Rust and JavaScript
//! data representations.

use pressclip_core::raster::RasterImage;
use wasm_bindgen::prelude::*;

/// A decoded page image wrapper for JavaScript.
///
/// Wraps the core `RasterImage` type and provides a JavaScript-friendly
/// interface for accessing image dimensions and pixel data.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy
/// is made to JavaScript memory as a `Uint8Array`. For large page scans,
/// keep the image in WASM memory and only extract pixels when needed.
///
/// The `free()` method can be called to explicitly release WASM memory, but
/// this is optional as wasm-bindgen's finalizer will handle cleanup
/// automatically.
#[wasm_bindgen]
pub struct JsPageImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsPageImage {
    /// Create a new JsPageImage from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsPageImage {
        JsPageImage {
            width,
            height,
            pixels,
        }
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
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

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup
    /// automatically. Call this to immediately release a large page scan.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsPageImage {
    /// Create a JsPageImage from a core RasterImage.
    pub(crate) fn from_raster(img: RasterImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }
}

/// Decode an encoded page image (PNG or JPEG) from bytes.
///
/// # Arguments
///
/// * `bytes` - The raw image file bytes as a `Uint8Array`
///
/// # Returns
///
/// A `JsPageImage` containing the decoded RGBA pixel data, or an error if
/// decoding fails.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid PNG or JPEG, or if the
/// image decodes to zero pixels.
///
/// # Example
///
/// ```typescript
/// const bytes = new Uint8Array(await response.arrayBuffer());
/// const page = decode_page(bytes);
/// console.log(`Decoded ${page.width}x${page.height} page`);
/// ```
#[wasm_bindgen]
pub fn decode_page(bytes: &[u8]) -> Result<JsPageImage, JsValue> {
    RasterImage::decode(bytes)
        .map(JsPageImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_page_image_creation() {
        let img = JsPageImage::new(100, 50, vec![0u8; 100 * 50 * 4]);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 20000);
    }

    #[test]
    fn test_js_page_image_pixels() {
        let pixels = vec![255u8, 128, 64, 255, 32, 16, 8, 255]; // 2 RGBA pixels
        let img = JsPageImage::new(2, 1, pixels.clone());
        assert_eq!(img.pixels(), pixels);
    }

    #[test]
    fn test_from_raster() {
        let raster = RasterImage::new(20, 10, vec![0u8; 20 * 10 * 4]);
        let js_img = JsPageImage::from_raster(raster);
        assert_eq!(js_img.width(), 20);
        assert_eq!(js_img.height(), 10);
        assert_eq!(js_img.byte_length(), 800);
    }
}
