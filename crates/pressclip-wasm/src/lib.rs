//! Pressclip WASM - WebAssembly bindings for Pressclip
//!
//! This crate provides WASM bindings to expose the pressclip-core
//! functionality to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for page image data
//! - `session` - Interactive clipping session (pointer, wheel, clip state)
//! - `resolution` - High-resolution asset switching
//! - `compose` - The clip composition pipeline
//! - `share` - Preview object URLs and upload coordination
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_page, JsClipSession, JsComposer } from '@pressclip/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await response.arrayBuffer());
//! const page = decode_page(bytes);
//!
//! const session = new JsClipSession(viewWidth, viewHeight);
//! const rect = session.enter_clip_mode();
//! ```

use wasm_bindgen::prelude::*;

mod compose;
mod resolution;
mod session;
mod share;
mod types;

// Re-export public types
pub use compose::{JsComposer, JsComposition};
pub use resolution::{high_res_url, JsResolutionManager};
pub use session::JsClipSession;
pub use share::JsShareSession;
pub use types::{decode_page, JsPageImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: Set up panic hook for better error messages in browser console
    // when console_error_panic_hook feature is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
