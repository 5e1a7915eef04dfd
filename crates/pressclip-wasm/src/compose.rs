//! Composition pipeline bindings.
//!
//! Network I/O stays in JavaScript: the caller prefetches logo bytes and
//! hands them over alongside the source pixels, and the pipeline does all
//! decoding and pixel work in WASM. A `JsComposer` holds the single run
//! slot, so a commit while another is in flight rejects immediately instead
//! of queueing.

use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Promise;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use pressclip_core::assets::PrefetchedAssets;
use pressclip_core::compose::{ComposeRequest, Composer, CompositionResult, CompositionSettings};
use pressclip_core::geometry::{Bounds, ClipRect};
use pressclip_core::raster::RasterImage;

/// Per-commit arguments, deserialized from one JavaScript object.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitArgs {
    /// The committed clip rectangle, in display space.
    clip: ClipRect,
    /// On-screen width the clip rectangle is relative to.
    display_width: f64,
    /// On-screen height the clip rectangle is relative to.
    display_height: f64,
    /// Page number of the displayed page.
    page: u32,
    /// Publication name shown before the date in the footer.
    #[serde(default)]
    host_label: String,
    /// Locale-formatted date string.
    #[serde(default)]
    date_label: String,
}

/// The composed output: an encoded PNG blob plus its dimensions.
#[wasm_bindgen]
pub struct JsComposition {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

#[wasm_bindgen]
impl JsComposition {
    /// Output width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of the encoded PNG in bytes
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.png.len()
    }

    /// Returns the PNG bytes as Uint8Array.
    ///
    /// Note: This creates a copy of the encoded data.
    pub fn png(&self) -> Vec<u8> {
        self.png.clone()
    }
}

impl JsComposition {
    pub(crate) fn from_result(result: CompositionResult) -> Self {
        Self {
            width: result.width,
            height: result.height,
            png: result.png,
        }
    }

    pub(crate) fn to_result(&self) -> CompositionResult {
        CompositionResult {
            width: self.width,
            height: self.height,
            png: self.png.clone(),
        }
    }
}

fn reject(message: String) -> Promise {
    Promise::reject(&JsValue::from_str(&message))
}

/// Owns the composition run slot and the footer font.
#[wasm_bindgen]
pub struct JsComposer {
    inner: Rc<Composer>,
}

#[wasm_bindgen]
impl JsComposer {
    /// Create a composer without a footer font; text overlays are skipped.
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsComposer {
        JsComposer {
            inner: Rc::new(Composer::new()),
        }
    }

    /// Create a composer with a footer font face from raw TTF/OTF bytes.
    /// Unparseable bytes degrade to a composer without text overlays.
    pub fn with_font(font_bytes: Vec<u8>) -> JsComposer {
        let composer = Composer::try_with_font_bytes(font_bytes).unwrap_or_default();
        JsComposer {
            inner: Rc::new(composer),
        }
    }

    /// True while a commit is in flight.
    pub fn is_busy(&self) -> bool {
        self.inner.is_busy()
    }

    /// Run the composition pipeline for a committed clip.
    ///
    /// # Arguments
    ///
    /// * `request` - Commit arguments: `{ clip, displayWidth, displayHeight,
    ///   page, hostLabel, dateLabel }`
    /// * `source_width` / `source_height` - Native size of the source page
    /// * `source_pixels` - RGBA pixel data of the source page
    /// * `settings` - Customization document (bands, logos, display
    ///   options); `undefined` uses the defaults
    /// * `assets` - Prefetched logo bytes keyed by URL; logos missing from
    ///   the map are skipped silently
    ///
    /// # Returns
    ///
    /// A `Promise` resolving to a `JsComposition`, or rejecting if the
    /// inputs are invalid, another run is in flight, or encoding fails.
    ///
    /// # Example (TypeScript)
    ///
    /// ```typescript
    /// const result = await composer.commit(
    ///   { clip, displayWidth, displayHeight, page, hostLabel, dateLabel },
    ///   page.width, page.height, page.pixels(),
    ///   settings,
    ///   { [settings.topBand.logoUrl]: logoBytes },
    /// );
    /// preview.src = URL.createObjectURL(new Blob([result.png()], { type: 'image/png' }));
    /// ```
    pub fn commit(
        &self,
        request: JsValue,
        source_width: u32,
        source_height: u32,
        source_pixels: Vec<u8>,
        settings: JsValue,
        assets: JsValue,
    ) -> Promise {
        let args: CommitArgs = match serde_wasm_bindgen::from_value(request) {
            Ok(args) => args,
            Err(e) => return reject(format!("Invalid commit request: {e}")),
        };

        let settings: CompositionSettings = if settings.is_undefined() || settings.is_null() {
            CompositionSettings::default()
        } else {
            match serde_wasm_bindgen::from_value(settings) {
                Ok(settings) => settings,
                Err(e) => return reject(format!("Invalid settings: {e}")),
            }
        };

        let asset_map: HashMap<String, Vec<u8>> = if assets.is_undefined() || assets.is_null() {
            HashMap::new()
        } else {
            match serde_wasm_bindgen::from_value(assets) {
                Ok(map) => map,
                Err(e) => return reject(format!("Invalid asset map: {e}")),
            }
        };

        let expected = source_width as usize * source_height as usize * 4;
        if source_pixels.len() != expected {
            return reject(format!(
                "Source pixel buffer has {} bytes, expected {}",
                source_pixels.len(),
                expected
            ));
        }

        let composer = Rc::clone(&self.inner);
        future_to_promise(async move {
            let mut loader = PrefetchedAssets::new();
            for (url, bytes) in asset_map {
                loader.insert(url, bytes);
            }

            let source = RasterImage::new(source_width, source_height, source_pixels);
            let request = ComposeRequest {
                clip: Some(args.clip),
                source: Some(&source),
                display: Bounds::new(args.display_width, args.display_height),
                page: args.page,
                host_label: &args.host_label,
                date_label: &args.date_label,
            };

            let result = composer
                .commit(&request, &settings, &loader)
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            Ok(JsComposition::from_result(result).into())
        })
    }
}

impl Default for JsComposer {
    fn default() -> Self {
        Self::new()
    }
}
