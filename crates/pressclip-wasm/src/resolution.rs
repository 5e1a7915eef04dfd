//! Resolution switching bindings.
//!
//! The core manager decides when to preload and swap the high-resolution
//! page scan; the JavaScript side performs the actual fetch and image-element
//! swap. Each `preload` action is acknowledged back through
//! `preload_succeeded` / `preload_failed`; the manager discards
//! acknowledgements for preloads issued against a previous page.

use pressclip_core::resolution::{
    derive_high_res_url, PreloadTicket, ResolutionAction, ResolutionManager,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Serialized action shape handed to JavaScript.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum JsResolutionAction {
    Preload { url: String },
    ActivateHigh { url: String },
    RevertToBase { url: String },
}

fn action_to_js(action: Option<ResolutionAction>) -> Result<JsValue, JsValue> {
    let out = match action {
        None => return Ok(JsValue::UNDEFINED),
        Some(ResolutionAction::Preload(ticket)) => JsResolutionAction::Preload { url: ticket.url },
        Some(ResolutionAction::ActivateHigh(url)) => JsResolutionAction::ActivateHigh { url },
        Some(ResolutionAction::RevertToBase(url)) => JsResolutionAction::RevertToBase { url },
    };
    serde_wasm_bindgen::to_value(&out).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Derive the high-resolution variant URL by filename convention:
/// `page-012.jpg` becomes `page-012@2x.jpg`.
#[wasm_bindgen]
pub fn high_res_url(base_url: &str) -> String {
    derive_high_res_url(base_url)
}

/// Tracks which page asset should be displayed and when to upgrade it.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const manager = new JsResolutionManager(pageUrl);
/// const action = manager.on_scale(session.zoom_scale());
/// if (action?.type === 'preload') {
///   try {
///     await preloadImage(action.url);
///     const swap = manager.preload_succeeded();
///     if (swap) img.src = swap.url;
///   } catch {
///     manager.preload_failed();
///   }
/// }
/// ```
#[wasm_bindgen]
pub struct JsResolutionManager {
    inner: ResolutionManager,
    /// The outstanding preload, if the last action was a `preload`.
    pending: Option<PreloadTicket>,
}

#[wasm_bindgen]
impl JsResolutionManager {
    /// Create a manager for the given base page asset URL.
    #[wasm_bindgen(constructor)]
    pub fn new(base_url: String) -> JsResolutionManager {
        JsResolutionManager {
            inner: ResolutionManager::new(base_url),
            pending: None,
        }
    }

    /// The user navigated to a different page. Outstanding preloads become
    /// stale and their acknowledgements will be discarded.
    pub fn set_image(&mut self, base_url: String) {
        self.inner.set_image(base_url);
    }

    /// URL of the asset that should currently be displayed.
    pub fn active_url(&self) -> String {
        self.inner.active_url()
    }

    /// Observe a new zoom scale. Returns a serialized action to carry out,
    /// or `undefined`.
    pub fn on_scale(&mut self, scale: f64) -> Result<JsValue, JsValue> {
        let action = self.inner.on_scale(scale);
        if let Some(ResolutionAction::Preload(ticket)) = &action {
            self.pending = Some(ticket.clone());
        }
        action_to_js(action)
    }

    /// The outstanding preload finished successfully. Returns the swap
    /// action to apply, or `undefined` (stale preload, or the user zoomed
    /// back out while it loaded).
    pub fn preload_succeeded(&mut self) -> Result<JsValue, JsValue> {
        let action = self
            .pending
            .take()
            .and_then(|ticket| self.inner.preload_succeeded(&ticket));
        action_to_js(action)
    }

    /// The outstanding preload failed. The base asset stays displayed and
    /// no retry is attempted for this page.
    pub fn preload_failed(&mut self) {
        if let Some(ticket) = self.pending.take() {
            self.inner.preload_failed(&ticket);
        }
    }
}
