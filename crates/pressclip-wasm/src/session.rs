//! Clip session bindings.
//!
//! Exposes the gesture adapter to JavaScript: the event layer forwards raw
//! pointer and wheel events with timestamps, and receives serialized state
//! updates (clip rectangle changes, zoom changes) to render. All gesture
//! routing, throttling, and geometry clamping happens in the core crate.

use pressclip_core::geometry::{Bounds, ClipRect};
use pressclip_core::gesture::{GestureAdapter, GesturePhase, GestureUpdate};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Serialized update shape handed to JavaScript.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum JsGestureUpdate {
    #[serde(rename_all = "camelCase")]
    ClipChanged { clip: ClipRect },
    #[serde(rename_all = "camelCase")]
    ZoomChanged { scale: f64 },
    #[serde(rename_all = "camelCase")]
    ZoomSettled { scale: f64, revert_to_base: bool },
}

impl From<GestureUpdate> for JsGestureUpdate {
    fn from(update: GestureUpdate) -> Self {
        match update {
            GestureUpdate::ClipChanged(clip) => JsGestureUpdate::ClipChanged { clip },
            GestureUpdate::ZoomChanged(scale) => JsGestureUpdate::ZoomChanged { scale },
            GestureUpdate::ZoomSettled {
                scale,
                revert_to_base,
            } => JsGestureUpdate::ZoomSettled {
                scale,
                revert_to_base,
            },
        }
    }
}

/// Serialize an optional update; `None` becomes `undefined`.
fn update_to_js(update: Option<GestureUpdate>) -> Result<JsValue, JsValue> {
    match update {
        None => Ok(JsValue::UNDEFINED),
        Some(update) => serde_wasm_bindgen::to_value(&JsGestureUpdate::from(update))
            .map_err(|e| JsValue::from_str(&e.to_string())),
    }
}

fn phase_name(phase: GesturePhase) -> &'static str {
    match phase {
        GesturePhase::Idle => "idle",
        GesturePhase::Dragging => "dragging",
        GesturePhase::Resizing(_) => "resizing",
        GesturePhase::Pinching => "pinching",
    }
}

/// An interactive clipping session over one displayed page.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const session = new JsClipSession(element.clientWidth, element.clientHeight);
/// const rect = session.enter_clip_mode();
///
/// element.addEventListener('pointermove', (e) => {
///   const update = session.pointer_move(e.pointerId, e.offsetX, e.offsetY, e.timeStamp);
///   if (update?.type === 'clipChanged') render(update.clip);
/// });
/// ```
#[wasm_bindgen]
pub struct JsClipSession {
    adapter: GestureAdapter,
}

#[wasm_bindgen]
impl JsClipSession {
    /// Create a session for a page displayed at the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(display_width: f64, display_height: f64) -> JsClipSession {
        JsClipSession {
            adapter: GestureAdapter::new(Bounds::new(display_width, display_height)),
        }
    }

    /// The displayed page changed: adopt the new display size and reset all
    /// session state (clip rectangle, zoom, tracked pointers).
    pub fn set_image(&mut self, display_width: f64, display_height: f64) {
        self.adapter
            .set_image(Bounds::new(display_width, display_height));
    }

    /// Enter clip mode, returning the initial centered rectangle.
    pub fn enter_clip_mode(&mut self) -> Result<JsValue, JsValue> {
        let rect = self.adapter.enter_clip_mode();
        serde_wasm_bindgen::to_value(&rect).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Exit or cancel clip mode, discarding the rectangle.
    pub fn exit_clip_mode(&mut self) {
        self.adapter.exit_clip_mode();
    }

    /// The active clip rectangle, or `undefined` outside clip mode.
    pub fn clip(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.adapter.clip())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Whether clip mode is engaged.
    pub fn has_clip(&self) -> bool {
        self.adapter.clip().is_some()
    }

    /// Current zoom scale.
    pub fn zoom_scale(&self) -> f64 {
        self.adapter.zoom_scale()
    }

    /// Current gesture phase: "idle", "dragging", "resizing" or "pinching".
    pub fn phase(&self) -> String {
        phase_name(self.adapter.phase()).to_string()
    }

    /// A pointer made contact.
    pub fn pointer_down(&mut self, id: u32, x: f64, y: f64) {
        self.adapter.pointer_down(u64::from(id), x, y);
    }

    /// A tracked pointer moved. Returns a serialized update when one is
    /// due, or `undefined` when throttled or idle.
    pub fn pointer_move(
        &mut self,
        id: u32,
        x: f64,
        y: f64,
        now_ms: f64,
    ) -> Result<JsValue, JsValue> {
        update_to_js(self.adapter.pointer_move(u64::from(id), x, y, now_ms))
    }

    /// A pointer lifted. The final gesture state is always emitted.
    pub fn pointer_up(&mut self, id: u32) -> Result<JsValue, JsValue> {
        update_to_js(self.adapter.pointer_up(u64::from(id)))
    }

    /// A wheel event. `modifier` is the zoom modifier key state; ungated
    /// wheel events are ignored so the page keeps scrolling.
    pub fn wheel(&mut self, direction: f64, modifier: bool, now_ms: f64) -> Result<JsValue, JsValue> {
        update_to_js(self.adapter.wheel(direction, modifier, now_ms))
    }

    /// A wheel burst ended (caller-side debounce): settle the zoom scale.
    pub fn settle_zoom(&mut self) -> Result<JsValue, JsValue> {
        update_to_js(Some(self.adapter.settle_zoom()))
    }
}
