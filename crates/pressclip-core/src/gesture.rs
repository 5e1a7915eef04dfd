//! Gesture input adapter.
//!
//! Converts pointer, touch, and wheel input into clip-rectangle and zoom
//! updates. The adapter is an explicit state machine over pure transitions:
//! it never blocks, owns no event-dispatch machinery, and takes timestamps
//! from the caller, so every transition is deterministic and unit-testable.
//!
//! # Phases
//!
//! - `Idle` - no gesture in progress
//! - `Dragging` - one pointer moving the clip rectangle body
//! - `Resizing(handle)` - one pointer dragging a resize handle
//! - `Pinching` - two pointers driving the zoom scale
//!
//! Which of `Dragging`/`Resizing` a single-pointer gesture becomes is decided
//! by hit-testing the initial contact against the clip rectangle.
//!
//! # Throttling
//!
//! At most one update is emitted per animation frame (16 ms) to bound redraw
//! cost. The throttle is waived while the scale sits inside a text-sharpening
//! transition band (see [`crate::zoom::SHARPEN_BANDS`]), where a stale frame
//! would be visible. Internal state always advances; only emission is gated,
//! so the next admitted update carries the latest state.
//!
//! Misuse (moves with no tracked pointer, ups for unknown pointer ids) is a
//! defensive no-op, not an error: it indicates adapter misuse by the event
//! layer, never a user-facing condition.

use crate::geometry::{
    hit_test, init_clip, resize, translate, Bounds, ClipRect, ContactZone, Handle,
    HANDLE_TOLERANCE,
};
use crate::zoom::{in_sharpen_band, ZoomState};

/// Minimum interval between emitted updates, in milliseconds.
pub const FRAME_INTERVAL_MS: f64 = 16.0;

/// Current gesture phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    /// No gesture in progress.
    Idle,
    /// Single pointer translating the clip rectangle.
    Dragging,
    /// Single pointer resizing from a handle.
    Resizing(Handle),
    /// Two pointers driving zoom.
    Pinching,
}

/// A state update emitted by the adapter, to be rendered by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureUpdate {
    /// The clip rectangle changed.
    ClipChanged(ClipRect),
    /// The zoom scale changed mid-gesture.
    ZoomChanged(f64),
    /// A zoom gesture ended. `revert_to_base` is set when the scale snapped
    /// back to exactly 1.0 and the resolution manager should return to the
    /// base asset.
    ZoomSettled {
        scale: f64,
        revert_to_base: bool,
    },
}

/// One tracked active pointer.
#[derive(Debug, Clone, Copy)]
struct Pointer {
    id: u64,
    x: f64,
    y: f64,
}

/// Frame-rate emission gate.
#[derive(Debug, Default)]
struct FrameGate {
    last_emit_ms: Option<f64>,
}

impl FrameGate {
    /// Admit an emission if a frame has elapsed since the last one, or
    /// unconditionally when `waive` is set.
    fn admit(&mut self, now_ms: f64, waive: bool) -> bool {
        let due = match self.last_emit_ms {
            None => true,
            Some(last) => now_ms - last >= FRAME_INTERVAL_MS,
        };
        if due || waive {
            self.last_emit_ms = Some(now_ms);
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.last_emit_ms = None;
    }
}

/// Gesture input adapter: routes pointer input to the geometry engine and
/// pinch/wheel input to the zoom state.
#[derive(Debug)]
pub struct GestureAdapter {
    phase: GesturePhase,
    bounds: Bounds,
    clip: Option<ClipRect>,
    zoom: ZoomState,
    pointers: Vec<Pointer>,
    /// Last position of the single tracked pointer, for move deltas.
    anchor: (f64, f64),
    /// Inter-finger distance at pinch start.
    initial_span: f64,
    gate: FrameGate,
}

impl GestureAdapter {
    /// Create an adapter for an image displayed at the given bounds.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            phase: GesturePhase::Idle,
            bounds,
            clip: None,
            zoom: ZoomState::new(),
            pointers: Vec::new(),
            anchor: (0.0, 0.0),
            initial_span: 0.0,
            gate: FrameGate::default(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// The active clip rectangle, if clip mode is engaged.
    pub fn clip(&self) -> Option<&ClipRect> {
        self.clip.as_ref()
    }

    /// Current zoom scale.
    pub fn zoom_scale(&self) -> f64 {
        self.zoom.scale()
    }

    /// Enter clip mode, creating the initial centered rectangle.
    pub fn enter_clip_mode(&mut self) -> ClipRect {
        let rect = init_clip(self.bounds.width, self.bounds.height);
        self.clip = Some(rect);
        self.phase = GesturePhase::Idle;
        rect
    }

    /// Exit or cancel clip mode, discarding the rectangle.
    pub fn exit_clip_mode(&mut self) {
        self.clip = None;
        self.phase = GesturePhase::Idle;
    }

    /// The displayed image changed (navigation or resolution-independent
    /// relayout): adopt the new bounds, reset zoom, and discard any clip.
    pub fn set_image(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.clip = None;
        self.phase = GesturePhase::Idle;
        self.zoom.reset();
        self.pointers.clear();
        self.gate.reset();
    }

    /// A pointer made contact. Routes the gesture: a first pointer inside
    /// clip mode becomes a drag or resize depending on the contact zone; a
    /// second pointer starts a pinch.
    pub fn pointer_down(&mut self, id: u64, x: f64, y: f64) {
        if self.pointers.iter().any(|p| p.id == id) {
            // Duplicate down for a tracked pointer: adapter misuse, ignore.
            return;
        }
        self.pointers.push(Pointer { id, x, y });

        match self.pointers.len() {
            1 => {
                self.anchor = (x, y);
                self.phase = match self.clip.as_ref().and_then(|rect| {
                    hit_test(rect, x, y, HANDLE_TOLERANCE)
                }) {
                    Some(ContactZone::Body) => GesturePhase::Dragging,
                    Some(ContactZone::Grip(handle)) => GesturePhase::Resizing(handle),
                    None => GesturePhase::Idle,
                };
            }
            2 => {
                self.phase = GesturePhase::Pinching;
                self.zoom.begin_gesture();
                self.initial_span = self.span();
            }
            // A third finger neither moves nor zooms; keep the pinch.
            _ => {}
        }
    }

    /// A tracked pointer moved. Returns an update when one is due.
    pub fn pointer_move(&mut self, id: u64, x: f64, y: f64, now_ms: f64) -> Option<GestureUpdate> {
        let pointer = self.pointers.iter_mut().find(|p| p.id == id)?;
        pointer.x = x;
        pointer.y = y;

        match self.phase {
            GesturePhase::Dragging => {
                let (ax, ay) = self.anchor;
                self.anchor = (x, y);
                let rect = self.clip.as_ref()?;
                let moved = translate(rect, x - ax, y - ay, &self.bounds);
                self.clip = Some(moved);
                self.gate
                    .admit(now_ms, false)
                    .then_some(GestureUpdate::ClipChanged(moved))
            }
            GesturePhase::Resizing(handle) => {
                let (ax, ay) = self.anchor;
                self.anchor = (x, y);
                let rect = self.clip.as_ref()?;
                let resized = resize(rect, handle, x - ax, y - ay, &self.bounds);
                self.clip = Some(resized);
                self.gate
                    .admit(now_ms, false)
                    .then_some(GestureUpdate::ClipChanged(resized))
            }
            GesturePhase::Pinching => {
                if self.initial_span <= 0.0 {
                    return None;
                }
                let ratio = self.span() / self.initial_span;
                let scale = self.zoom.apply_pinch_ratio(ratio);
                let waive = in_sharpen_band(scale);
                self.gate
                    .admit(now_ms, waive)
                    .then_some(GestureUpdate::ZoomChanged(scale))
            }
            GesturePhase::Idle => None,
        }
    }

    /// A pointer lifted. Ends the gesture it was part of; the final state is
    /// always emitted, bypassing the frame gate, so the screen never settles
    /// on a stale frame.
    pub fn pointer_up(&mut self, id: u64) -> Option<GestureUpdate> {
        let before = self.pointers.len();
        self.pointers.retain(|p| p.id != id);
        if self.pointers.len() == before {
            // Unknown pointer id: adapter misuse, ignore.
            return None;
        }

        match self.phase {
            GesturePhase::Pinching if self.pointers.len() < 2 => {
                self.phase = GesturePhase::Idle;
                let revert = self.zoom.end_gesture();
                Some(GestureUpdate::ZoomSettled {
                    scale: self.zoom.scale(),
                    revert_to_base: revert,
                })
            }
            GesturePhase::Dragging | GesturePhase::Resizing(_) if self.pointers.is_empty() => {
                self.phase = GesturePhase::Idle;
                self.clip.map(GestureUpdate::ClipChanged)
            }
            _ => None,
        }
    }

    /// A wheel event. Zoom is gated behind a modifier key so plain wheel
    /// input keeps scrolling the page; ungated events are ignored.
    pub fn wheel(&mut self, direction: f64, modifier: bool, now_ms: f64) -> Option<GestureUpdate> {
        if !modifier {
            return None;
        }
        let scale = self.zoom.apply_wheel_step(direction);
        let waive = in_sharpen_band(scale);
        self.gate
            .admit(now_ms, waive)
            .then_some(GestureUpdate::ZoomChanged(scale))
    }

    /// A wheel burst ended (caller-side debounce). Applies the same snap
    /// rule as a pinch end.
    pub fn settle_zoom(&mut self) -> GestureUpdate {
        let revert = self.zoom.end_gesture();
        GestureUpdate::ZoomSettled {
            scale: self.zoom.scale(),
            revert_to_base: revert,
        }
    }

    /// Current distance between the two pinch pointers.
    fn span(&self) -> f64 {
        if self.pointers.len() < 2 {
            return 0.0;
        }
        let a = &self.pointers[0];
        let b = &self.pointers[1];
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }
}
