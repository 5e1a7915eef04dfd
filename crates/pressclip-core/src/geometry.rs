//! Clip rectangle geometry.
//!
//! This module maintains the user-selected crop region as a rectangle in
//! display-pixel space, clamped to the displayed image's bounds. All
//! operations are pure and synchronous; the gesture adapter turns pointer
//! input into calls to these functions.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner of the displayed image
//! - x grows right, y grows down
//! - All values are display pixels (CSS pixels), not native image pixels
//!
//! # Invariants
//!
//! Every function in this module returns a rectangle that satisfies:
//!
//! - `width >= MIN_CLIP_SIZE` and `height >= MIN_CLIP_SIZE`
//! - `0 <= x` and `x + width <= bounds.width`
//! - `0 <= y` and `y + height <= bounds.height`

use serde::{Deserialize, Serialize};

/// Minimum clip rectangle edge length in display pixels.
pub const MIN_CLIP_SIZE: f64 = 20.0;

/// Maximum initial clip rectangle edge length in display pixels.
pub const INIT_MAX_SIZE: f64 = 200.0;

/// Default hit-test tolerance around resize handles, in display pixels.
pub const HANDLE_TOLERANCE: f64 = 12.0;

/// The user-selected crop region in display-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRect {
    /// Left edge, relative to the displayed image's left edge.
    pub x: f64,
    /// Top edge, relative to the displayed image's top edge.
    pub y: f64,
    /// Width in display pixels (always >= [`MIN_CLIP_SIZE`]).
    pub width: f64,
    /// Height in display pixels (always >= [`MIN_CLIP_SIZE`]).
    pub height: f64,
}

impl ClipRect {
    /// Create a new rectangle from raw components.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True if the point lies inside the rectangle (edges inclusive).
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// The displayed image's extent, i.e. the space the clip rectangle lives in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Displayed image width in display pixels.
    pub width: f64,
    /// Displayed image height in display pixels.
    pub height: f64,
}

impl Bounds {
    /// Create new bounds from a displayed width and height.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// One of the eight resize handles on the clip rectangle's edges and corners.
///
/// The handle names follow compass directions: resizing from a handle moves
/// that edge or corner while the opposite edge or corner stays fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handle {
    #[serde(rename = "n")]
    North,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "se")]
    SouthEast,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "sw")]
    SouthWest,
    #[serde(rename = "w")]
    West,
    #[serde(rename = "nw")]
    NorthWest,
}

impl Handle {
    /// Parse a short compass code ("n", "ne", ...) as sent over the JS
    /// boundary. Unknown codes return `None`; callers treat that as a
    /// defensive no-op rather than an error.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "n" => Some(Handle::North),
            "ne" => Some(Handle::NorthEast),
            "e" => Some(Handle::East),
            "se" => Some(Handle::SouthEast),
            "s" => Some(Handle::South),
            "sw" => Some(Handle::SouthWest),
            "w" => Some(Handle::West),
            "nw" => Some(Handle::NorthWest),
            _ => None,
        }
    }

    /// True if this handle adjusts the left edge.
    fn moves_west(self) -> bool {
        matches!(self, Handle::West | Handle::NorthWest | Handle::SouthWest)
    }

    /// True if this handle adjusts the right edge.
    fn moves_east(self) -> bool {
        matches!(self, Handle::East | Handle::NorthEast | Handle::SouthEast)
    }

    /// True if this handle adjusts the top edge.
    fn moves_north(self) -> bool {
        matches!(self, Handle::North | Handle::NorthEast | Handle::NorthWest)
    }

    /// True if this handle adjusts the bottom edge.
    fn moves_south(self) -> bool {
        matches!(self, Handle::South | Handle::SouthEast | Handle::SouthWest)
    }
}

/// Where an initial pointer contact landed on the clip rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactZone {
    /// Inside the rectangle body: the gesture becomes a drag.
    Body,
    /// On one of the eight resize handles: the gesture becomes a resize.
    Grip(Handle),
}

/// Create the initial clip rectangle for a freshly entered clip mode.
///
/// The rectangle is centered, sized to 50% of each display dimension with
/// each dimension capped at [`INIT_MAX_SIZE`], floored at [`MIN_CLIP_SIZE`],
/// and clamped to stay fully inside the display.
pub fn init_clip(display_width: f64, display_height: f64) -> ClipRect {
    let width = (display_width * 0.5)
        .min(INIT_MAX_SIZE)
        .max(MIN_CLIP_SIZE)
        .min(display_width.max(MIN_CLIP_SIZE));
    let height = (display_height * 0.5)
        .min(INIT_MAX_SIZE)
        .max(MIN_CLIP_SIZE)
        .min(display_height.max(MIN_CLIP_SIZE));

    let x = ((display_width - width) / 2.0).max(0.0);
    let y = ((display_height - height) / 2.0).max(0.0);

    ClipRect::new(x, y, width, height)
}

/// Translate the rectangle by a pointer delta, clamped to the bounds.
///
/// Width and height are never altered by a move: when the rectangle hits an
/// edge it simply stops there.
pub fn translate(rect: &ClipRect, dx: f64, dy: f64, bounds: &Bounds) -> ClipRect {
    let max_x = (bounds.width - rect.width).max(0.0);
    let max_y = (bounds.height - rect.height).max(0.0);

    ClipRect {
        x: (rect.x + dx).clamp(0.0, max_x),
        y: (rect.y + dy).clamp(0.0, max_y),
        width: rect.width,
        height: rect.height,
    }
}

/// Resize the rectangle from a handle by a pointer delta.
///
/// Each handle adjusts only its own edges; the opposite edge is held fixed
/// (resizing from the north-west handle keeps the bottom-right corner in
/// place). Width and height floor at [`MIN_CLIP_SIZE`]: when a delta would
/// push a dimension below the floor, the floor wins and the remaining
/// position delta is discarded, so the rectangle never jumps.
pub fn resize(rect: &ClipRect, handle: Handle, dx: f64, dy: f64, bounds: &Bounds) -> ClipRect {
    let mut out = *rect;

    if handle.moves_west() {
        // Right edge fixed; the left edge may not cross it or leave bounds.
        let right = rect.right();
        let new_x = (rect.x + dx).clamp(0.0, right - MIN_CLIP_SIZE);
        out.x = new_x;
        out.width = right - new_x;
    } else if handle.moves_east() {
        // Left edge fixed.
        out.width = (rect.width + dx).clamp(MIN_CLIP_SIZE, (bounds.width - rect.x).max(MIN_CLIP_SIZE));
    }

    if handle.moves_north() {
        // Bottom edge fixed.
        let bottom = rect.bottom();
        let new_y = (rect.y + dy).clamp(0.0, bottom - MIN_CLIP_SIZE);
        out.y = new_y;
        out.height = bottom - new_y;
    } else if handle.moves_south() {
        // Top edge fixed.
        out.height =
            (rect.height + dy).clamp(MIN_CLIP_SIZE, (bounds.height - rect.y).max(MIN_CLIP_SIZE));
    }

    out
}

/// Classify a pointer contact against the rectangle.
///
/// Corners take priority over edges, edges over the body, so a contact near
/// a corner always resizes both axes. Contacts outside the rectangle (and
/// outside every handle's tolerance zone) return `None`.
pub fn hit_test(rect: &ClipRect, px: f64, py: f64, tolerance: f64) -> Option<ContactZone> {
    let near = |value: f64, target: f64| (value - target).abs() <= tolerance;
    let within_x = px >= rect.x - tolerance && px <= rect.right() + tolerance;
    let within_y = py >= rect.y - tolerance && py <= rect.bottom() + tolerance;

    if !within_x || !within_y {
        return None;
    }

    let on_west = near(px, rect.x);
    let on_east = near(px, rect.right());
    let on_north = near(py, rect.y);
    let on_south = near(py, rect.bottom());

    let handle = match (on_west, on_east, on_north, on_south) {
        (true, _, true, _) => Some(Handle::NorthWest),
        (_, true, true, _) => Some(Handle::NorthEast),
        (true, _, _, true) => Some(Handle::SouthWest),
        (_, true, _, true) => Some(Handle::SouthEast),
        (true, _, _, _) => Some(Handle::West),
        (_, true, _, _) => Some(Handle::East),
        (_, _, true, _) => Some(Handle::North),
        (_, _, _, true) => Some(Handle::South),
        _ => None,
    };

    match handle {
        Some(h) => Some(ContactZone::Grip(h)),
        None if rect.contains(px, py) => Some(ContactZone::Body),
        None => None,
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for display bounds large enough to hold a minimum rect.
    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (40.0f64..=2000.0, 40.0f64..=2000.0).prop_map(|(w, h)| Bounds::new(w, h))
    }

    /// Strategy for bounds together with a valid rectangle inside them.
    fn bounds_and_rect() -> impl Strategy<Value = (Bounds, ClipRect)> {
        bounds_strategy().prop_flat_map(|bounds| {
            let max_x = bounds.width - MIN_CLIP_SIZE;
            let max_y = bounds.height - MIN_CLIP_SIZE;
            (Just(bounds), 0.0..=max_x, 0.0..=max_y).prop_flat_map(|(bounds, x, y)| {
                let w_hi = bounds.width - x;
                let h_hi = bounds.height - y;
                (MIN_CLIP_SIZE..=w_hi, MIN_CLIP_SIZE..=h_hi)
                    .prop_map(move |(w, h)| (bounds, ClipRect::new(x, y, w, h)))
            })
        })
    }

    /// Strategy for all eight handles.
    fn handle_strategy() -> impl Strategy<Value = Handle> {
        prop_oneof![
            Just(Handle::North),
            Just(Handle::NorthEast),
            Just(Handle::East),
            Just(Handle::SouthEast),
            Just(Handle::South),
            Just(Handle::SouthWest),
            Just(Handle::West),
            Just(Handle::NorthWest),
        ]
    }

    fn assert_invariants(rect: &ClipRect, bounds: &Bounds) {
        assert!(rect.width >= MIN_CLIP_SIZE - 1e-9);
        assert!(rect.height >= MIN_CLIP_SIZE - 1e-9);
        assert!(rect.x >= -1e-9);
        assert!(rect.y >= -1e-9);
        assert!(rect.right() <= bounds.width + 1e-9);
        assert!(rect.bottom() <= bounds.height + 1e-9);
    }

    proptest! {
        /// Property: init_clip is always fully contained in the display.
        #[test]
        fn prop_init_clip_contained(
            w in 40.0f64..=4000.0,
            h in 40.0f64..=4000.0,
        ) {
            let rect = init_clip(w, h);
            assert_invariants(&rect, &Bounds::new(w, h));
        }

        /// Property: translate never changes width or height.
        #[test]
        fn prop_translate_preserves_size(
            (bounds, rect) in bounds_and_rect(),
            (dx, dy) in (-3000.0f64..=3000.0, -3000.0f64..=3000.0),
        ) {
            let moved = translate(&rect, dx, dy, &bounds);

            prop_assert_eq!(moved.width, rect.width);
            prop_assert_eq!(moved.height, rect.height);
            assert_invariants(&moved, &bounds);
        }

        /// Property: resize keeps the opposite edges fixed and upholds the
        /// floor and bounds invariants.
        #[test]
        fn prop_resize_fixed_edges_and_floor(
            (bounds, rect) in bounds_and_rect(),
            handle in handle_strategy(),
            (dx, dy) in (-3000.0f64..=3000.0, -3000.0f64..=3000.0),
        ) {
            let resized = resize(&rect, handle, dx, dy, &bounds);
            assert_invariants(&resized, &bounds);

            // The edge opposite each moving edge never moves.
            if handle.moves_west() {
                prop_assert!((resized.right() - rect.right()).abs() < 1e-9);
            }
            if handle.moves_east() {
                prop_assert_eq!(resized.x, rect.x);
            }
            if handle.moves_north() {
                prop_assert!((resized.bottom() - rect.bottom()).abs() < 1e-9);
            }
            if handle.moves_south() {
                prop_assert_eq!(resized.y, rect.y);
            }
        }

        /// Property: a pure horizontal handle never touches the vertical
        /// extent, and vice versa.
        #[test]
        fn prop_resize_axis_isolation(
            (bounds, rect) in bounds_and_rect(),
            (dx, dy) in (-500.0f64..=500.0, -500.0f64..=500.0),
        ) {
            let horizontal = resize(&rect, Handle::East, dx, dy, &bounds);
            prop_assert_eq!(horizontal.y, rect.y);
            prop_assert_eq!(horizontal.height, rect.height);

            let vertical = resize(&rect, Handle::South, dx, dy, &bounds);
            prop_assert_eq!(vertical.x, rect.x);
            prop_assert_eq!(vertical.width, rect.width);
        }
    }
}
