//! Page zoom state.
//!
//! Tracks the current zoom scale of the displayed page. Pinch gestures are
//! relative to the scale at gesture start (`initial_scale`), so a long pinch
//! does not accumulate rounding error across move events. The gesture
//! adapter drives this state; the resolution manager observes the resulting
//! scale.

/// Minimum zoom scale.
pub const MIN_SCALE: f64 = 0.5;

/// Maximum zoom scale.
pub const MAX_SCALE: f64 = 8.0;

/// Scale step applied per modifier-gated wheel event.
pub const WHEEL_STEP: f64 = 0.1;

/// A gesture ending within this distance of 1.0 snaps exactly to 1.0.
pub const SNAP_EPSILON: f64 = 0.1;

/// Text-sharpening mode transitions happen inside these scale bands. Frame
/// throttling is waived while the scale is inside one so the transition is
/// never rendered a frame late.
pub const SHARPEN_BANDS: [(f64, f64); 2] = [(1.2, 1.3), (2.4, 2.6)];

/// Zoom scale state for the active page image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    /// Current scale, always between [`MIN_SCALE`] and [`MAX_SCALE`].
    scale: f64,
    /// Scale snapshotted at the start of the in-progress gesture.
    initial_scale: f64,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            initial_scale: 1.0,
        }
    }
}

impl ZoomState {
    /// Create a fresh state at scale 1.0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Reset to 1.0, called whenever the active image changes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Snapshot the current scale at the start of a pinch or wheel gesture.
    pub fn begin_gesture(&mut self) {
        self.initial_scale = self.scale;
    }

    /// Apply a pinch ratio (current inter-finger distance over the distance
    /// at gesture start) relative to the snapshotted scale.
    pub fn apply_pinch_ratio(&mut self, ratio: f64) -> f64 {
        if ratio.is_finite() && ratio > 0.0 {
            self.scale = (self.initial_scale * ratio).clamp(MIN_SCALE, MAX_SCALE);
        }
        self.scale
    }

    /// Apply one wheel step in the given direction (+1 zooms in, -1 out).
    pub fn apply_wheel_step(&mut self, direction: f64) -> f64 {
        let step = if direction > 0.0 {
            WHEEL_STEP
        } else {
            -WHEEL_STEP
        };
        self.scale = (self.scale + step).clamp(MIN_SCALE, MAX_SCALE);
        self.scale
    }

    /// Finish the in-progress gesture. A scale within [`SNAP_EPSILON`] of
    /// 1.0 snaps exactly to 1.0; returns true if the snap happened, which
    /// tells the caller to ask the resolution manager for the base asset.
    pub fn end_gesture(&mut self) -> bool {
        self.initial_scale = self.scale;
        if (self.scale - 1.0).abs() <= SNAP_EPSILON {
            self.scale = 1.0;
            self.initial_scale = 1.0;
            true
        } else {
            false
        }
    }
}

/// True if the scale sits inside one of the text-sharpening transition
/// bands, where gesture updates must not be frame-skipped.
pub fn in_sharpen_band(scale: f64) -> bool {
    SHARPEN_BANDS
        .iter()
        .any(|&(lo, hi)| scale >= lo && scale <= hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scale_is_one() {
        let zoom = ZoomState::new();
        assert_eq!(zoom.scale(), 1.0);
    }

    #[test]
    fn test_pinch_relative_to_gesture_start() {
        let mut zoom = ZoomState::new();
        zoom.begin_gesture();

        zoom.apply_pinch_ratio(2.0);
        assert_eq!(zoom.scale(), 2.0);

        // A later ratio in the same gesture is still relative to 1.0, not
        // to the intermediate 2.0.
        zoom.apply_pinch_ratio(1.5);
        assert_eq!(zoom.scale(), 1.5);
    }

    #[test]
    fn test_pinch_clamps_to_range() {
        let mut zoom = ZoomState::new();
        zoom.begin_gesture();

        assert_eq!(zoom.apply_pinch_ratio(100.0), MAX_SCALE);
        assert_eq!(zoom.apply_pinch_ratio(0.001), MIN_SCALE);
    }

    #[test]
    fn test_pinch_ignores_degenerate_ratio() {
        let mut zoom = ZoomState::new();
        zoom.begin_gesture();
        zoom.apply_pinch_ratio(2.0);

        // Zero, negative, and NaN ratios come from degenerate touch input
        // (both fingers reported at the same point) and leave scale alone.
        assert_eq!(zoom.apply_pinch_ratio(0.0), 2.0);
        assert_eq!(zoom.apply_pinch_ratio(-1.0), 2.0);
        assert_eq!(zoom.apply_pinch_ratio(f64::NAN), 2.0);
    }

    #[test]
    fn test_wheel_steps() {
        let mut zoom = ZoomState::new();

        assert!((zoom.apply_wheel_step(1.0) - 1.1).abs() < 1e-12);
        assert!((zoom.apply_wheel_step(1.0) - 1.2).abs() < 1e-12);
        assert!((zoom.apply_wheel_step(-1.0) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_wheel_clamps() {
        let mut zoom = ZoomState::new();
        for _ in 0..200 {
            zoom.apply_wheel_step(1.0);
        }
        assert_eq!(zoom.scale(), MAX_SCALE);

        for _ in 0..200 {
            zoom.apply_wheel_step(-1.0);
        }
        assert_eq!(zoom.scale(), MIN_SCALE);
    }

    #[test]
    fn test_end_gesture_snaps_near_one() {
        let mut zoom = ZoomState::new();
        zoom.begin_gesture();
        zoom.apply_pinch_ratio(1.08);

        assert!(zoom.end_gesture());
        assert_eq!(zoom.scale(), 1.0);
    }

    #[test]
    fn test_end_gesture_no_snap_far_from_one() {
        let mut zoom = ZoomState::new();
        zoom.begin_gesture();
        zoom.apply_pinch_ratio(1.6);

        assert!(!zoom.end_gesture());
        assert!((zoom.scale() - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_reset_on_image_change() {
        let mut zoom = ZoomState::new();
        zoom.begin_gesture();
        zoom.apply_pinch_ratio(3.0);

        zoom.reset();
        assert_eq!(zoom.scale(), 1.0);
    }

    #[test]
    fn test_sharpen_bands() {
        assert!(!in_sharpen_band(1.0));
        assert!(in_sharpen_band(1.2));
        assert!(in_sharpen_band(1.25));
        assert!(in_sharpen_band(1.3));
        assert!(!in_sharpen_band(1.35));
        assert!(in_sharpen_band(2.5));
        assert!(!in_sharpen_band(2.7));
    }
}
