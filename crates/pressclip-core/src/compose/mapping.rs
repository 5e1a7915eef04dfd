//! Display-space to native-space coordinate mapping.
//!
//! The clip rectangle lives in display pixels (the on-screen size of the
//! rendered page); the source scan has its own native pixel grid. The two
//! are related by one scale factor per axis. Mapping happens once, at the
//! start of a composition run, so a resolution swap mid-run can never make
//! the factors inconsistent.

use crate::geometry::{Bounds, ClipRect};

/// A crop region in native (source image) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    /// Left edge in native pixels.
    pub x: u32,
    /// Top edge in native pixels.
    pub y: u32,
    /// Width in native pixels (always >= 1).
    pub width: u32,
    /// Height in native pixels (always >= 1).
    pub height: u32,
}

/// Per-axis scale factors from display space to native space.
pub fn scale_factors(natural_width: u32, natural_height: u32, display: &Bounds) -> (f64, f64) {
    (
        f64::from(natural_width) / display.width,
        f64::from(natural_height) / display.height,
    )
}

/// Map a display-space clip rectangle into a native-space crop region.
///
/// Coordinates are multiplied by the per-axis scale factor and rounded.
/// The result is clamped so the region always lies inside the native image,
/// with a minimum size of 1x1, even if the display rectangle was clamped
/// against slightly different bounds.
pub fn to_native_crop(
    rect: &ClipRect,
    natural_width: u32,
    natural_height: u32,
    display: &Bounds,
) -> CropRegion {
    let (scale_x, scale_y) = scale_factors(natural_width, natural_height, display);

    let x = ((rect.x * scale_x).round() as u32).min(natural_width.saturating_sub(1));
    let y = ((rect.y * scale_y).round() as u32).min(natural_height.saturating_sub(1));
    let width = ((rect.width * scale_x).round() as u32)
        .min(natural_width - x)
        .max(1);
    let height = ((rect.height * scale_y).round() as u32)
        .min(natural_height - y)
        .max(1);

    CropRegion {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_resolution_scenario() {
        // 800x600 display of a 1600x1200 scan: every coordinate doubles.
        let display = Bounds::new(800.0, 600.0);
        let rect = ClipRect::new(100.0, 100.0, 200.0, 150.0);

        let crop = to_native_crop(&rect, 1600, 1200, &display);
        assert_eq!(
            crop,
            CropRegion {
                x: 200,
                y: 200,
                width: 400,
                height: 300,
            }
        );
    }

    #[test]
    fn test_identity_scale() {
        let display = Bounds::new(640.0, 480.0);
        let rect = ClipRect::new(10.0, 20.0, 30.0, 40.0);

        let crop = to_native_crop(&rect, 640, 480, &display);
        assert_eq!(crop.x, 10);
        assert_eq!(crop.y, 20);
        assert_eq!(crop.width, 30);
        assert_eq!(crop.height, 40);
    }

    #[test]
    fn test_asymmetric_scale() {
        // Axes scale independently.
        let display = Bounds::new(400.0, 600.0);
        let rect = ClipRect::new(100.0, 300.0, 100.0, 100.0);

        let crop = to_native_crop(&rect, 800, 1800, &display);
        assert_eq!(crop.x, 200);
        assert_eq!(crop.y, 900);
        assert_eq!(crop.width, 200);
        assert_eq!(crop.height, 300);
    }

    #[test]
    fn test_fractional_scale_rounds() {
        let display = Bounds::new(300.0, 300.0);
        let rect = ClipRect::new(10.0, 10.0, 25.0, 25.0);

        // 1.5x scale: 10 -> 15, 25 -> 37.5 -> 38.
        let crop = to_native_crop(&rect, 450, 450, &display);
        assert_eq!(crop.x, 15);
        assert_eq!(crop.width, 38);
    }

    #[test]
    fn test_clamped_to_natural_bounds() {
        let display = Bounds::new(100.0, 100.0);
        // Rectangle flush against the display edge; rounding must not push
        // the crop outside the native image.
        let rect = ClipRect::new(80.0, 80.0, 20.0, 20.0);

        let crop = to_native_crop(&rect, 333, 333, &display);
        assert!(crop.x + crop.width <= 333);
        assert!(crop.y + crop.height <= 333);
    }

    #[test]
    fn test_minimum_one_pixel() {
        let display = Bounds::new(4000.0, 4000.0);
        // A small display rect against a tiny native image collapses to a
        // sub-pixel region; the crop floors at 1x1.
        let rect = ClipRect::new(0.0, 0.0, 20.0, 20.0);

        let crop = to_native_crop(&rect, 100, 100, &display);
        assert!(crop.width >= 1);
        assert!(crop.height >= 1);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let display = Bounds::new(777.0, 555.0);
        let rect = ClipRect::new(123.4, 56.7, 89.1, 23.4);

        let a = to_native_crop(&rect, 1234, 987, &display);
        let b = to_native_crop(&rect, 1234, 987, &display);
        assert_eq!(a, b);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the crop region always lies inside the native image.
        #[test]
        fn prop_crop_inside_native(
            (nat_w, nat_h) in (1u32..=4000, 1u32..=4000),
            (disp_w, disp_h) in (40.0f64..=2000.0, 40.0f64..=2000.0),
            (x, y) in (0.0f64..=1900.0, 0.0f64..=1900.0),
            (w, h) in (20.0f64..=500.0, 20.0f64..=500.0),
        ) {
            let display = Bounds::new(disp_w, disp_h);
            let rect = ClipRect::new(x, y, w, h);

            let crop = to_native_crop(&rect, nat_w, nat_h, &display);

            prop_assert!(crop.width >= 1);
            prop_assert!(crop.height >= 1);
            prop_assert!(crop.x + crop.width <= nat_w.max(1));
            prop_assert!(crop.y + crop.height <= nat_h.max(1));
        }
    }
}
