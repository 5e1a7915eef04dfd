//! Band logo fitting and placement.
//!
//! A logo is scaled to fit within a fraction of the output width and of its
//! band's height, preserving aspect ratio, then placed per the configured
//! alignment with a fixed margin from the aligned edge. Pure math; the
//! pipeline does the actual pixel work.

use super::settings::LogoAlignment;

/// A logo may occupy at most this fraction of the output width.
pub const MAX_WIDTH_FRAC: f64 = 0.3;

/// A logo may occupy at most this fraction of its band's height.
pub const MAX_HEIGHT_FRAC: f64 = 0.8;

/// Margin from the aligned band edge, in output pixels.
pub const EDGE_MARGIN: u32 = 20;

/// Scale a logo to fit within 30% of the output width and 80% of the band
/// height, preserving aspect ratio. Logos already inside the box keep their
/// size; a raster logo is never upscaled.
pub fn fit_logo(logo_width: u32, logo_height: u32, out_width: u32, band_height: u32) -> (u32, u32) {
    if logo_width == 0 || logo_height == 0 {
        return (0, 0);
    }

    let max_w = f64::from(out_width) * MAX_WIDTH_FRAC;
    let max_h = f64::from(band_height) * MAX_HEIGHT_FRAC;

    let scale = (max_w / f64::from(logo_width))
        .min(max_h / f64::from(logo_height))
        .min(1.0);

    let w = (f64::from(logo_width) * scale).round().max(1.0) as u32;
    let h = (f64::from(logo_height) * scale).round().max(1.0) as u32;
    (w, h)
}

/// Position a fitted logo inside its band.
///
/// `band_top` is the y offset of the band within the output surface. The
/// logo is centered vertically; horizontally it sits [`EDGE_MARGIN`] pixels
/// from the aligned edge, or centered.
pub fn logo_position(
    alignment: LogoAlignment,
    fitted_width: u32,
    fitted_height: u32,
    out_width: u32,
    band_top: u32,
    band_height: u32,
) -> (i64, i64) {
    let x = match alignment {
        LogoAlignment::Left => i64::from(EDGE_MARGIN),
        LogoAlignment::Center => (i64::from(out_width) - i64::from(fitted_width)) / 2,
        LogoAlignment::Right => {
            i64::from(out_width) - i64::from(EDGE_MARGIN) - i64::from(fitted_width)
        }
    };
    let y = i64::from(band_top) + (i64::from(band_height) - i64::from(fitted_height)) / 2;

    (x.max(0), y.max(i64::from(band_top)))
}
