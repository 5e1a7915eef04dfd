//! Footer band text overlay.
//!
//! Draws the source/date label left-aligned and the page-number label
//! right-aligned in the footer band. The page label is measured first so the
//! two never overlap; on a crop too narrow for both, the date wins and the
//! page label is dropped.
//!
//! Glyph metrics and rasterization come from a caller-supplied `ab_glyph`
//! font face. Layout is pure math over measured widths, so it is testable
//! without any font file.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

/// Footer label text size in output pixels.
pub const FOOTER_TEXT_SIZE: f32 = 14.0;

/// Margin between a label and its band edge, in output pixels.
pub const TEXT_MARGIN: u32 = 20;

/// Minimum horizontal gap between the date and page labels.
pub const TEXT_GAP: u32 = 16;

/// Distance from the band's bottom edge to the bottom of the text.
pub const BASELINE_INSET: u32 = 8;

/// Resolved x positions for the footer labels. `None` means the label is
/// not drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterLayout {
    /// Left edge of the date label.
    pub date_x: Option<u32>,
    /// Left edge of the page label.
    pub page_x: Option<u32>,
}

/// Measure the advance width of a line of text at the given pixel size.
pub fn measure_text(font: &FontArc, px: f32, text: &str) -> f64 {
    let scaled = font.as_scaled(PxScale::from(px));
    text.chars()
        .map(|c| f64::from(scaled.h_advance(scaled.glyph_id(c))))
        .sum()
}

/// Lay out the footer labels from their measured widths.
///
/// The date sits [`TEXT_MARGIN`] from the left edge; the page label is
/// right-aligned with the same margin. When the right-aligned page label
/// would intrude into the date label (plus [`TEXT_GAP`]), it is dropped.
pub fn layout_footer(
    out_width: u32,
    date_width: Option<u32>,
    page_width: Option<u32>,
) -> FooterLayout {
    let date_x = date_width.map(|_| TEXT_MARGIN);

    let page_x = page_width.and_then(|pw| {
        let x = out_width.checked_sub(TEXT_MARGIN + pw)?;
        let min_x = match (date_x, date_width) {
            (Some(dx), Some(dw)) => dx + dw + TEXT_GAP,
            _ => TEXT_MARGIN,
        };
        (x >= min_x).then_some(x)
    });

    FooterLayout { date_x, page_x }
}

/// Pick a readable label color for the given band background.
pub fn text_color_for(background: Rgba<u8>) -> Rgba<u8> {
    // Rec. 601 luma.
    let [r, g, b, _] = background.0;
    let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    if luma > 140.0 {
        Rgba([17, 17, 17, 255])
    } else {
        Rgba([255, 255, 255, 255])
    }
}

/// Draw the footer labels into the output surface.
///
/// `band_top` and `band_height` locate the footer band within the surface.
/// Either label may be absent (toggled off, or dropped by layout).
pub fn draw_footer_text(
    surface: &mut RgbaImage,
    font: &FontArc,
    band_top: u32,
    band_height: u32,
    date_text: Option<&str>,
    page_text: Option<&str>,
    color: Rgba<u8>,
) {
    let out_width = surface.width();
    let date_width = date_text.map(|t| measure_text(font, FOOTER_TEXT_SIZE, t).ceil() as u32);
    let page_width = page_text.map(|t| measure_text(font, FOOTER_TEXT_SIZE, t).ceil() as u32);

    let layout = layout_footer(out_width, date_width, page_width);

    let text_height = FOOTER_TEXT_SIZE.ceil() as u32;
    let y = (band_top + band_height)
        .saturating_sub(BASELINE_INSET + text_height)
        .max(band_top) as i32;

    if let (Some(x), Some(text)) = (layout.date_x, date_text) {
        draw_text_mut(
            surface,
            color,
            x as i32,
            y,
            PxScale::from(FOOTER_TEXT_SIZE),
            font,
            text,
        );
    }
    if let (Some(x), Some(text)) = (layout.page_x, page_text) {
        draw_text_mut(
            surface,
            color,
            x as i32,
            y,
            PxScale::from(FOOTER_TEXT_SIZE),
            font,
            text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_both_labels_fit() {
        // 400 wide, date 120, page 60: page right-aligned at 320.
        let layout = layout_footer(400, Some(120), Some(60));
        assert_eq!(layout.date_x, Some(TEXT_MARGIN));
        assert_eq!(layout.page_x, Some(320));
    }

    #[test]
    fn test_layout_page_only() {
        let layout = layout_footer(400, None, Some(60));
        assert_eq!(layout.date_x, None);
        assert_eq!(layout.page_x, Some(320));
    }

    #[test]
    fn test_layout_date_only() {
        let layout = layout_footer(400, Some(120), None);
        assert_eq!(layout.date_x, Some(TEXT_MARGIN));
        assert_eq!(layout.page_x, None);
    }

    #[test]
    fn test_layout_drops_page_on_overlap() {
        // Date spans 20..220; page would start at 110 and collide.
        let layout = layout_footer(200, Some(200), Some(70));
        assert_eq!(layout.date_x, Some(TEXT_MARGIN));
        assert_eq!(layout.page_x, None);
    }

    #[test]
    fn test_layout_page_exactly_at_gap() {
        // date 20..120, min page x = 120 + 16 = 136; page 60 wide in a 216
        // output lands exactly at 136.
        let layout = layout_footer(216, Some(100), Some(60));
        assert_eq!(layout.page_x, Some(136));
    }

    #[test]
    fn test_layout_page_wider_than_output() {
        let layout = layout_footer(50, None, Some(100));
        assert_eq!(layout.page_x, None);
    }

    #[test]
    fn test_text_color_contrast() {
        assert_eq!(
            text_color_for(Rgba([255, 255, 255, 255])),
            Rgba([17, 17, 17, 255])
        );
        assert_eq!(
            text_color_for(Rgba([0, 32, 64, 255])),
            Rgba([255, 255, 255, 255])
        );
    }
}
