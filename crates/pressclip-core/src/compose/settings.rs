//! Composition settings.
//!
//! The shapes here mirror the customization document served by the external
//! settings collaborator, so a settings snapshot deserializes straight from
//! its JSON. A snapshot is taken at the start of each composition run and
//! never re-read mid-run: settings edits while a run is in flight affect
//! only the next run.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Horizontal placement of a band logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Configuration for one clip band (the strip above or below the cropped
/// region in the composite).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BandConfig {
    /// URL of the logo to draw in the band, if any.
    pub logo_url: Option<String>,
    /// Band height in output pixels.
    pub height_px: u32,
    /// CSS hex background color ("#rgb", "#rrggbb" or "#rrggbbaa").
    pub background_color: String,
    /// Horizontal logo placement.
    pub logo_alignment: LogoAlignment,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            logo_url: None,
            height_px: 50,
            background_color: "#ffffff".to_string(),
            logo_alignment: LogoAlignment::Center,
        }
    }
}

impl BandConfig {
    /// The band's background color as a pixel, falling back to white when
    /// the configured string does not parse. A bad color in the settings
    /// document must not abort a composition.
    pub fn color(&self) -> Rgba<u8> {
        parse_hex_color(&self.background_color).unwrap_or(Rgba([255, 255, 255, 255]))
    }
}

/// Text overlay toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOptions {
    /// Draw "{host} | {date}" in the footer band.
    pub show_date: bool,
    /// Draw "Page {n}" right-aligned in the footer band.
    pub show_page_number: bool,
}

/// Immutable settings snapshot for one composition run, read from the
/// customization collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositionSettings {
    /// Band above the cropped region.
    pub top_band: BandConfig,
    /// Band below the cropped region.
    pub footer_band: BandConfig,
    /// Text overlay toggles.
    pub display_options: DisplayOptions,
}

/// Parse a CSS hex color string into an RGBA pixel.
///
/// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa` (case-insensitive). Returns
/// `None` for anything else.
pub fn parse_hex_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let nibble = c.to_digit(16)? as u8;
                channels[i] = nibble << 4 | nibble;
            }
            Some(Rgba([channels[0], channels[1], channels[2], 255]))
        }
        6 | 8 => {
            let parse_pair = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
            let r = parse_pair(0)?;
            let g = parse_pair(2)?;
            let b = parse_pair(4)?;
            let a = if hex.len() == 8 { parse_pair(6)? } else { 255 };
            Some(Rgba([r, g, b, a]))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_full() {
        assert_eq!(parse_hex_color("#1a2b3c"), Some(Rgba([26, 43, 60, 255])));
        assert_eq!(parse_hex_color("#FFFFFF"), Some(Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_parse_hex_color_short() {
        assert_eq!(parse_hex_color("#f00"), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(parse_hex_color("#abc"), Some(Rgba([170, 187, 204, 255])));
    }

    #[test]
    fn test_parse_hex_color_with_alpha() {
        assert_eq!(parse_hex_color("#00000080"), Some(Rgba([0, 0, 0, 128])));
    }

    #[test]
    fn test_parse_hex_color_rejects_malformed() {
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn test_band_color_falls_back_to_white() {
        let mut band = BandConfig::default();
        band.background_color = "chartreuse".to_string();
        assert_eq!(band.color(), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_settings_deserialize_from_customization_doc() {
        let json = r##"{
            "topBand": {
                "logoUrl": "https://cdn.example/logo.png",
                "heightPx": 60,
                "backgroundColor": "#003366",
                "logoAlignment": "left"
            },
            "footerBand": {
                "heightPx": 40,
                "backgroundColor": "#eee"
            },
            "displayOptions": { "showDate": true, "showPageNumber": true }
        }"##;

        let settings: CompositionSettings = serde_json::from_str(json).unwrap();
        assert_eq!(
            settings.top_band.logo_url.as_deref(),
            Some("https://cdn.example/logo.png")
        );
        assert_eq!(settings.top_band.height_px, 60);
        assert_eq!(settings.top_band.logo_alignment, LogoAlignment::Left);
        // Omitted fields take their defaults.
        assert_eq!(settings.footer_band.logo_url, None);
        assert_eq!(
            settings.footer_band.logo_alignment,
            LogoAlignment::Center
        );
        assert!(settings.display_options.show_date);
    }

    #[test]
    fn test_settings_default_bands() {
        let settings = CompositionSettings::default();
        assert_eq!(settings.top_band.height_px, 50);
        assert_eq!(settings.footer_band.color(), Rgba([255, 255, 255, 255]));
        assert!(!settings.display_options.show_date);
    }
}
