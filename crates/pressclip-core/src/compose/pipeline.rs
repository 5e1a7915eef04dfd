//! The composition pipeline.
//!
//! Turns a committed clip rectangle into the shareable composite: the
//! cropped page region framed by a top and footer band, each with a solid
//! background and an optional logo, plus the footer text overlay, serialized
//! to PNG.
//!
//! # Ordering
//!
//! The steps share one mutable drawing surface, so they run as a strict
//! linear chain: each step starts only after the previous one completed.
//! The suspension points are the logo loads; everything else is synchronous
//! pixel work.
//!
//! # One run at a time
//!
//! A [`Composer`] allows a single in-flight run. A commit while another run
//! is in progress is rejected with [`ComposeError::Busy`], never queued:
//! overlapping runs would interleave draws into inconsistent surfaces.
//! Every run produces exactly one terminal outcome, success or error.
//!
//! # Failure semantics
//!
//! Missing inputs (steps 1-2) and serialization failures (step 9) reject
//! the run. Logo failures (steps 4 and 7) are recovered locally: the band
//! is drawn without its logo and the run continues. A logo failure can
//! never change the output dimensions.

use std::cell::Cell;

use ab_glyph::FontArc;
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use thiserror::Error;

use super::logo::{fit_logo, logo_position};
use super::mapping::to_native_crop;
use super::settings::{CompositionSettings, LogoAlignment};
use super::text::{draw_footer_text, text_color_for};
use crate::assets::{AssetLoadError, AssetLoader};
use crate::encode::{encode_png, EncodeError};
use crate::geometry::{Bounds, ClipRect};
use crate::raster::RasterImage;

/// Errors that terminate a composition run.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Commit was requested with no active clip rectangle.
    #[error("No active clip rectangle")]
    NoClip,

    /// Commit was requested with no loaded source image.
    #[error("No loaded source image")]
    NoSource,

    /// Another composition run is already in flight.
    #[error("A composition run is already in progress")]
    Busy,

    /// The output surface could not be serialized.
    #[error("Output serialization failed: {0}")]
    Serialization(String),
}

impl From<EncodeError> for ComposeError {
    fn from(err: EncodeError) -> Self {
        ComposeError::Serialization(err.to_string())
    }
}

/// The composed output raster: an encoded PNG blob plus its dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionResult {
    /// Output surface width in pixels.
    pub width: u32,
    /// Output surface height in pixels.
    pub height: u32,
    /// PNG-encoded image data.
    pub png: Vec<u8>,
}

/// Everything a single run reads, captured at commit time.
#[derive(Debug, Clone, Copy)]
pub struct ComposeRequest<'a> {
    /// The committed clip rectangle, in display space.
    pub clip: Option<ClipRect>,
    /// The currently displayed source image at its native resolution.
    pub source: Option<&'a RasterImage>,
    /// The on-screen size the clip rectangle is relative to.
    pub display: Bounds,
    /// Page number of the displayed page.
    pub page: u32,
    /// Publication name shown before the date in the footer.
    pub host_label: &'a str,
    /// Locale-formatted date string, supplied by the viewer chrome.
    pub date_label: &'a str,
}

/// RAII reset for the in-flight flag: releases the run slot however the
/// run ends, including a dropped future.
struct RunGuard<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Owns the single composition run slot and the footer font.
#[derive(Debug, Default)]
pub struct Composer {
    in_flight: Cell<bool>,
    font: Option<FontArc>,
}

impl Composer {
    /// Create a composer without a footer font; text overlays are skipped
    /// until one is provided.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a composer that renders footer text with the given font face.
    pub fn with_font(font: FontArc) -> Self {
        Self {
            in_flight: Cell::new(false),
            font: Some(font),
        }
    }

    /// Create a composer from raw TTF/OTF font bytes. Returns `None` when
    /// the bytes are not a parseable font face; the text overlay degrades
    /// silently, like any other missing overlay asset.
    pub fn try_with_font_bytes(bytes: Vec<u8>) -> Option<Self> {
        FontArc::try_from_vec(bytes).ok().map(Self::with_font)
    }

    /// True while a run is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    /// Run the composition pipeline for a committed clip.
    ///
    /// Rejects immediately with [`ComposeError::Busy`] if a run is already
    /// in flight, with [`ComposeError::NoClip`] / [`ComposeError::NoSource`]
    /// on missing inputs, and with [`ComposeError::Serialization`] if the
    /// final encode fails. Logo load failures do not reject.
    pub async fn commit<L: AssetLoader>(
        &self,
        request: &ComposeRequest<'_>,
        settings: &CompositionSettings,
        loader: &L,
    ) -> Result<CompositionResult, ComposeError> {
        if self.in_flight.replace(true) {
            return Err(ComposeError::Busy);
        }
        let _guard = RunGuard {
            flag: &self.in_flight,
        };

        self.run(request, settings, loader).await
    }

    async fn run<L: AssetLoader>(
        &self,
        request: &ComposeRequest<'_>,
        settings: &CompositionSettings,
        loader: &L,
    ) -> Result<CompositionResult, ComposeError> {
        // Step 1: validate inputs and map the clip into native space.
        let clip = request.clip.ok_or(ComposeError::NoClip)?;
        let source = request.source.ok_or(ComposeError::NoSource)?;
        if source.is_empty() {
            return Err(ComposeError::NoSource);
        }
        let source_img = source.to_rgba_image().ok_or(ComposeError::NoSource)?;
        let crop = to_native_crop(&clip, source.width, source.height, &request.display);

        let top_height = settings.top_band.height_px;
        let footer_height = settings.footer_band.height_px;
        let out_width = crop.width;
        let out_height = crop.height + top_height + footer_height;

        // Step 2: allocate the output surface.
        let mut surface = RgbaImage::new(out_width, out_height);

        // Step 3: top band background.
        fill_band(&mut surface, 0, top_height, settings.top_band.color());

        // Step 4: top band logo.
        if let Some(url) = settings.top_band.logo_url.as_deref() {
            match load_logo(loader, url).await {
                Ok(logo) => draw_logo(
                    &mut surface,
                    &logo,
                    settings.top_band.logo_alignment,
                    0,
                    top_height,
                ),
                Err(_) => {} // skip silently, the band stays unadorned
            }
        }

        // Step 5: the cropped source region, offset below the top band.
        let region =
            imageops::crop_imm(&source_img, crop.x, crop.y, crop.width, crop.height).to_image();
        imageops::overlay(&mut surface, &region, 0, i64::from(top_height));

        // Step 6: footer band background.
        let footer_top = top_height + crop.height;
        fill_band(
            &mut surface,
            footer_top,
            footer_height,
            settings.footer_band.color(),
        );

        // Step 7: footer logo.
        if let Some(url) = settings.footer_band.logo_url.as_deref() {
            match load_logo(loader, url).await {
                Ok(logo) => draw_logo(
                    &mut surface,
                    &logo,
                    settings.footer_band.logo_alignment,
                    footer_top,
                    footer_height,
                ),
                Err(_) => {}
            }
        }

        // Step 8: footer text overlay.
        if footer_height > 0 {
            if let Some(font) = &self.font {
                let date = settings
                    .display_options
                    .show_date
                    .then(|| format!("{} | {}", request.host_label, request.date_label));
                let page = settings
                    .display_options
                    .show_page_number
                    .then(|| format!("Page {}", request.page));

                if date.is_some() || page.is_some() {
                    draw_footer_text(
                        &mut surface,
                        font,
                        footer_top,
                        footer_height,
                        date.as_deref(),
                        page.as_deref(),
                        text_color_for(settings.footer_band.color()),
                    );
                }
            }
        }

        // Step 9: serialize the surface.
        let png = encode_png(surface.as_raw(), out_width, out_height)?;

        Ok(CompositionResult {
            width: out_width,
            height: out_height,
            png,
        })
    }
}

/// Fill one band's region with its background color.
fn fill_band(surface: &mut RgbaImage, top: u32, height: u32, color: Rgba<u8>) {
    if height == 0 || surface.width() == 0 {
        return;
    }
    let rect = Rect::at(0, top as i32).of_size(surface.width(), height);
    draw_filled_rect_mut(surface, rect, color);
}

/// Fetch and decode a band logo.
async fn load_logo<L: AssetLoader>(loader: &L, url: &str) -> Result<RgbaImage, AssetLoadError> {
    let bytes = loader.load(url).await?;
    let raster = RasterImage::decode(&bytes)?;
    raster
        .to_rgba_image()
        .ok_or(AssetLoadError::Decode(crate::raster::DecodeError::Empty))
}

/// Fit, position and draw a logo inside its band.
fn draw_logo(
    surface: &mut RgbaImage,
    logo: &RgbaImage,
    alignment: LogoAlignment,
    band_top: u32,
    band_height: u32,
) {
    let (fit_w, fit_h) = fit_logo(logo.width(), logo.height(), surface.width(), band_height);
    if fit_w == 0 || fit_h == 0 {
        return;
    }

    let scaled;
    let drawn = if (fit_w, fit_h) == logo.dimensions() {
        logo
    } else {
        scaled = imageops::resize(logo, fit_w, fit_h, imageops::FilterType::Triangle);
        &scaled
    };

    let (x, y) = logo_position(
        alignment,
        fit_w,
        fit_h,
        surface.width(),
        band_top,
        band_height,
    );
    imageops::overlay(surface, drawn, x, y);
}
