//! High-resolution asset management.
//!
//! Decides, from the zoom scale, when to preload and swap in a
//! higher-resolution scan of the displayed page. Resolution swapping is a
//! quality enhancement: every failure here is silent and the viewer stays on
//! the base asset.
//!
//! # Hysteresis
//!
//! The first time the scale exceeds [`UPGRADE_SCALE`], one preload of the
//! derived high-resolution URL is attempted. When the scale drops below
//! [`REVERT_SCALE`] while the high-resolution asset is active, the base
//! asset is restored. A preload is attempted at most once per image; a
//! successful preload stays cached, so re-crossing the upgrade threshold
//! after a revert swaps the cached asset back in without a second fetch.
//!
//! # Staleness
//!
//! Preloads complete asynchronously, possibly after the user has navigated
//! to a different page. Each preload carries the generation of the image it
//! was issued for and is discarded when it no longer matches.
//!
//! The caller must only apply a swap while no composition run is in flight:
//! swapping the source mid-run would invalidate the display-to-native scale
//! factors computed at the start of the run.

use crate::assets::{AssetLoader, AssetLoadError};
use crate::raster::RasterImage;

/// Scale above which the high-resolution asset is requested.
pub const UPGRADE_SCALE: f64 = 1.5;

/// Scale below which the base asset is restored.
pub const REVERT_SCALE: f64 = 1.2;

/// Filename suffix convention for the high-resolution variant.
const HIGH_RES_SUFFIX: &str = "@2x";

/// An action for the viewer chrome to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionAction {
    /// Start preloading the high-resolution asset.
    Preload(PreloadTicket),
    /// Swap the displayed asset to the high-resolution URL.
    ActivateHigh(String),
    /// Swap the displayed asset back to the base URL.
    RevertToBase(String),
}

/// Identifies one issued preload, pinned to the image generation it was
/// issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadTicket {
    /// URL of the high-resolution asset to fetch.
    pub url: String,
    generation: u64,
}

/// Preload lifecycle for the current image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HighRes {
    Untried,
    Loading,
    Ready,
    Failed,
}

/// Tracks which asset the viewer displays and when to upgrade it.
#[derive(Debug)]
pub struct ResolutionManager {
    base_url: String,
    generation: u64,
    high: HighRes,
    high_active: bool,
    last_scale: f64,
}

impl ResolutionManager {
    /// Create a manager for the given base page asset.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            generation: 0,
            high: HighRes::Untried,
            high_active: false,
            last_scale: 1.0,
        }
    }

    /// The user navigated to a different page: adopt the new base asset and
    /// forget all preload state. Outstanding preloads become stale.
    pub fn set_image(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
        self.generation += 1;
        self.high = HighRes::Untried;
        self.high_active = false;
        self.last_scale = 1.0;
    }

    /// URL of the asset that should currently be displayed.
    pub fn active_url(&self) -> String {
        if self.high_active {
            derive_high_res_url(&self.base_url)
        } else {
            self.base_url.clone()
        }
    }

    /// Observe a new zoom scale and decide whether anything should change.
    pub fn on_scale(&mut self, scale: f64) -> Option<ResolutionAction> {
        self.last_scale = scale;

        if scale > UPGRADE_SCALE {
            match self.high {
                HighRes::Untried => {
                    self.high = HighRes::Loading;
                    Some(ResolutionAction::Preload(PreloadTicket {
                        url: derive_high_res_url(&self.base_url),
                        generation: self.generation,
                    }))
                }
                HighRes::Ready if !self.high_active => {
                    self.high_active = true;
                    Some(ResolutionAction::ActivateHigh(derive_high_res_url(
                        &self.base_url,
                    )))
                }
                _ => None,
            }
        } else if scale < REVERT_SCALE && self.high_active {
            self.high_active = false;
            Some(ResolutionAction::RevertToBase(self.base_url.clone()))
        } else {
            None
        }
    }

    /// A preload finished successfully. Returns the swap to apply, unless
    /// the ticket is stale (issued for a previous image) or the user has
    /// since zoomed back out.
    pub fn preload_succeeded(&mut self, ticket: &PreloadTicket) -> Option<ResolutionAction> {
        if ticket.generation != self.generation {
            return None;
        }
        self.high = HighRes::Ready;
        if self.last_scale >= REVERT_SCALE {
            self.high_active = true;
            Some(ResolutionAction::ActivateHigh(ticket.url.clone()))
        } else {
            None
        }
    }

    /// A preload failed. The base asset stays displayed and no retry is
    /// ever attempted for this image.
    pub fn preload_failed(&mut self, ticket: &PreloadTicket) {
        if ticket.generation == self.generation {
            self.high = HighRes::Failed;
        }
    }

    /// Observe a scale and run any resulting preload to completion against
    /// the given loader. Convenience glue over the synchronous API for
    /// callers that do not interleave navigation with preloads.
    pub async fn drive<L: AssetLoader>(
        &mut self,
        scale: f64,
        loader: &L,
    ) -> Option<ResolutionAction> {
        match self.on_scale(scale)? {
            ResolutionAction::Preload(ticket) => {
                let decoded = load_and_decode(loader, &ticket.url).await;
                match decoded {
                    Ok(_) => self.preload_succeeded(&ticket),
                    Err(_) => {
                        self.preload_failed(&ticket);
                        None
                    }
                }
            }
            other => Some(other),
        }
    }
}

/// Fetch and decode an asset, verifying it is a usable image before any
/// swap is offered.
async fn load_and_decode<L: AssetLoader>(
    loader: &L,
    url: &str,
) -> Result<RasterImage, AssetLoadError> {
    let bytes = loader.load(url).await?;
    Ok(RasterImage::decode(&bytes)?)
}

/// Derive the high-resolution variant URL from a base URL by filename
/// convention: `page-012.jpg` becomes `page-012@2x.jpg`.
pub fn derive_high_res_url(base_url: &str) -> String {
    match base_url.rfind('.') {
        // Only treat the dot as an extension separator if it is part of the
        // last path segment.
        Some(idx) if !base_url[idx..].contains('/') => {
            format!("{}{}{}", &base_url[..idx], HIGH_RES_SUFFIX, &base_url[idx..])
        }
        _ => format!("{base_url}{HIGH_RES_SUFFIX}"),
    }
}
