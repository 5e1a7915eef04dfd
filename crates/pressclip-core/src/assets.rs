//! Asset loading seam.
//!
//! All network I/O for image assets (band logos, higher-resolution page
//! scans) goes through the [`AssetLoader`] trait. The browser bindings
//! implement it over `fetch`; tests implement it over in-memory maps. Asset
//! loads are the only suspension points in the composition pipeline besides
//! the final upload.

use std::collections::HashMap;

use thiserror::Error;

use crate::raster::DecodeError;

/// Error types for asset loading. Per the error taxonomy these are always
/// recovered locally (skip the logo, stay on the base-resolution asset) and
/// never surface as a user-visible failure.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    /// The asset could not be fetched (network error, 404, CORS).
    #[error("Asset fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The fetched bytes are not a decodable image.
    #[error("Asset decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// Loader for image assets addressed by URL.
#[allow(async_fn_in_trait)]
pub trait AssetLoader {
    /// Fetch the raw bytes of an asset.
    async fn load(&self, url: &str) -> Result<Vec<u8>, AssetLoadError>;
}

/// An [`AssetLoader`] over a map of already-fetched assets.
///
/// The WASM boundary uses this to keep network I/O in JavaScript (the same
/// split as the rest of the byte-slice API): JS fetches the logo bytes, the
/// pipeline decodes and draws them. Tests use it as a deterministic mock.
#[derive(Debug, Default, Clone)]
pub struct PrefetchedAssets {
    assets: HashMap<String, Vec<u8>>,
}

impl PrefetchedAssets {
    /// Create an empty set: every load fails, which exercises the silent
    /// skip paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bytes for a URL.
    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(url.into(), bytes);
    }
}

impl AssetLoader for PrefetchedAssets {
    async fn load(&self, url: &str) -> Result<Vec<u8>, AssetLoadError> {
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| AssetLoadError::Fetch {
                url: url.to_string(),
                reason: "asset not prefetched".to_string(),
            })
    }
}
