//! Share coordination.
//!
//! Owns the composed clipping after a successful run: creates the local
//! preview object URL, submits the upload to the external collaborator, and
//! builds the shareable link from the returned clip id.
//!
//! # Preview ownership
//!
//! Browser object URLs leak until revoked, so the coordinator holds at most
//! one live preview at a time and every path that replaces or discards it
//! (a new composition, closing the share view, teardown) revokes the old
//! URL first. The [`ObjectUrls`] seam keeps that policy testable outside a
//! browser.
//!
//! # Upload failure
//!
//! An upload failure never discards the local preview: the user can retry
//! the share without re-cropping or re-compositing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compose::CompositionResult;
use crate::geometry::ClipRect;

/// MIME type of the composed preview blob.
const PREVIEW_MIME: &str = "image/png";

/// Errors surfaced by the share coordinator.
#[derive(Debug, Error)]
pub enum ShareError {
    /// Share was requested before any composition completed.
    #[error("No composed clipping to share")]
    NoComposition,

    /// The upload collaborator failed or reported failure.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// The local preview URL could not be created.
    #[error("Preview creation failed: {0}")]
    Preview(String),
}

/// The payload handed to the external upload collaborator.
#[derive(Debug, Clone, Copy)]
pub struct UploadPayload<'a> {
    /// PNG-encoded composite image.
    pub image: &'a [u8],
    /// Identifier of the source paper.
    pub paper_id: &'a str,
    /// Page number the clip was taken from.
    pub page: u32,
    /// The clip rectangle, in display-space coordinates.
    pub coordinates: ClipRect,
}

/// Response shape of the upload collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadResponse {
    /// Whether the upload was accepted.
    pub success: bool,
    /// Present on success.
    pub data: Option<UploadData>,
    /// Present on failure.
    pub error: Option<String>,
}

/// Success payload of the upload collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadData {
    /// Server-issued identifier for the stored clipping.
    pub clip_id: String,
}

/// Transport-level upload failure.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UploadError(pub String);

/// The external upload collaborator.
#[allow(async_fn_in_trait)]
pub trait ClipUploader {
    /// Submit a composed clipping. `Err` is a transport failure; an
    /// accepted request that the server rejected comes back as
    /// `Ok(UploadResponse { success: false, .. })`.
    async fn submit(&self, payload: UploadPayload<'_>) -> Result<UploadResponse, UploadError>;
}

/// Local object-URL registry. The browser implementation wraps
/// `URL.createObjectURL` / `URL.revokeObjectURL`; tests count calls.
pub trait ObjectUrls {
    /// Create a local URL for the given blob.
    fn create(&self, bytes: &[u8], mime: &str) -> Result<String, ShareError>;
    /// Revoke a previously created URL. Idempotent.
    fn revoke(&self, url: &str);
}

/// The record of one shared clipping, immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    /// Public URL of the shared clipping.
    pub share_url: String,
    /// Identifier of the source paper.
    pub paper_id: String,
    /// Page number the clip was taken from.
    pub page: u32,
    /// The clip rectangle the share was made from.
    pub clip_rect: ClipRect,
}

/// The held composition and its live preview URL.
#[derive(Debug)]
struct PreviewSlot {
    composition: CompositionResult,
    url: String,
}

/// Coordinates preview lifetime and uploads for composed clippings.
#[derive(Debug)]
pub struct ShareCoordinator<U, R: ObjectUrls> {
    uploader: U,
    urls: R,
    base_domain: String,
    current: Option<PreviewSlot>,
    record: Option<ShareRecord>,
}

impl<U: ClipUploader, R: ObjectUrls> ShareCoordinator<U, R> {
    /// Create a coordinator. `base_domain` is the configured public domain
    /// share links are built on.
    pub fn new(uploader: U, urls: R, base_domain: impl Into<String>) -> Self {
        Self {
            uploader,
            urls,
            base_domain: base_domain.into(),
            current: None,
            record: None,
        }
    }

    /// Adopt a freshly composed clipping, returning its preview URL.
    ///
    /// Any previously held preview is revoked first; its share record is
    /// also dropped, since it described the replaced composition.
    pub fn set_composition(&mut self, composition: CompositionResult) -> Result<&str, ShareError> {
        self.release_current();
        self.record = None;

        let url = self.urls.create(&composition.png, PREVIEW_MIME)?;
        self.current = Some(PreviewSlot { composition, url });
        Ok(self
            .current
            .as_ref()
            .map(|slot| slot.url.as_str())
            .unwrap_or_default())
    }

    /// The live preview URL, if a composition is held.
    pub fn preview_url(&self) -> Option<&str> {
        self.current.as_ref().map(|slot| slot.url.as_str())
    }

    /// The held composition, if any.
    pub fn composition(&self) -> Option<&CompositionResult> {
        self.current.as_ref().map(|slot| &slot.composition)
    }

    /// The record of the last successful share of the held composition.
    pub fn share_record(&self) -> Option<&ShareRecord> {
        self.record.as_ref()
    }

    /// Upload the held composition and build its share link.
    ///
    /// On any failure the preview stays valid, so the user can retry the
    /// share without re-cropping or re-compositing.
    pub async fn share(
        &mut self,
        paper_id: &str,
        page: u32,
        clip: ClipRect,
    ) -> Result<ShareRecord, ShareError> {
        let slot = self.current.as_ref().ok_or(ShareError::NoComposition)?;

        let record = upload_clip(
            &self.uploader,
            &self.base_domain,
            &slot.composition.png,
            paper_id,
            page,
            clip,
        )
        .await?;
        self.record = Some(record.clone());
        Ok(record)
    }

    /// Close the share view: revoke the preview and forget the record.
    pub fn close(&mut self) {
        self.release_current();
        self.record = None;
    }

    fn release_current(&mut self) {
        if let Some(slot) = self.current.take() {
            self.urls.revoke(&slot.url);
        }
    }
}

/// Submit one composed clipping and build its share record.
///
/// This is the upload half of [`ShareCoordinator::share`], standalone so
/// callers that cannot hold the coordinator across a suspension point can
/// still share its semantics.
pub async fn upload_clip<U: ClipUploader>(
    uploader: &U,
    base_domain: &str,
    image: &[u8],
    paper_id: &str,
    page: u32,
    clip: ClipRect,
) -> Result<ShareRecord, ShareError> {
    let payload = UploadPayload {
        image,
        paper_id,
        page,
        coordinates: clip,
    };

    let response = uploader
        .submit(payload)
        .await
        .map_err(|e| ShareError::Upload(e.0))?;

    if !response.success {
        return Err(ShareError::Upload(
            response
                .error
                .unwrap_or_else(|| "upload rejected".to_string()),
        ));
    }

    let clip_id = response
        .data
        .map(|d| d.clip_id)
        .ok_or_else(|| ShareError::Upload("missing clip id".to_string()))?;

    Ok(ShareRecord {
        share_url: format!("{}/clip/{}", base_domain.trim_end_matches('/'), clip_id),
        paper_id: paper_id.to_string(),
        page,
        clip_rect: clip,
    })
}

impl<U, R: ObjectUrls> Drop for ShareCoordinator<U, R> {
    fn drop(&mut self) {
        // Teardown is a discard path like any other.
        if let Some(slot) = self.current.take() {
            self.urls.revoke(&slot.url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Object-URL registry that records create/revoke calls.
    #[derive(Default)]
    struct UrlLog {
        created: Vec<String>,
        revoked: Vec<String>,
        next_id: usize,
    }

    #[derive(Clone, Default)]
    struct CountingUrls(Rc<RefCell<UrlLog>>);

    impl CountingUrls {
        fn live_count(&self) -> usize {
            let log = self.0.borrow();
            log.created.len() - log.revoked.len()
        }
    }

    impl ObjectUrls for CountingUrls {
        fn create(&self, _bytes: &[u8], _mime: &str) -> Result<String, ShareError> {
            let mut log = self.0.borrow_mut();
            log.next_id += 1;
            let url = format!("blob:mock/{}", log.next_id);
            log.created.push(url.clone());
            Ok(url)
        }

        fn revoke(&self, url: &str) {
            self.0.borrow_mut().revoked.push(url.to_string());
        }
    }

    /// Uploader with a scripted response.
    struct StubUploader {
        response: Result<UploadResponse, String>,
    }

    impl StubUploader {
        fn ok(clip_id: &str) -> Self {
            Self {
                response: Ok(UploadResponse {
                    success: true,
                    data: Some(UploadData {
                        clip_id: clip_id.to_string(),
                    }),
                    error: None,
                }),
            }
        }

        fn rejected(message: &str) -> Self {
            Self {
                response: Ok(UploadResponse {
                    success: false,
                    data: None,
                    error: Some(message.to_string()),
                }),
            }
        }

        fn network_error() -> Self {
            Self {
                response: Err("connection reset".to_string()),
            }
        }
    }

    impl ClipUploader for StubUploader {
        async fn submit(&self, _payload: UploadPayload<'_>) -> Result<UploadResponse, UploadError> {
            self.response.clone().map_err(UploadError)
        }
    }

    fn composition() -> CompositionResult {
        CompositionResult {
            width: 10,
            height: 10,
            png: vec![0x89, 0x50, 0x4E, 0x47],
        }
    }

    fn clip() -> ClipRect {
        ClipRect::new(100.0, 100.0, 200.0, 150.0)
    }

    #[test]
    fn test_share_success_builds_url() {
        let urls = CountingUrls::default();
        let mut coordinator = ShareCoordinator::new(
            StubUploader::ok("abc123"),
            urls.clone(),
            "https://share.example.com/",
        );

        coordinator.set_composition(composition()).unwrap();
        let record =
            pollster::block_on(coordinator.share("paper-7", 12, clip())).unwrap();

        assert_eq!(record.share_url, "https://share.example.com/clip/abc123");
        assert_eq!(record.paper_id, "paper-7");
        assert_eq!(record.page, 12);
        assert_eq!(record.clip_rect, clip());
        assert_eq!(coordinator.share_record(), Some(&record));
    }

    #[test]
    fn test_share_without_composition() {
        let mut coordinator = ShareCoordinator::new(
            StubUploader::ok("abc"),
            CountingUrls::default(),
            "https://share.example.com",
        );

        let result = pollster::block_on(coordinator.share("p", 1, clip()));
        assert!(matches!(result, Err(ShareError::NoComposition)));
    }

    #[test]
    fn test_rejected_upload_keeps_preview() {
        let urls = CountingUrls::default();
        let mut coordinator = ShareCoordinator::new(
            StubUploader::rejected("quota exceeded"),
            urls.clone(),
            "https://share.example.com",
        );

        coordinator.set_composition(composition()).unwrap();
        let preview = coordinator.preview_url().unwrap().to_string();

        let result = pollster::block_on(coordinator.share("p", 1, clip()));
        match result {
            Err(ShareError::Upload(message)) => assert_eq!(message, "quota exceeded"),
            other => panic!("expected Upload error, got {other:?}"),
        }

        // The preview survives the failure for a retry without re-cropping.
        assert_eq!(coordinator.preview_url(), Some(preview.as_str()));
        assert_eq!(urls.live_count(), 1);
    }

    #[test]
    fn test_network_error_keeps_preview() {
        let urls = CountingUrls::default();
        let mut coordinator = ShareCoordinator::new(
            StubUploader::network_error(),
            urls.clone(),
            "https://share.example.com",
        );

        coordinator.set_composition(composition()).unwrap();
        let result = pollster::block_on(coordinator.share("p", 1, clip()));

        assert!(matches!(result, Err(ShareError::Upload(_))));
        assert!(coordinator.preview_url().is_some());
    }

    #[test]
    fn test_replacement_revokes_previous_preview() {
        let urls = CountingUrls::default();
        let mut coordinator = ShareCoordinator::new(
            StubUploader::ok("abc"),
            urls.clone(),
            "https://share.example.com",
        );

        let first = coordinator
            .set_composition(composition())
            .unwrap()
            .to_string();
        let second = coordinator
            .set_composition(composition())
            .unwrap()
            .to_string();

        assert_ne!(first, second);
        // Exactly one URL live; the first was revoked before the second
        // was created.
        assert_eq!(urls.live_count(), 1);
        assert_eq!(urls.0.borrow().revoked, vec![first]);
    }

    #[test]
    fn test_close_revokes_preview() {
        let urls = CountingUrls::default();
        let mut coordinator = ShareCoordinator::new(
            StubUploader::ok("abc"),
            urls.clone(),
            "https://share.example.com",
        );

        coordinator.set_composition(composition()).unwrap();
        pollster::block_on(coordinator.share("p", 1, clip())).unwrap();

        coordinator.close();
        assert_eq!(coordinator.preview_url(), None);
        assert_eq!(coordinator.share_record(), None);
        assert_eq!(urls.live_count(), 0);
    }

    #[test]
    fn test_drop_revokes_preview() {
        let urls = CountingUrls::default();
        {
            let mut coordinator = ShareCoordinator::new(
                StubUploader::ok("abc"),
                urls.clone(),
                "https://share.example.com",
            );
            coordinator.set_composition(composition()).unwrap();
        }
        assert_eq!(urls.live_count(), 0);
    }

    #[test]
    fn test_upload_response_deserializes() {
        let ok: UploadResponse =
            serde_json::from_str(r#"{"success":true,"data":{"clipId":"x9"}}"#).unwrap();
        assert!(ok.success);
        assert_eq!(ok.data.unwrap().clip_id, "x9");

        let failed: UploadResponse =
            serde_json::from_str(r#"{"success":false,"error":"boom"}"#).unwrap();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
