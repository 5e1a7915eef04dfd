//! Share bindings.
//!
//! Bridges the core share coordinator to the browser: preview object URLs
//! come from the `URL` API, and uploads go through a JavaScript callback so
//! the network request (credentials, CSRF headers) stays on the JS side.

use js_sys::{Function, Promise, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::BlobPropertyBag;

use pressclip_core::geometry::ClipRect;
use pressclip_core::share::{
    upload_clip, ClipUploader, ObjectUrls, ShareCoordinator, ShareError, UploadError,
    UploadPayload, UploadResponse,
};

use crate::compose::JsComposition;

/// Object URLs backed by the browser `URL` API.
pub(crate) struct BrowserUrls;

impl ObjectUrls for BrowserUrls {
    fn create(&self, bytes: &[u8], mime: &str) -> Result<String, ShareError> {
        let parts = js_sys::Array::new();
        parts.push(&Uint8Array::from(bytes));

        let opts = BlobPropertyBag::new();
        opts.set_type(mime);

        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|e| ShareError::Preview(format!("{e:?}")))?;
        web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|e| ShareError::Preview(format!("{e:?}")))
    }

    fn revoke(&self, url: &str) {
        // Best-effort; a revoke failure cannot be acted on.
        let _ = web_sys::Url::revoke_object_url(url);
    }
}

/// Metadata argument passed to the upload callback alongside the image.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitMeta<'a> {
    paper_id: &'a str,
    page: u32,
    coordinates: ClipRect,
}

/// Uploader backed by a JavaScript callback.
///
/// The callback receives `(imageBytes: Uint8Array, meta)` and must return a
/// `Promise` resolving to `{ success, data?, error? }`.
#[derive(Clone)]
pub(crate) struct JsUploader {
    submit: Function,
}

fn js_upload_error(value: JsValue) -> UploadError {
    UploadError(format!("{value:?}"))
}

impl ClipUploader for JsUploader {
    async fn submit(&self, payload: UploadPayload<'_>) -> Result<UploadResponse, UploadError> {
        let image = Uint8Array::from(payload.image);
        let meta = serde_wasm_bindgen::to_value(&SubmitMeta {
            paper_id: payload.paper_id,
            page: payload.page,
            coordinates: payload.coordinates,
        })
        .map_err(|e| UploadError(e.to_string()))?;

        let returned = self
            .submit
            .call2(&JsValue::NULL, &image, &meta)
            .map_err(js_upload_error)?;
        let promise: Promise = returned
            .dyn_into()
            .map_err(|_| UploadError("upload callback did not return a Promise".to_string()))?;

        let resolved = JsFuture::from(promise).await.map_err(js_upload_error)?;
        serde_wasm_bindgen::from_value(resolved).map_err(|e| UploadError(e.to_string()))
    }
}

/// Share session for composed clippings.
///
/// Owns at most one live preview object URL at a time; replacing the
/// composition, closing the session, or dropping it revokes the URL.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const session = new JsShareSession(
///   async (image, meta) => (await fetch('/api/clips', { method: 'POST', ... })).json(),
///   'https://share.example.com',
/// );
/// preview.src = session.set_composition(composition);
/// const record = await session.share(paperId, page, clip);
/// ```
#[wasm_bindgen]
pub struct JsShareSession {
    coordinator: ShareCoordinator<JsUploader, BrowserUrls>,
    uploader: JsUploader,
    base_domain: String,
}

#[wasm_bindgen]
impl JsShareSession {
    /// Create a session. `upload` is the upload callback; `base_domain` is
    /// the configured public domain share links are built on.
    #[wasm_bindgen(constructor)]
    pub fn new(upload: Function, base_domain: String) -> JsShareSession {
        let uploader = JsUploader { submit: upload };
        JsShareSession {
            coordinator: ShareCoordinator::new(uploader.clone(), BrowserUrls, base_domain.clone()),
            uploader,
            base_domain,
        }
    }

    /// Adopt a freshly composed clipping, returning its preview URL. Any
    /// previous preview URL is revoked first.
    pub fn set_composition(&mut self, composition: &JsComposition) -> Result<String, JsValue> {
        self.coordinator
            .set_composition(composition.to_result())
            .map(str::to_string)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The live preview URL, if a composition is held.
    pub fn preview_url(&self) -> Option<String> {
        self.coordinator.preview_url().map(str::to_string)
    }

    /// Upload the held composition and build its share link.
    ///
    /// Resolves to a share record `{ shareUrl, paperId, page, clipRect }`.
    /// On failure the preview stays valid, so the user can retry without
    /// re-cropping or re-compositing.
    pub fn share(&self, paper_id: String, page: u32, clip: JsValue) -> Promise {
        let clip: ClipRect = match serde_wasm_bindgen::from_value(clip) {
            Ok(clip) => clip,
            Err(e) => return Promise::reject(&JsValue::from_str(&format!("Invalid clip: {e}"))),
        };
        let png = match self.coordinator.composition() {
            Some(composition) => composition.png.clone(),
            None => {
                return Promise::reject(&JsValue::from_str(
                    &ShareError::NoComposition.to_string(),
                ))
            }
        };

        let uploader = self.uploader.clone();
        let base_domain = self.base_domain.clone();
        future_to_promise(async move {
            let record = upload_clip(&uploader, &base_domain, &png, &paper_id, page, clip)
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            serde_wasm_bindgen::to_value(&record).map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    /// Close the share view: revoke the preview URL and drop the held
    /// composition.
    pub fn close(&mut self) {
        self.coordinator.close();
    }
}
