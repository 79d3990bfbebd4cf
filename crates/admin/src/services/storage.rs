//! Cloud Storage client for product images.
//!
//! Uploads go through the JSON API with the service bearer token; objects are
//! keyed by product id so re-uploading replaces the old image in place.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

use fiesta_core::types::ProductId;

use crate::config::FirebaseConfig;

/// Errors from the Cloud Storage API.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("Storage API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The upload has a content type we don't serve.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
}

const ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Client for the Cloud Storage JSON API.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    bucket: String,
    service_token: SecretString,
}

impl StorageClient {
    /// Create a new storage client.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(StorageClientInner {
                client: reqwest::Client::new(),
                bucket: config.storage_bucket.clone(),
                service_token: config.service_token.clone(),
            }),
        }
    }

    /// Upload a product image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for non-image uploads, or an API/HTTP error.
    #[instrument(skip(self, bytes), fields(product = %product_id, size = bytes.len()))]
    pub async fn upload_product_image(
        &self,
        product_id: &ProductId,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        if !ALLOWED_TYPES.contains(&content_type) {
            return Err(StorageError::UnsupportedType(content_type.to_string()));
        }

        let object = format!("products/{product_id}");
        let url = format!(
            "https://storage.googleapis.com/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.inner.bucket,
            urlencode(&object),
        );

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(self.inner.service_token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!(%status, "Image upload failed");
            return Err(StorageError::Api {
                status: status.as_u16(),
                message: body.chars().take(300).collect(),
            });
        }

        Ok(self.public_url(&object))
    }

    /// Public download URL for an object, assuming bucket-level public read.
    fn public_url(&self, object: &str) -> String {
        format!(
            "https://storage.googleapis.com/{}/{object}",
            self.inner.bucket
        )
    }
}

/// Minimal percent-encoding for object names (only `/` needs escaping in the
/// ids we generate, but cover the reserved set anyway).
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
