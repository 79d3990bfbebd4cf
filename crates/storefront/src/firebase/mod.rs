//! Firebase REST clients for the storefront.
//!
//! # Architecture
//!
//! - Firestore is the source of truth - no local sync, direct REST calls
//! - Catalog reads are cached in-memory via `moka` (5 minute TTL)
//! - The storefront only ever uses the web API key; writes are limited to
//!   what the project's security rules allow a public client (order
//!   creation and the customer's own `users` document)
//!
//! # Example
//!
//! ```rust,ignore
//! use fiesta_storefront::firebase::FirestoreClient;
//!
//! let firestore = FirestoreClient::new(&config.firebase);
//! let products = firestore.list_products().await?;
//! ```

pub mod auth;
pub mod firestore;

pub use auth::FirebaseAuthClient;
pub use firestore::FirestoreClient;

use fiesta_core::firestore::ConvertError;
use thiserror::Error;

/// Errors that can occur when talking to Firebase services.
#[derive(Debug, Error)]
pub enum FirebaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("Firebase API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A document failed validation/coercion into its record type.
    #[error("document conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Document not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl FirebaseError {
    /// Build an API error from a response status and body, truncating the
    /// body so logs stay readable.
    pub(crate) fn api(status: reqwest::StatusCode, body: &str) -> Self {
        Self::Api {
            status: status.as_u16(),
            message: body.chars().take(300).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = FirebaseError::NotFound("products/p1".to_string());
        assert_eq!(err.to_string(), "Not found: products/p1");
    }

    #[test]
    fn test_api_error_truncates_body() {
        let long_body = "x".repeat(1000);
        let err = FirebaseError::api(reqwest::StatusCode::BAD_REQUEST, &long_body);
        match err {
            FirebaseError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message.len(), 300);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
