//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses are JSON: `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::firestore::FirestoreError;
use crate::services::auth::StaffAuthError;
use crate::services::storage::StorageError;

/// Application-level error type for the admin dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// Firestore operation failed.
    #[error("Firestore error: {0}")]
    Firestore(#[from] FirestoreError),

    /// Cloud Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Staff authentication failed.
    #[error("Auth error: {0}")]
    Auth(#[from] StaffAuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Staff member is not signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Staff member lacks the required permission.
    #[error("Forbidden: missing permission {0}")]
    Forbidden(String),

    /// Request conflicts with the current state (bad status transition,
    /// delete of a referenced document).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        let is_server_error = match &self {
            Self::Firestore(err) => {
                !matches!(err, FirestoreError::NotFound(_) | FirestoreError::Conflict(_))
            }
            Self::Storage(_) | Self::Internal(_) => true,
            _ => false,
        };
        if is_server_error {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Firestore(err) => match err {
                FirestoreError::NotFound(_) => StatusCode::NOT_FOUND,
                FirestoreError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Storage(StorageError::UnsupportedType(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(err) => match err {
                StaffAuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                StaffAuthError::EmailExists => StatusCode::CONFLICT,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Firestore(FirestoreError::NotFound(_)) | Self::NotFound(_) => {
                "Not found".to_string()
            }
            Self::Firestore(FirestoreError::Conflict(msg)) => msg.clone(),
            Self::Firestore(_) | Self::Storage(StorageError::Http(_) | StorageError::Api { .. }) => {
                "External service error".to_string()
            }
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(StaffAuthError::InvalidCredentials) => "Invalid credentials".to_string(),
            Self::Auth(err @ StaffAuthError::EmailExists) => err.to_string(),
            Self::Auth(_) => "Authentication error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
