//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses are JSON: `{"error": "..."}`, or `{"errors": [...]}` for field
//! validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use fiesta_core::cart::CartStoreError;
use fiesta_core::checkout::FieldError;

use crate::firebase::FirebaseError;
use crate::firebase::auth::AuthError;
use crate::services::stripe::StripeError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Firebase (Firestore or Auth API) operation failed.
    #[error("Firebase error: {0}")]
    Firebase(#[from] FirebaseError),

    /// Stripe API operation failed.
    #[error("Stripe error: {0}")]
    Stripe(#[from] StripeError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// The session-backed cart could not be read or written.
    #[error("Cart store error: {0}")]
    CartStore(#[from] CartStoreError),

    /// Checkout form validation failed.
    #[error("Validation failed ({} field(s))", .0.len())]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

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
        if matches!(
            self,
            Self::Firebase(_) | Self::Stripe(_) | Self::CartStore(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Firebase(err) => match err {
                FirebaseError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Stripe(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::EmailExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::Http(_) | AuthError::Api(_) => StatusCode::BAD_GATEWAY,
            },
            Self::CartStore(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Field errors get their own shape so the client can mark inputs.
        if let Self::Validation(errors) = &self {
            return (status, Json(json!({ "errors": errors }))).into_response();
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Firebase(FirebaseError::NotFound(_)) => "Not found".to_string(),
            Self::Firebase(_) | Self::Stripe(_) => "External service error".to_string(),
            Self::CartStore(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::EmailExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::Http(_) | AuthError::Api(_) => "Authentication error".to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a customer ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::EmailExists)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_error_status() {
        let err = AppError::Validation(vec![FieldError {
            field: "email",
            message: "Email is required".to_string(),
        }]);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
