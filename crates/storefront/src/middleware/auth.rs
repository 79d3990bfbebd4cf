//! Authentication extractors.
//!
//! Provides extractors for requiring a signed-in customer in route handlers.
//! The storefront is a JSON API, so a missing login is always a plain 401.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentCustomer, session_keys};

/// Extractor that requires a signed-in customer.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders_handler(
///     RequireAuth(customer): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Orders for {}", customer.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Rejection for [`RequireAuth`]: a 401 with a JSON error body.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Sign in required" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Session is placed in extensions by SessionManagerLayer
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        let customer: CurrentCustomer = session
            .get(session_keys::CUSTOMER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection)?;

        Ok(Self(customer))
    }
}

/// Extractor that optionally gets the signed-in customer.
///
/// Unlike [`RequireAuth`], this never rejects the request.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(session_keys::CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Helper to set the signed-in customer in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CUSTOMER, customer).await
}

/// Helper to clear the signed-in customer from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(session_keys::CUSTOMER)
        .await?;
    Ok(())
}
