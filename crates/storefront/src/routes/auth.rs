//! Auth route handlers.
//!
//! Credentials go straight to Firebase Auth; the session only ever holds the
//! resulting uid and email. A matching `users` document is written on every
//! successful sign-in so the admin dashboard can list customers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use fiesta_core::types::Email;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::OptionalAuth;
use crate::middleware::auth::{clear_current_customer, set_current_customer};
use crate::models::CurrentCustomer;
use crate::state::AppState;

/// Register request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The signed-in customer as rendered to the client.
#[derive(Debug, Serialize)]
pub struct CustomerView {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<&CurrentCustomer> for CustomerView {
    fn from(customer: &CurrentCustomer) -> Self {
        Self {
            id: customer.id.to_string(),
            email: customer.email.to_string(),
            display_name: customer.display_name.clone(),
        }
    }
}

async fn establish_session(
    state: &AppState,
    session: &Session,
    customer: CurrentCustomer,
) -> Result<Json<CustomerView>> {
    state
        .firestore()
        .upsert_customer(&customer.id, &customer.email, customer.display_name.as_deref())
        .await?;

    set_current_customer(session, &customer)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    set_sentry_user(&customer.id, Some(customer.email.as_str()));

    Ok(Json(CustomerView::from(&customer)))
}

/// `POST /api/auth/register`
#[instrument(skip(state, session, request))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<CustomerView>> {
    let email = Email::parse(request.email.trim())
        .map_err(|e| AppError::BadRequest(format!("email: {e}")))?;

    let user = state
        .firebase_auth()
        .sign_up(&email, &request.password)
        .await?;

    let customer = CurrentCustomer {
        id: user.uid,
        email: user.email,
        display_name: request.display_name.filter(|s| !s.trim().is_empty()),
    };
    establish_session(&state, &session, customer).await
}

/// `POST /api/auth/login`
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<CustomerView>> {
    let email = Email::parse(request.email.trim())
        .map_err(|e| AppError::BadRequest(format!("email: {e}")))?;

    let user = state
        .firebase_auth()
        .sign_in(&email, &request.password)
        .await?;

    let customer = CurrentCustomer {
        id: user.uid,
        email: user.email,
        display_name: None,
    };
    establish_session(&state, &session, customer).await
}

/// `POST /api/auth/logout`
///
/// Clears the login but keeps the cart; window-shopping survives sign-out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_customer(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    clear_sentry_user();
    Ok(Json(json!({ "ok": true })))
}

/// `GET /api/auth/me`
#[instrument(skip(auth))]
pub async fn me(OptionalAuth(auth): OptionalAuth) -> Json<serde_json::Value> {
    match auth {
        Some(customer) => Json(json!({ "customer": CustomerView::from(&customer) })),
        None => Json(json!({ "customer": null })),
    }
}
