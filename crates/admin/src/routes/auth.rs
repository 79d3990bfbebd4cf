//! Staff auth route handlers.
//!
//! Sign-in verifies the password with Firebase Auth, then requires an active
//! `staff` document for the same email. Only the staff id goes into the
//! session; effective permissions are re-resolved from the documents on each
//! protected request by the extractor.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use fiesta_core::types::Email;

use crate::error::{AppError, Result};
use crate::middleware::auth::{clear_staff_session, set_staff_session};
use crate::models::CurrentStaff;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The signed-in staff member as rendered to the client.
#[derive(Debug, Serialize)]
pub struct StaffView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub permissions: Vec<String>,
}

impl From<&CurrentStaff> for StaffView {
    fn from(staff: &CurrentStaff) -> Self {
        let mut permissions: Vec<String> = staff.permissions.iter().cloned().collect();
        permissions.sort_unstable();
        Self {
            id: staff.id.to_string(),
            name: staff.name.clone(),
            email: staff.email.to_string(),
            permissions,
        }
    }
}

/// `POST /api/auth/login`
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<StaffView>> {
    let email = Email::parse(request.email.trim())
        .map_err(|e| AppError::BadRequest(format!("email: {e}")))?;

    // Password check first so a wrong password never reveals whether the
    // email belongs to staff.
    state
        .staff_auth()
        .verify_password(&email, &request.password)
        .await?;

    let member = state
        .firestore()
        .find_staff_by_email(email.as_str())
        .await?
        .ok_or_else(|| AppError::Unauthorized("not an active staff account".to_string()))?;

    // Resolve the role now; a dangling role_id just means direct grants only.
    let role = match &member.role_id {
        Some(role_id) => state.firestore().get_role(role_id).await.ok(),
        None => None,
    };
    let staff = CurrentStaff::resolve(member, role.as_ref())
        .ok_or_else(|| AppError::Unauthorized("not an active staff account".to_string()))?;

    set_staff_session(&session, &staff.id)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    Ok(Json(StaffView::from(&staff)))
}

/// `POST /api/auth/logout`
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_staff_session(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    Ok(Json(json!({ "ok": true })))
}

/// `GET /api/auth/me`
#[instrument(skip(staff))]
pub async fn me(staff: crate::middleware::RequireStaff) -> Json<StaffView> {
    Json(StaffView::from(&staff.0))
}
