//! Staff management route handlers.
//!
//! Edits here apply to live sessions immediately: effective permissions are
//! re-read from the staff and role documents on every protected request.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fiesta_core::firestore::convert::StaffDraft;
use fiesta_core::permissions::keys;
use fiesta_core::records::StaffMember;
use fiesta_core::types::{Email, RoleId, StaffId};

use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::state::AppState;

/// Staff create/update request body.
#[derive(Debug, Deserialize)]
pub struct StaffRequest {
    pub name: String,
    pub email: String,
    pub role_id: Option<RoleId>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Initial sign-in password; create only, ignored on update. When set,
    /// a Firebase Auth account is provisioned alongside the staff document.
    pub password: Option<String>,
}

const fn default_active() -> bool {
    true
}

impl StaffRequest {
    fn into_draft(self) -> Result<StaffDraft> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }
        let email = Email::parse(self.email.trim())
            .map_err(|e| AppError::BadRequest(format!("email: {e}")))?;
        Ok(StaffDraft {
            name: self.name,
            email,
            role_id: self.role_id,
            permissions: self.permissions,
            active: self.active,
        })
    }
}

/// Staff member as rendered to the dashboard.
#[derive(Debug, Serialize)]
pub struct StaffMemberView {
    pub id: StaffId,
    pub name: String,
    pub email: String,
    pub role_id: Option<RoleId>,
    pub permissions: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StaffMember> for StaffMemberView {
    fn from(member: StaffMember) -> Self {
        Self {
            id: member.id,
            name: member.name,
            email: member.email.to_string(),
            role_id: member.role_id,
            permissions: member.permissions,
            active: member.active,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

/// `GET /api/staff`
#[instrument(skip(state, staff))]
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> Result<Json<Vec<StaffMemberView>>> {
    staff.require(keys::STAFF_MANAGE)?;
    let members = state.firestore().list_staff().await?;
    Ok(Json(
        members.into_iter().map(StaffMemberView::from).collect(),
    ))
}

/// `POST /api/staff`
///
/// When a password is supplied, the Firebase Auth account is provisioned
/// first; without one, the member must already have an auth account with the
/// same email to sign in.
#[instrument(skip(state, staff, request))]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(request): Json<StaffRequest>,
) -> Result<(StatusCode, Json<StaffMemberView>)> {
    staff.require(keys::STAFF_MANAGE)?;
    let password = request.password.clone();
    let draft = request.into_draft()?;
    if let Some(password) = password {
        state
            .staff_auth()
            .create_account(&draft.email, &password)
            .await?;
    }
    let member = state.firestore().create_staff(&draft, None).await?;
    Ok((StatusCode::CREATED, Json(StaffMemberView::from(member))))
}

/// `PUT /api/staff/{id}`
#[instrument(skip(state, staff, request))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<StaffId>,
    Json(request): Json<StaffRequest>,
) -> Result<Json<StaffMemberView>> {
    staff.require(keys::STAFF_MANAGE)?;
    let draft = request.into_draft()?;
    let member = state.firestore().update_staff(&id, &draft).await?;
    Ok(Json(StaffMemberView::from(member)))
}

/// `DELETE /api/staff/{id}`
#[instrument(skip(state, staff))]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<StaffId>,
) -> Result<StatusCode> {
    staff.require(keys::STAFF_MANAGE)?;
    if staff.id == id {
        return Err(AppError::BadRequest(
            "you cannot delete your own account".to_string(),
        ));
    }
    state.firestore().delete_staff(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_bad_email() {
        let request = StaffRequest {
            name: "Ana Diaz".to_string(),
            email: "not-an-email".to_string(),
            role_id: None,
            permissions: vec![],
            active: true,
            password: None,
        };
        assert!(matches!(request.into_draft(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_request_builds_draft() {
        let request = StaffRequest {
            name: "Ana Diaz".to_string(),
            email: "ana@example.com".to_string(),
            role_id: Some(RoleId::new("dispatcher")),
            permissions: vec!["catalog.write".to_string()],
            active: true,
            password: None,
        };
        let draft = request.into_draft().unwrap();
        assert_eq!(draft.email.as_str(), "ana@example.com");
        assert!(draft.active);
    }
}
