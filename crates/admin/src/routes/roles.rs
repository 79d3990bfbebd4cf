//! Role management route handlers.
//!
//! A role is a named permission bundle; deletion is refused with a 409 while
//! any staff member still holds it.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fiesta_core::firestore::convert::RoleDraft;
use fiesta_core::permissions::keys;
use fiesta_core::records::Role;
use fiesta_core::types::RoleId;

use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::state::AppState;

/// Role create/update request body.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl RoleRequest {
    fn into_draft(self) -> Result<RoleDraft> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }
        for key in &self.permissions {
            if !keys::ALL.contains(&key.as_str()) {
                return Err(AppError::BadRequest(format!(
                    "unknown permission key: {key}"
                )));
            }
        }
        Ok(RoleDraft {
            name: self.name,
            permissions: self.permissions,
        })
    }
}

/// Role as rendered to the dashboard.
#[derive(Debug, Serialize)]
pub struct RoleView {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Role> for RoleView {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            permissions: role.permissions,
            created_at: role.created_at,
            updated_at: role.updated_at,
        }
    }
}

/// `GET /api/roles`
#[instrument(skip(state, staff))]
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> Result<Json<Vec<RoleView>>> {
    staff.require(keys::ROLES_MANAGE)?;
    let roles = state.firestore().list_roles().await?;
    Ok(Json(roles.into_iter().map(RoleView::from).collect()))
}

/// `POST /api/roles`
#[instrument(skip(state, staff, request))]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(request): Json<RoleRequest>,
) -> Result<(StatusCode, Json<RoleView>)> {
    staff.require(keys::ROLES_MANAGE)?;
    let draft = request.into_draft()?;
    let role = state.firestore().create_role(&draft, None).await?;
    Ok((StatusCode::CREATED, Json(RoleView::from(role))))
}

/// `PUT /api/roles/{id}`
#[instrument(skip(state, staff, request))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<RoleId>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<RoleView>> {
    staff.require(keys::ROLES_MANAGE)?;
    let draft = request.into_draft()?;
    let role = state.firestore().update_role(&id, &draft).await?;
    Ok(Json(RoleView::from(role)))
}

/// `DELETE /api/roles/{id}`
///
/// Returns 409 while any staff member still holds the role.
#[instrument(skip(state, staff))]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<RoleId>,
) -> Result<StatusCode> {
    staff.require(keys::ROLES_MANAGE)?;
    state.firestore().delete_role(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_unknown_key() {
        let request = RoleRequest {
            name: "Manager".to_string(),
            permissions: vec!["catalog.write".to_string(), "superuser".to_string()],
        };
        assert!(matches!(request.into_draft(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_request_accepts_known_keys() {
        let request = RoleRequest {
            name: "Manager".to_string(),
            permissions: vec![
                "catalog.write".to_string(),
                "orders.write".to_string(),
            ],
        };
        let draft = request.into_draft().unwrap();
        assert_eq!(draft.permissions.len(), 2);
    }
}
