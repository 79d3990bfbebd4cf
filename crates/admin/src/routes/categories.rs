//! Category CRUD route handlers.
//!
//! Categories are referenced from products by a soft foreign key; deletion is
//! refused with a 409 while any product still points at the category.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fiesta_core::firestore::convert::CategoryDraft;
use fiesta_core::permissions::keys;
use fiesta_core::records::Category;
use fiesta_core::types::CategoryId;

use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::state::AppState;

/// Category create/update request body.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryRequest {
    fn into_draft(self) -> Result<CategoryDraft> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }
        Ok(CategoryDraft {
            name: self.name,
            description: self.description,
        })
    }
}

/// Category as rendered to the dashboard.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// `GET /api/categories`
#[instrument(skip(state, _staff))]
pub async fn list(
    State(state): State<AppState>,
    _staff: RequireStaff,
) -> Result<Json<Vec<CategoryView>>> {
    let categories = state.firestore().list_categories().await?;
    Ok(Json(
        categories.into_iter().map(CategoryView::from).collect(),
    ))
}

/// `POST /api/categories`
#[instrument(skip(state, staff, request))]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryView>)> {
    staff.require(keys::CATALOG_WRITE)?;
    let draft = request.into_draft()?;
    let category = state.firestore().create_category(&draft, None).await?;
    Ok((StatusCode::CREATED, Json(CategoryView::from(category))))
}

/// `PUT /api/categories/{id}`
#[instrument(skip(state, staff, request))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<CategoryId>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<CategoryView>> {
    staff.require(keys::CATALOG_WRITE)?;
    let draft = request.into_draft()?;
    let category = state.firestore().update_category(&id, &draft).await?;
    Ok(Json(CategoryView::from(category)))
}

/// `DELETE /api/categories/{id}`
///
/// Returns 409 while any product still references the category.
#[instrument(skip(state, staff))]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    staff.require(keys::CATALOG_WRITE)?;
    state.firestore().delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
