//! Product CRUD route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fiesta_core::firestore::convert::ProductDraft;
use fiesta_core::permissions::keys;
use fiesta_core::records::Product;
use fiesta_core::types::price::CurrencyCode;
use fiesta_core::types::{CategoryId, Price, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::state::AppState;

/// Product create/update request body.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub price_cents: i64,
    pub image_url: Option<String>,
    #[serde(default)]
    pub popular: bool,
}

impl ProductRequest {
    fn into_draft(self) -> Result<ProductDraft> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }
        let price = Price::from_cents(self.price_cents, CurrencyCode::USD)
            .map_err(|e| AppError::BadRequest(format!("price_cents: {e}")))?;
        Ok(ProductDraft {
            name: self.name,
            description: self.description,
            category_id: self.category_id,
            price,
            image_url: self.image_url,
            popular: self.popular,
        })
    }
}

/// Product as rendered to the dashboard.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub popular: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            category_id: product.category_id,
            price_cents: product.price.to_cents(),
            image_url: product.image_url,
            popular: product.popular,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// `GET /api/products`
#[instrument(skip(state, _staff))]
pub async fn list(
    State(state): State<AppState>,
    _staff: RequireStaff,
) -> Result<Json<Vec<ProductView>>> {
    let products = state.firestore().list_products().await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// `GET /api/products/{id}`
#[instrument(skip(state, _staff))]
pub async fn show(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let product = state.firestore().get_product(&id).await?;
    Ok(Json(ProductView::from(product)))
}

/// `POST /api/products`
#[instrument(skip(state, staff, request))]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(request): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductView>)> {
    staff.require(keys::CATALOG_WRITE)?;
    let draft = request.into_draft()?;
    let product = state.firestore().create_product(&draft, None).await?;
    Ok((StatusCode::CREATED, Json(ProductView::from(product))))
}

/// `PUT /api/products/{id}`
#[instrument(skip(state, staff, request))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<ProductId>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<ProductView>> {
    staff.require(keys::CATALOG_WRITE)?;
    let draft = request.into_draft()?;
    let product = state.firestore().update_product(&id, &draft).await?;
    Ok(Json(ProductView::from(product)))
}

/// `DELETE /api/products/{id}`
#[instrument(skip(state, staff))]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    staff.require(keys::CATALOG_WRITE)?;
    state.firestore().delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/products/{id}/image`
///
/// Multipart upload with a single `image` part. The object is stored under
/// the product id and the product's `imageUrl` is pointed at it.
#[instrument(skip(state, staff, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Json<ProductView>> {
    staff.require(keys::CATALOG_WRITE)?;

    // The product must exist before we take an upload for it.
    state.firestore().get_product(&id).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
        .ok_or_else(|| AppError::BadRequest("missing image part".to_string()))?;
    if field.name() != Some("image") {
        return Err(AppError::BadRequest("expected part named 'image'".to_string()));
    }
    let content_type = field
        .content_type()
        .ok_or_else(|| AppError::BadRequest("image part has no content type".to_string()))?
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("failed to read image: {e}")))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("image is empty".to_string()));
    }

    let url = state
        .storage()
        .upload_product_image(&id, &content_type, bytes.to_vec())
        .await?;
    let product = state.firestore().set_product_image(&id, &url).await?;
    Ok(Json(ProductView::from(product)))
}
