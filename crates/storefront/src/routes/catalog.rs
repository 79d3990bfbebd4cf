//! Catalog route handlers.
//!
//! The catalog is small enough to fetch wholesale (cached in the Firestore
//! client), so filtering and sorting run in-process per request.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fiesta_core::catalog::{CatalogFilter, SortKey, filter_products, sort_products};
use fiesta_core::records::{Category, Product};
use fiesta_core::types::price::CurrencyCode;
use fiesta_core::types::{CategoryId, Price, ProductId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring search over name and description.
    pub query: Option<String>,
    /// Inclusive lower price bound, in cents.
    pub min_price_cents: Option<i64>,
    /// Inclusive upper price bound, in cents.
    pub max_price_cents: Option<i64>,
    #[serde(default)]
    pub sort: SortKey,
}

/// Product as rendered to the client.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub price_cents: i64,
    pub price_display: String,
    pub image_url: Option<String>,
    pub popular: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            category_id: product.category_id.clone(),
            price_cents: product.price.to_cents(),
            price_display: product.price.display(),
            image_url: product.image_url.clone(),
            popular: product.popular,
        }
    }
}

/// Category as rendered to the client.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }
}

fn price_bound(cents: Option<i64>, param: &'static str) -> Result<Option<Price>> {
    cents
        .map(|c| {
            Price::from_cents(c, CurrencyCode::USD)
                .map_err(|e| AppError::BadRequest(format!("{param}: {e}")))
        })
        .transpose()
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let filter = CatalogFilter {
        category_id: params.category_id,
        query: params.query,
        min_price: price_bound(params.min_price_cents, "min_price_cents")?,
        max_price: price_bound(params.max_price_cents, "max_price_cents")?,
    };

    let products = state.firestore().list_products().await?;
    let mut listing = filter_products(&products, &filter);
    sort_products(&mut listing, params.sort);

    Ok(Json(listing.into_iter().map(ProductView::from).collect()))
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let product = state.firestore().get_product(&id).await?;
    Ok(Json(ProductView::from(&product)))
}

/// `GET /api/categories`
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryView>>> {
    let categories = state.firestore().list_categories().await?;
    Ok(Json(categories.iter().map(CategoryView::from).collect()))
}
