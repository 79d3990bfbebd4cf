//! Cart route handlers.
//!
//! The cart lives in the session as opaque bytes; every handler loads it,
//! applies one reducer operation, and writes it back. Unit prices are always
//! looked up server-side at add time - the client never supplies a price.

use axum::{Json, extract::State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use fiesta_core::cart::{Cart, CartLine};
use fiesta_core::types::ProductId;

use crate::error::{AppError, Result};
use crate::models::{read_cart, write_cart};
use crate::state::AppState;

/// Cart line as rendered to the client.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub product_name: String,
    pub rental_date: NaiveDate,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            rental_date: line.rental_date,
            quantity: line.quantity,
            unit_price_cents: line.unit_price.to_cents(),
            line_total_cents: line.total().to_cents(),
        }
    }
}

/// Cart as rendered to the client.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal_cents: i64,
    pub subtotal_display: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            item_count: cart.item_count(),
            subtotal_cents: cart.subtotal().to_cents(),
            subtotal_display: cart.subtotal().display(),
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product_id: ProductId,
    pub rental_date: NaiveDate,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub product_id: ProductId,
    pub rental_date: NaiveDate,
    pub quantity: u32,
}

/// Remove line request body.
#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub product_id: ProductId,
    pub rental_date: NaiveDate,
}

/// `GET /api/cart`
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = read_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// `GET /api/cart/count`
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<serde_json::Value>> {
    let cart = read_cart(&session).await?;
    Ok(Json(json!({ "count": cart.item_count() })))
}

/// `POST /api/cart/add`
///
/// Looks the product up so the stored unit price is authoritative.
#[instrument(skip(state, session), fields(product = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddRequest>,
) -> Result<Json<CartView>> {
    let product = state.firestore().get_product(&request.product_id).await?;

    let mut cart = read_cart(&session).await?;
    cart.add(
        product.id.clone(),
        product.name.clone(),
        request.rental_date,
        product.price,
    );
    write_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// `POST /api/cart/update`
#[instrument(skip(session), fields(product = %request.product_id))]
pub async fn update(
    session: Session,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<CartView>> {
    if request.quantity == 0 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1; use remove to drop a line".to_string(),
        ));
    }

    let mut cart = read_cart(&session).await?;
    cart.set_quantity(&request.product_id, request.rental_date, request.quantity);
    write_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// `POST /api/cart/remove`
#[instrument(skip(session), fields(product = %request.product_id))]
pub async fn remove(
    session: Session,
    Json(request): Json<RemoveRequest>,
) -> Result<Json<CartView>> {
    let mut cart = read_cart(&session).await?;
    cart.remove(&request.product_id, request.rental_date);
    write_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// `POST /api/cart/clear`
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = read_cart(&session).await?;
    cart.clear();
    write_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}
