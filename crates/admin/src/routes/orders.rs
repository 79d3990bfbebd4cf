//! Order route handlers.
//!
//! Orders are created by the storefront when a payment completes; the
//! dashboard only reads them and walks their status forward. Illegal
//! transitions (skipping a step, leaving a terminal state) come back as 409.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fiesta_core::permissions::keys;
use fiesta_core::records::{Order, OrderLine};
use fiesta_core::types::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::state::AppState;

/// One order line as rendered to the dashboard.
#[derive(Debug, Serialize)]
pub struct OrderLineView {
    pub product_id: String,
    pub product_name: String,
    pub rental_date: NaiveDate,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<OrderLine> for OrderLineView {
    fn from(line: OrderLine) -> Self {
        let line_total_cents = line.total().to_cents();
        Self {
            product_id: line.product_id.to_string(),
            product_name: line.product_name,
            rental_date: line.rental_date,
            quantity: line.quantity,
            unit_price_cents: line.unit_price.to_cents(),
            line_total_cents,
        }
    }
}

/// Order as rendered to the dashboard.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_postal_code: String,
    pub delivery_notes: Option<String>,
    pub lines: Vec<OrderLineView>,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            customer_name: format!(
                "{} {}",
                order.customer.first_name, order.customer.last_name
            ),
            customer_email: order.customer.email.to_string(),
            customer_phone: order.customer.phone,
            delivery_address: order.delivery.address,
            delivery_city: order.delivery.city,
            delivery_postal_code: order.delivery.postal_code,
            delivery_notes: order.delivery.notes,
            lines: order.lines.into_iter().map(OrderLineView::from).collect(),
            total_cents: order.total.to_cents(),
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

/// Order listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
}

/// `GET /api/orders`
#[instrument(skip(state, _staff))]
pub async fn list(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Query(params): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderView>>> {
    let mut orders = state.firestore().list_orders().await?;
    if let Some(status) = params.status {
        orders.retain(|order| order.status == status);
    }
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// `GET /api/orders/{id}`
#[instrument(skip(state, _staff))]
pub async fn show(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let order = state.firestore().get_order(&id).await?;
    Ok(Json(OrderView::from(order)))
}

/// `PATCH /api/orders/{id}/status`
///
/// The transition is checked against the current document before writing, so
/// two dispatchers racing the same order can't skip a step.
#[instrument(skip(state, staff), fields(id = %id))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<OrderId>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<OrderView>> {
    staff.require(keys::ORDERS_WRITE)?;

    let order = state.firestore().get_order(&id).await?;
    if !order.status.can_transition_to(request.status) {
        return Err(AppError::Conflict(format!(
            "order {id} cannot move from {} to {}",
            order.status, request.status
        )));
    }
    let updated = state.firestore().set_order_status(&id, request.status).await?;
    Ok(Json(OrderView::from(updated)))
}
