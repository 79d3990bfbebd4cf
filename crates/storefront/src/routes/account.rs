//! Account route handlers (require a signed-in customer).

use axum::{Json, extract::State};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::instrument;

use fiesta_core::records::{Order, OrderLine};
use fiesta_core::types::{OrderId, OrderStatus, ProductId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Order line as rendered in the order history.
#[derive(Debug, Serialize)]
pub struct OrderLineView {
    pub product_id: ProductId,
    pub product_name: String,
    pub rental_date: NaiveDate,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<&OrderLine> for OrderLineView {
    fn from(line: &OrderLine) -> Self {
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

/// Order as rendered in the order history.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub lines: Vec<OrderLineView>,
    pub total_cents: i64,
    pub total_display: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            status: order.status,
            lines: order.lines.iter().map(OrderLineView::from).collect(),
            total_cents: order.total.to_cents(),
            total_display: order.total.display(),
            created_at: order.created_at,
        }
    }
}

/// `GET /api/account/orders`
#[instrument(skip(state, customer), fields(customer = %customer.0.id))]
pub async fn orders(
    State(state): State<AppState>,
    customer: RequireAuth,
) -> Result<Json<Vec<OrderView>>> {
    let orders = state
        .firestore()
        .orders_for_customer(&customer.0.id)
        .await?;
    Ok(Json(orders.iter().map(OrderView::from).collect()))
}
