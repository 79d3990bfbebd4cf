//! Checkout route handlers.
//!
//! The step machine lives in the session; handlers merge submitted fields
//! into the stored form and drive it forward. Reaching `Complete` unlocks the
//! single Stripe call, and the confirm redirect verifies payment before the
//! order document is written.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use fiesta_core::cart::Cart;
use fiesta_core::checkout::{CheckoutForm, CheckoutState, CheckoutStep, PaymentMethod};
use fiesta_core::firestore::convert::OrderDraft;
use fiesta_core::records::{CustomerDetails, DeliveryDetails, OrderLine};
use fiesta_core::types::price::CurrencyCode;
use fiesta_core::types::{Email, OrderId, OrderStatus, Price};

use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::{read_cart, read_checkout, session_keys, write_cart, write_checkout};
use crate::state::AppState;

/// Checkout state as rendered to the client.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub form: CheckoutForm,
}

impl From<&CheckoutState> for CheckoutView {
    fn from(state: &CheckoutState) -> Self {
        Self {
            step: state.step,
            form: state.form.clone(),
        }
    }
}

/// Fields submitted with an advance request. Only present fields overwrite
/// what the form already holds, so each step submits just its own inputs.
#[derive(Debug, Default, Deserialize)]
pub struct AdvanceRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

fn merge_form(form: &mut CheckoutForm, request: AdvanceRequest) {
    macro_rules! take {
        ($($field:ident),+ $(,)?) => {
            $(if request.$field.is_some() {
                form.$field = request.$field;
            })+
        };
    }
    take!(
        first_name,
        last_name,
        email,
        phone,
        address,
        city,
        postal_code,
        notes,
        payment_method,
    );
}

/// `GET /api/checkout`
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CheckoutView>> {
    let state = read_checkout(&session).await?;
    Ok(Json(CheckoutView::from(&state)))
}

/// `POST /api/checkout`
///
/// Merges the submitted fields and advances one step. Validation failures
/// come back as a 400 with per-field errors and the step stays put.
#[instrument(skip(session, request))]
pub async fn advance(
    session: Session,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<CheckoutView>> {
    let cart = read_cart(&session).await?;
    let mut state = read_checkout(&session).await?;

    merge_form(&mut state.form, request);
    match state.advance(cart.is_empty()) {
        Ok(_) => {
            write_checkout(&session, &state).await?;
            Ok(Json(CheckoutView::from(&state)))
        }
        Err(errors) => {
            // Keep the merged fields even when the step is blocked.
            write_checkout(&session, &state).await?;
            Err(AppError::Validation(errors))
        }
    }
}

/// `POST /api/checkout/back`
#[instrument(skip(session))]
pub async fn back(session: Session) -> Result<Json<CheckoutView>> {
    let mut state = read_checkout(&session).await?;
    state.step_back();
    write_checkout(&session, &state).await?;
    Ok(Json(CheckoutView::from(&state)))
}

/// `POST /api/checkout/session`
///
/// Creates the Stripe Checkout Session once the flow has reached `Complete`.
/// Returns the hosted payment page URL for the client to redirect to.
#[instrument(skip(state, session))]
pub async fn create_session(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<serde_json::Value>> {
    let checkout = read_checkout(&session).await?;
    if checkout.step != CheckoutStep::Complete {
        return Err(AppError::BadRequest(
            "checkout is not complete".to_string(),
        ));
    }

    let cart = read_cart(&session).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let email = checkout
        .form
        .email
        .as_deref()
        .map(str::trim)
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("email: {e}")))?;

    let base_url = &state.config().base_url;
    let stripe_session = state
        .stripe()
        .create_checkout_session(
            cart.lines(),
            email.as_ref(),
            &format!("{base_url}/api/checkout/confirm"),
            &format!("{base_url}/checkout"),
        )
        .await?;

    session
        .insert(session_keys::PAYMENT_SESSION, &stripe_session.id)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    Ok(Json(json!({
        "session_id": stripe_session.id,
        "url": stripe_session.url,
    })))
}

/// Query parameters appended by Stripe on the success redirect.
#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub session_id: String,
}

/// Order as rendered to the client after confirmation.
#[derive(Debug, Serialize)]
pub struct OrderConfirmationView {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub item_count: u32,
}

/// `GET /api/checkout/confirm?session_id=...`
///
/// The session id must match the one issued for this checkout, and Stripe
/// must report it paid; then the order is written and the cart and flow
/// reset. Re-invoking is safe until the write succeeds - the issued id is
/// only dropped with the order, after which confirms are rejected.
#[instrument(skip(state, session, auth), fields(payment_session = %query.session_id))]
pub async fn confirm(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<OrderConfirmationView>> {
    let issued: Option<String> = session
        .get(session_keys::PAYMENT_SESSION)
        .await
        .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?;
    if issued.as_deref() != Some(query.session_id.as_str()) {
        return Err(AppError::BadRequest(
            "payment session does not belong to this checkout".to_string(),
        ));
    }

    let stripe_session = state
        .stripe()
        .retrieve_checkout_session(&query.session_id)
        .await?;
    if !stripe_session.is_paid() {
        return Err(AppError::BadRequest(format!(
            "payment session is {}",
            stripe_session.payment_status
        )));
    }

    let cart = read_cart(&session).await?;
    let checkout = read_checkout(&session).await?;
    let draft = build_order_draft(&cart, &checkout, auth.map(|c| c.id), &query.session_id)?;

    let order = state.firestore().create_order(&draft).await?;

    // Fresh cart and flow for the next rental.
    write_cart(&session, &Cart::new()).await?;
    write_checkout(&session, &CheckoutState::new()).await?;
    session
        .remove::<String>(session_keys::PAYMENT_SESSION)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    Ok(Json(OrderConfirmationView {
        item_count: order.item_count(),
        order_id: order.id,
        status: order.status,
        total_cents: order.total.to_cents(),
    }))
}

fn build_order_draft(
    cart: &Cart,
    checkout: &CheckoutState,
    customer_id: Option<fiesta_core::types::CustomerId>,
    payment_session_id: &str,
) -> Result<OrderDraft> {
    if cart.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let form = &checkout.form;
    let email = form
        .email
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| AppError::BadRequest("checkout form is incomplete".to_string()))
        .and_then(|raw| {
            Email::parse(raw).map_err(|e| AppError::BadRequest(format!("email: {e}")))
        })?;
    let required = |value: &Option<String>, field: &str| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest(format!("{field} is missing")))
    };

    let customer = CustomerDetails {
        first_name: required(&form.first_name, "first_name")?,
        last_name: required(&form.last_name, "last_name")?,
        email,
        phone: form.phone.clone().filter(|s| !s.trim().is_empty()),
    };
    let delivery = DeliveryDetails {
        address: required(&form.address, "address")?,
        city: required(&form.city, "city")?,
        postal_code: required(&form.postal_code, "postal_code")?,
        notes: form.notes.clone().filter(|s| !s.trim().is_empty()),
    };

    let lines: Vec<OrderLine> = cart
        .lines()
        .iter()
        .map(|line| OrderLine {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            rental_date: line.rental_date,
            quantity: line.quantity,
            unit_price: line.unit_price,
        })
        .collect();
    let total = lines
        .iter()
        .fold(Price::zero(CurrencyCode::USD), |acc, line| {
            acc.plus(&line.total())
        });

    Ok(OrderDraft {
        customer_id,
        customer,
        delivery,
        lines,
        total,
        status: OrderStatus::Pending,
        payment_session_id: payment_session_id.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fiesta_core::types::ProductId;

    fn filled_checkout() -> CheckoutState {
        CheckoutState {
            step: CheckoutStep::Complete,
            form: CheckoutForm {
                first_name: Some("Ana".to_string()),
                last_name: Some("Diaz".to_string()),
                email: Some("ana@example.com".to_string()),
                phone: None,
                address: Some("1 Main St".to_string()),
                city: Some("Springfield".to_string()),
                postal_code: Some("12345".to_string()),
                notes: Some("gate code 1234".to_string()),
                payment_method: Some(PaymentMethod::Card),
            },
        }
    }

    fn cart_with_lines() -> Cart {
        let mut cart = Cart::new();
        cart.add(
            ProductId::new("p1"),
            "Bounce House",
            "2026-06-01".parse().unwrap(),
            Price::from_cents(150_00, CurrencyCode::USD).unwrap(),
        );
        cart.add(
            ProductId::new("p1"),
            "Bounce House",
            "2026-06-01".parse().unwrap(),
            Price::from_cents(150_00, CurrencyCode::USD).unwrap(),
        );
        cart
    }

    #[test]
    fn test_draft_totals_match_cart() {
        let draft =
            build_order_draft(&cart_with_lines(), &filled_checkout(), None, "cs_123").unwrap();
        assert_eq!(draft.total.to_cents(), 300_00);
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.status, OrderStatus::Pending);
        assert_eq!(draft.payment_session_id, "cs_123");
    }

    #[test]
    fn test_draft_rejects_empty_cart() {
        let result = build_order_draft(&Cart::new(), &filled_checkout(), None, "cs_123");
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_draft_requires_contact_fields() {
        let mut checkout = filled_checkout();
        checkout.form.email = None;
        let result = build_order_draft(&cart_with_lines(), &checkout, None, "cs_123");
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_merge_form_only_overwrites_present_fields() {
        let mut form = filled_checkout().form;
        merge_form(
            &mut form,
            AdvanceRequest {
                city: Some("Shelbyville".to_string()),
                ..AdvanceRequest::default()
            },
        );
        assert_eq!(form.city.as_deref(), Some("Shelbyville"));
        assert_eq!(form.first_name.as_deref(), Some("Ana"));
    }
}
