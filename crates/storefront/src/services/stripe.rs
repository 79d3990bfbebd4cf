//! Stripe Checkout Sessions client.
//!
//! The storefront never touches card data. Checkout hands the cart to
//! Stripe-hosted payment pages via a Checkout Session and reads the session
//! back on the confirm redirect to verify payment before writing the order.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use fiesta_core::cart::CartLine;
use fiesta_core::types::Email;

use crate::config::StripeConfig;

const API_BASE: &str = "https://api.stripe.com/v1";

/// Errors from the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe returned a non-success status.
    #[error("Stripe API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Stripe created a session without a redirect URL.
    #[error("checkout session has no redirect URL")]
    MissingUrl,
}

/// A Checkout Session as returned by the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page URL; present until the session completes.
    pub url: Option<String>,
    /// `"paid"`, `"unpaid"`, or `"no_payment_required"`.
    pub payment_status: String,
    /// Total in the smallest currency unit.
    pub amount_total: Option<i64>,
}

impl CheckoutSession {
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid" || self.payment_status == "no_payment_required"
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the Stripe REST API.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    secret_key: secrecy::SecretString,
}

impl StripeClient {
    /// Create a new Stripe client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            inner: Arc::new(StripeClientInner {
                client: reqwest::Client::new(),
                secret_key: config.secret_key.clone(),
            }),
        }
    }

    /// Create a Checkout Session for the cart.
    ///
    /// `success_url` receives `?session_id={CHECKOUT_SESSION_ID}` appended by
    /// Stripe on redirect.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or the session comes back
    /// without a hosted page URL.
    #[instrument(skip(self, lines, customer_email), fields(line_count = lines.len()))]
    pub async fn create_checkout_session(
        &self,
        lines: &[CartLine],
        customer_email: Option<&Email>,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let mut form = checkout_session_form(lines, success_url, cancel_url);
        if let Some(email) = customer_email {
            form.push(("customer_email".to_string(), email.as_str().to_string()));
        }

        let response = self
            .inner
            .client
            .post(format!("{API_BASE}/checkout/sessions"))
            .bearer_auth(self.inner.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;

        let session: CheckoutSession = parse_response(response).await?;
        if session.url.is_none() {
            return Err(StripeError::MissingUrl);
        }
        Ok(session)
    }

    /// Retrieve a Checkout Session by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    #[instrument(skip(self))]
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let response = self
            .inner
            .client
            .get(format!("{API_BASE}/checkout/sessions/{session_id}"))
            .bearer_auth(self.inner.secret_key.expose_secret())
            .send()
            .await?;

        parse_response(response).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StripeError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<StripeErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.chars().take(300).collect());
        tracing::error!(%status, %message, "Stripe API call failed");
        return Err(StripeError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| StripeError::Api {
        status: status.as_u16(),
        message: format!("unparseable response: {e}"),
    })
}

/// Build the form-encoded body for a Checkout Session create call.
///
/// Each cart line becomes one `line_items[i]` entry with inline `price_data`
/// (rentals are not pre-registered Stripe Prices). The rental date rides in
/// the product name so it shows on the hosted page and the receipt.
fn checkout_session_form(
    lines: &[CartLine],
    success_url: &str,
    cancel_url: &str,
) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        (
            "success_url".to_string(),
            format!("{success_url}?session_id={{CHECKOUT_SESSION_ID}}"),
        ),
        ("cancel_url".to_string(), cancel_url.to_string()),
    ];

    for (i, line) in lines.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            line.unit_price.currency_code().as_stripe_code().to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            format!("{} ({})", line.product_name, line.rental_date),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            line.unit_price.to_cents().to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), line.quantity.to_string()));
    }

    form
}
