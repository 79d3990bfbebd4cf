//! Integration tests for the storefront checkout step machine.
//!
//! These tests require:
//! - The storefront server running (cargo run -p fiesta-storefront)
//! - A seeded Firebase test project (fiesta-cli seed)
//!
//! Run with: cargo test -p fiesta-integration-tests -- --ignored

use fiesta_integration_tests::{session_client, storefront_base_url};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn add_any_product(client: &reqwest::Client) {
    let base_url = storefront_base_url();
    let products: Vec<Value> = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse products");
    let product_id = products
        .first()
        .and_then(|p| p["id"].as_str())
        .expect("catalog is empty; run the seed first");

    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .json(&json!({ "product_id": product_id, "rental_date": "2026-10-03" }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_checkout_starts_at_customer_info() {
    let client = session_client();

    let checkout: Value = client
        .get(format!("{}/api/checkout", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get checkout")
        .json()
        .await
        .expect("Failed to parse checkout");
    assert_eq!(checkout["step"], "customer_info");
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_advance_with_missing_fields_stays_put() {
    let client = session_client();
    let base_url = storefront_base_url();

    // No email: validation fails with a field-level error list.
    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&json!({ "first_name": "Ana", "last_name": "Diaz" }))
        .send()
        .await
        .expect("Failed to call advance");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert!(body["errors"].is_array());

    // The step did not move, but the partial form was kept.
    let checkout: Value = client
        .get(format!("{base_url}/api/checkout"))
        .send()
        .await
        .expect("Failed to get checkout")
        .json()
        .await
        .expect("Failed to parse checkout");
    assert_eq!(checkout["step"], "customer_info");
    assert_eq!(checkout["form"]["first_name"], "Ana");
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_walk_all_steps_forward_and_back() {
    let client = session_client();
    let base_url = storefront_base_url();
    add_any_product(&client).await;

    // Customer info.
    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&json!({
            "first_name": "Ana",
            "last_name": "Diaz",
            "email": "ana@example.com",
        }))
        .send()
        .await
        .expect("Failed to advance");
    assert_eq!(resp.status(), StatusCode::OK);
    let checkout: Value = resp.json().await.expect("Failed to parse checkout");
    assert_eq!(checkout["step"], "delivery");

    // Delivery.
    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&json!({
            "address": "1 Main St",
            "city": "Springfield",
            "postal_code": "12345",
        }))
        .send()
        .await
        .expect("Failed to advance");
    let checkout: Value = resp.json().await.expect("Failed to parse checkout");
    assert_eq!(checkout["step"], "payment");

    // Back to delivery keeps the form.
    let resp = client
        .post(format!("{base_url}/api/checkout/back"))
        .send()
        .await
        .expect("Failed to go back");
    let checkout: Value = resp.json().await.expect("Failed to parse checkout");
    assert_eq!(checkout["step"], "delivery");
    assert_eq!(checkout["form"]["address"], "1 Main St");

    // Forward again through payment and review.
    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to advance");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&json!({ "payment_method": "card" }))
        .send()
        .await
        .expect("Failed to advance");
    let checkout: Value = resp.json().await.expect("Failed to parse checkout");
    assert_eq!(checkout["step"], "review");

    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to advance");
    let checkout: Value = resp.json().await.expect("Failed to parse checkout");
    assert_eq!(checkout["step"], "complete");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_confirm_rejects_a_session_id_not_issued_here() {
    let client = session_client();

    // This browser session never created a payment session, so any id is
    // foreign to it - rejected before Stripe is even asked.
    let resp = client
        .get(format!(
            "{}/api/checkout/confirm",
            storefront_base_url()
        ))
        .query(&[("session_id", "cs_test_someone_elses")])
        .send()
        .await
        .expect("Failed to call confirm");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server, seeded catalog, and Stripe test key"]
async fn test_payment_session_requires_completed_checkout() {
    let client = session_client();
    add_any_product(&client).await;

    // Still on customer_info; a payment session must be refused.
    let resp = client
        .post(format!("{}/api/checkout/session", storefront_base_url()))
        .send()
        .await
        .expect("Failed to call session");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
