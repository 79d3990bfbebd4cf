//! Integration tests for the storefront cart flow.
//!
//! These tests require:
//! - The storefront server running (cargo run -p fiesta-storefront)
//! - A seeded Firebase test project (fiesta-cli seed)
//!
//! Run with: cargo test -p fiesta-integration-tests -- --ignored

use fiesta_integration_tests::{session_client, storefront_base_url};
use reqwest::StatusCode;
use serde_json::{Value, json};

/// Pick any product id from the live catalog.
async fn first_product_id(client: &reqwest::Client) -> String {
    let resp = client
        .get(format!("{}/api/products", storefront_base_url()))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Value> = resp.json().await.expect("Failed to parse products");
    products
        .first()
        .and_then(|p| p["id"].as_str())
        .expect("catalog is empty; run the seed first")
        .to_string()
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_cart_starts_empty() {
    let client = session_client();

    let resp = client
        .get(format!("{}/api/cart", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get cart");

    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["item_count"], 0);
    assert_eq!(cart["subtotal_cents"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_add_update_remove_round_trip() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product_id = first_product_id(&client).await;

    // Add two of the same line (same product, same date) - should merge.
    for _ in 0..2 {
        let resp = client
            .post(format!("{base_url}/api/cart/add"))
            .json(&json!({ "product_id": product_id, "rental_date": "2026-10-03" }))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let cart: Value = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["item_count"], 2);

    // Update the quantity.
    let resp = client
        .post(format!("{base_url}/api/cart/update"))
        .json(&json!({
            "product_id": product_id,
            "rental_date": "2026-10-03",
            "quantity": 5,
        }))
        .send()
        .await
        .expect("Failed to update cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["item_count"], 5);

    // Remove the line.
    let resp = client
        .post(format!("{base_url}/api/cart/remove"))
        .json(&json!({ "product_id": product_id, "rental_date": "2026-10-03" }))
        .send()
        .await
        .expect("Failed to remove from cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["item_count"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_same_product_different_dates_are_separate_lines() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product_id = first_product_id(&client).await;

    for date in ["2026-10-03", "2026-10-10"] {
        let resp = client
            .post(format!("{base_url}/api/cart/add"))
            .json(&json!({ "product_id": product_id, "rental_date": date }))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let cart: Value = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_update_to_zero_quantity_is_rejected() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product_id = first_product_id(&client).await;

    let resp = client
        .post(format!("{base_url}/api/cart/update"))
        .json(&json!({
            "product_id": product_id,
            "rental_date": "2026-10-03",
            "quantity": 0,
        }))
        .send()
        .await
        .expect("Failed to call update");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_add_unknown_product_is_404() {
    let client = session_client();

    let resp = client
        .post(format!("{}/api/cart/add", storefront_base_url()))
        .json(&json!({ "product_id": "no-such-product", "rental_date": "2026-10-03" }))
        .send()
        .await
        .expect("Failed to call add");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
