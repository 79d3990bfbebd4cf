//! Integration tests for the admin auth gate and permission checks.
//!
//! These tests require:
//! - The admin server running (cargo run -p fiesta-admin)
//! - A Firebase test project with an active manager account
//!   (`TEST_STAFF_EMAIL` / `TEST_STAFF_PASSWORD`)
//!
//! Run with: cargo test -p fiesta-integration-tests -- --ignored

use fiesta_integration_tests::{admin_base_url, session_client, staff_sign_in};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_unauthenticated_requests_are_401() {
    let client = session_client();
    let base_url = admin_base_url();

    for path in ["/api/products", "/api/orders", "/api/staff", "/api/roles"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to reach admin server");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_health_needs_no_auth() {
    let client = session_client();

    let resp = client
        .get(format!("{}/health", admin_base_url()))
        .send()
        .await
        .expect("Failed to reach admin server");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_wrong_password_is_401() {
    let client = session_client();
    let email = std::env::var("TEST_STAFF_EMAIL").expect("TEST_STAFF_EMAIL not set");

    let resp = client
        .post(format!("{}/api/auth/login", admin_base_url()))
        .json(&json!({ "email": email, "password": "definitely-wrong" }))
        .send()
        .await
        .expect("Failed to reach admin server");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and staff credentials"]
async fn test_me_reflects_effective_permissions() {
    let client = session_client();
    staff_sign_in(&client).await;

    let me: Value = client
        .get(format!("{}/api/auth/me", admin_base_url()))
        .send()
        .await
        .expect("Failed to get me")
        .json()
        .await
        .expect("Failed to parse me");
    let permissions = me["permissions"].as_array().expect("permissions missing");
    assert!(
        permissions.iter().any(|p| p == "catalog.write"),
        "test account must be a manager"
    );
}

#[tokio::test]
#[ignore = "Requires running admin server and staff credentials"]
async fn test_logout_ends_the_session() {
    let client = session_client();
    staff_sign_in(&client).await;
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/logout"))
        .send()
        .await
        .expect("Failed to logout");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to reach admin server");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

/// Needs a second account without `staff.manage`, e.g. the seeded dispatcher,
/// in `TEST_LIMITED_EMAIL` / `TEST_LIMITED_PASSWORD`.
#[tokio::test]
#[ignore = "Requires running admin server and a limited staff account"]
async fn test_missing_permission_is_403() {
    let client = session_client();
    let email = std::env::var("TEST_LIMITED_EMAIL").expect("TEST_LIMITED_EMAIL not set");
    let password = std::env::var("TEST_LIMITED_PASSWORD").expect("TEST_LIMITED_PASSWORD not set");
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to reach admin server");
    assert!(resp.status().is_success());

    // Dispatchers can read the catalog but not manage staff.
    let resp = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/api/staff"))
        .send()
        .await
        .expect("Failed to list staff");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .post(format!("{base_url}/api/products"))
        .json(&json!({ "name": "Should Fail", "price_cents": 100 }))
        .send()
        .await
        .expect("Failed to call create");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

/// Revoking a permission takes effect on the member's next request, not
/// their next sign-in.
#[tokio::test]
#[ignore = "Requires running admin server and staff credentials"]
async fn test_revoked_permission_applies_to_live_sessions() {
    let admin = session_client();
    staff_sign_in(&admin).await;
    let base_url = admin_base_url();

    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let email = format!("temp-writer-{suffix}@example.com");
    let password = format!("pw-{suffix}-catalog");

    let member: Value = admin
        .post(format!("{base_url}/api/staff"))
        .json(&json!({
            "name": "Temp Writer",
            "email": email,
            "permissions": ["catalog.write"],
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to create staff")
        .json()
        .await
        .expect("Failed to parse staff");
    let member_id = member["id"].as_str().expect("staff id missing").to_string();

    let writer = session_client();
    let resp = writer
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to sign in as writer");
    assert!(resp.status().is_success());

    // The grant works while it stands.
    let product: Value = writer
        .post(format!("{base_url}/api/products"))
        .json(&json!({ "name": "Revocation Canary", "price_cents": 100 }))
        .send()
        .await
        .expect("Failed to create product")
        .json()
        .await
        .expect("Failed to parse product");
    let product_id = product["id"].as_str().expect("product id missing");

    // Strip the grant while the writer stays signed in.
    let resp = admin
        .put(format!("{base_url}/api/staff/{member_id}"))
        .json(&json!({ "name": "Temp Writer", "email": email, "permissions": [] }))
        .send()
        .await
        .expect("Failed to update staff");
    assert!(resp.status().is_success());

    let resp = writer
        .post(format!("{base_url}/api/products"))
        .json(&json!({ "name": "Should Fail", "price_cents": 100 }))
        .send()
        .await
        .expect("Failed to call create");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Cleanup.
    admin
        .delete(format!("{base_url}/api/products/{product_id}"))
        .send()
        .await
        .expect("Failed to delete product");
    admin
        .delete(format!("{base_url}/api/staff/{member_id}"))
        .send()
        .await
        .expect("Failed to delete staff");
}
