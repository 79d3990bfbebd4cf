//! Integration tests for Fiesta.
//!
//! The tests in `tests/` drive the two servers over HTTP and are all
//! `#[ignore]`d by default since they need live infrastructure.
//!
//! # Running Tests
//!
//! ```bash
//! # Start both servers against a test Firebase project
//! cargo run -p fiesta-storefront &
//! cargo run -p fiesta-admin &
//!
//! # Run integration tests
//! cargo test -p fiesta-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` - storefront origin (default `http://localhost:3000`)
//! - `ADMIN_BASE_URL` - admin origin (default `http://localhost:3001`)
//! - `TEST_STAFF_EMAIL` / `TEST_STAFF_PASSWORD` - an active manager account
//!   seeded in the test project

use reqwest::Client;

/// Base URL for the storefront API.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client with a cookie store, so the session survives across requests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Sign in to the admin API with the test staff credentials.
///
/// # Panics
///
/// Panics if credentials are missing from the environment or sign-in fails.
pub async fn staff_sign_in(client: &Client) {
    let email = std::env::var("TEST_STAFF_EMAIL").expect("TEST_STAFF_EMAIL not set");
    let password = std::env::var("TEST_STAFF_PASSWORD").expect("TEST_STAFF_PASSWORD not set");

    let resp = client
        .post(format!("{}/api/auth/login", admin_base_url()))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to reach admin server");
    assert!(
        resp.status().is_success(),
        "staff sign-in failed: {}",
        resp.status()
    );
}
