//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (pings Firestore)
//!
//! # Catalog
//! GET  /api/products            - Product listing (filter + sort query params)
//! GET  /api/products/{id}       - Product detail
//! GET  /api/categories          - Category listing
//!
//! # Cart
//! GET  /api/cart                - Current cart
//! GET  /api/cart/count          - Item count badge
//! POST /api/cart/add            - Add one unit of a product for a date
//! POST /api/cart/update         - Set a line's quantity
//! POST /api/cart/remove         - Remove a line
//! POST /api/cart/clear          - Empty the cart
//!
//! # Checkout
//! GET  /api/checkout            - Current checkout step and form
//! POST /api/checkout            - Submit the current step's fields and advance
//! POST /api/checkout/back       - Step back
//! POST /api/checkout/session    - Create the Stripe payment session
//! GET  /api/checkout/confirm    - Stripe return URL; verifies payment, writes the order
//!
//! # Auth
//! POST /api/auth/register       - Create an account and sign in
//! POST /api/auth/login          - Sign in
//! POST /api/auth/logout         - Sign out
//! GET  /api/auth/me             - Current customer, if signed in
//!
//! # Account (requires auth)
//! GET  /api/account/orders      - Order history, newest first
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::list_products))
        .route("/products/{id}", get(catalog::show_product))
        .route("/categories", get(catalog::list_categories))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::advance))
        .route("/back", post(checkout::back))
        .route("/session", post(checkout::create_session))
        .route("/confirm", get(checkout::confirm))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/orders", get(account::orders))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/api", catalog_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
        .nest("/api/auth", auth_routes())
        .nest("/api/account", account_routes())
}
