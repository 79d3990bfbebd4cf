//! HTTP route handlers for the admin dashboard JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (pings Firestore)
//!
//! # Auth
//! POST /api/auth/login             - Staff sign-in
//! POST /api/auth/logout            - Staff sign-out
//! GET  /api/auth/me                - Current staff member
//!
//! # Products (catalog.write)
//! GET    /api/products             - List products
//! POST   /api/products             - Create product
//! GET    /api/products/{id}        - Product detail
//! PUT    /api/products/{id}        - Update product
//! DELETE /api/products/{id}        - Delete product
//! POST   /api/products/{id}/image  - Upload product image (multipart)
//!
//! # Categories (catalog.write)
//! GET    /api/categories           - List categories
//! POST   /api/categories           - Create category
//! PUT    /api/categories/{id}      - Update category
//! DELETE /api/categories/{id}      - Delete category (409 while referenced)
//!
//! # Orders (orders.write for mutation)
//! GET    /api/orders               - List orders, newest first (?status= filter)
//! GET    /api/orders/{id}          - Order detail
//! PATCH  /api/orders/{id}/status   - Advance order status (409 on bad transition)
//!
//! # Staff (staff.manage)
//! GET    /api/staff                - List staff
//! POST   /api/staff                - Create staff member
//! PUT    /api/staff/{id}           - Update staff member
//! DELETE /api/staff/{id}           - Delete staff member
//!
//! # Roles (roles.manage)
//! GET    /api/roles                - List roles
//! POST   /api/roles                - Create role
//! PUT    /api/roles/{id}           - Update role
//! DELETE /api/roles/{id}           - Delete role (409 while assigned)
//!
//! # Seeding (catalog.seed)
//! POST /api/seed                   - Write the demo catalog
//! ```

pub mod auth;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod roles;
pub mod seed;
pub mod staff;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/{id}/image", post(products::upload_image))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            axum::routing::put(categories::update).delete(categories::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", patch(orders::set_status))
}

/// Create the staff routes router.
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(staff::list).post(staff::create))
        .route(
            "/{id}",
            axum::routing::put(staff::update).delete(staff::delete),
        )
}

/// Create the role routes router.
pub fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(roles::list).post(roles::create))
        .route(
            "/{id}",
            axum::routing::put(roles::update).delete(roles::delete),
        )
}

/// Create all routes for the admin dashboard.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/staff", staff_routes())
        .nest("/api/roles", role_routes())
        .route("/api/seed", post(seed::run))
}
