//! Fiesta Storefront - Public rental shop API.
//!
//! This binary serves the public-facing storefront JSON API on port 3000.
//!
//! # Architecture
//!
//! - Axum JSON API consumed by the browser storefront
//! - Firestore (REST) for the catalog and orders
//! - Firebase Auth (REST) for customer accounts
//! - Stripe Checkout Sessions for payment
//! - Session-backed cart and checkout flow (tower-sessions)
//!
//! # Security
//!
//! This binary only holds:
//! - The Firebase web API key (public, scoped by security rules)
//! - The Stripe secret key
//!
//! It does NOT hold the Firestore service token; all privileged writes live
//! in the admin binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod error;
mod firebase;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// CORS for the browser storefront, restricted to the public base URL.
fn cors_layer(config: &StorefrontConfig) -> CorsLayer {
    let origin = config
        .base_url
        .parse::<HeaderValue>()
        .expect("STOREFRONT_BASE_URL is not a valid header value");

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fiesta_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Build application state (Firestore, Firebase Auth, and Stripe clients)
    let state = AppState::new(config.clone());

    // Create session layer
    let session_layer = middleware::create_session_layer(state.config());

    // Build router
    let app = Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .layer(cors_layer(state.config()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
