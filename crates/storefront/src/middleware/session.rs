//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. The storefront is a
//! single-process deployment; sessions hold only the cart and login state,
//! both of which a customer can rebuild after a restart.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "fiesta_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    // Secure cookies whenever the public URL is HTTPS
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
