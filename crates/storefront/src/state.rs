//! Shared application state for the storefront.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::firebase::{FirebaseAuthClient, FirestoreClient};
use crate::services::StripeClient;

/// Shared application state, cloned per request.
///
/// Cheap to clone: the inner state lives behind an `Arc` and the clients are
/// themselves handle types.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    firestore: FirestoreClient,
    firebase_auth: FirebaseAuthClient,
    stripe: StripeClient,
}

impl AppState {
    /// Build the state and its service clients from configuration.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let firestore = FirestoreClient::new(&config.firebase);
        let firebase_auth = FirebaseAuthClient::new(&config.firebase);
        let stripe = StripeClient::new(&config.stripe);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                firestore,
                firebase_auth,
                stripe,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn firestore(&self) -> &FirestoreClient {
        &self.inner.firestore
    }

    #[must_use]
    pub fn firebase_auth(&self) -> &FirebaseAuthClient {
        &self.inner.firebase_auth
    }

    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }
}
