//! Shared application state for the admin dashboard.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::firestore::FirestoreClient;
use crate::services::{StaffAuthClient, StorageClient};

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    firestore: FirestoreClient,
    storage: StorageClient,
    staff_auth: StaffAuthClient,
}

impl AppState {
    /// Build the state and its service clients from configuration.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let firestore = FirestoreClient::new(&config.firebase);
        let storage = StorageClient::new(&config.firebase);
        let staff_auth = StaffAuthClient::new(&config.firebase);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                firestore,
                storage,
                staff_auth,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn firestore(&self) -> &FirestoreClient {
        &self.inner.firestore
    }

    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }

    #[must_use]
    pub fn staff_auth(&self) -> &StaffAuthClient {
        &self.inner.staff_auth
    }
}
