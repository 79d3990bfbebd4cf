//! Firestore REST client for storefront reads and order creation.
//!
//! Uses the Firestore REST v1 API with the project's web API key. Products
//! and categories change rarely and are read wholesale, so both lists are
//! cached for 5 minutes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument};

use fiesta_core::firestore::convert::{
    self, OrderDraft, category_from_doc, order_from_doc, product_from_doc,
};
use fiesta_core::firestore::{Document, Value};
use fiesta_core::records::{Category, Order, Product};
use fiesta_core::types::{CustomerId, ProductId};

use crate::config::FirebaseConfig;
use crate::firebase::FirebaseError;

const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Cached catalog values.
#[derive(Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Categories(Arc<Vec<Category>>),
}

/// Client for the Firestore REST API (storefront scope).
///
/// Reads products, categories, and the signed-in customer's orders; the only
/// writes are order documents from the checkout confirm endpoint and the
/// customer's own `users` document.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    /// `https://firestore.googleapis.com/v1/projects/{id}/databases/(default)/documents`
    base_url: String,
    api_key: String,
    cache: Cache<String, CacheValue>,
}

/// Response shape of a collection list call.
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

/// One result row of a `:runQuery` call; rows without a `document` carry
/// only read metadata and are skipped.
#[derive(Debug, Deserialize)]
struct QueryRow {
    document: Option<Document>,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        let base_url = format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
            config.project_id
        );

        Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                base_url,
                api_key: config.api_key.clone(),
                cache: Cache::builder()
                    .max_capacity(16)
                    .time_to_live(CACHE_TTL)
                    .build(),
            }),
        }
    }

    /// GET a raw JSON payload from a documents path.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, FirebaseError> {
        let url = format!(
            "{}/{path}?key={}&pageSize=300",
            self.inner.base_url, self.inner.api_key
        );
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FirebaseError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            tracing::error!(%status, path, "Firestore returned non-success status");
            return Err(FirebaseError::api(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// List every document in a collection. Catalogs are tens of items, so a
    /// single page is always enough.
    async fn list_collection(&self, collection: &str) -> Result<Vec<Document>, FirebaseError> {
        let response: ListResponse = self.get_json(collection).await?;
        Ok(response.documents)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch all products, cached for 5 minutes.
    ///
    /// Documents that fail coercion are skipped with a warning rather than
    /// failing the whole listing; the admin panel can hold half-written
    /// drafts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, FirebaseError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get("products").await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let documents = self.list_collection("products").await?;
        let products: Vec<Product> = documents
            .iter()
            .filter_map(|doc| match product_from_doc(doc) {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::warn!(doc = %doc.name, error = %e, "Skipping malformed product");
                    None
                }
            })
            .collect();

        let products = Arc::new(products);
        self.inner
            .cache
            .insert(
                "products".to_string(),
                CacheValue::Products(Arc::clone(&products)),
            )
            .await;
        Ok(products)
    }

    /// Fetch a single product by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document doesn't exist, or an error if the
    /// request or coercion fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, FirebaseError> {
        let doc: Document = self.get_json(&format!("products/{id}")).await?;
        Ok(product_from_doc(&doc)?)
    }

    /// Fetch all categories, cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Arc<Vec<Category>>, FirebaseError> {
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get("categories").await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let documents = self.list_collection("categories").await?;
        let categories: Vec<Category> = documents
            .iter()
            .filter_map(|doc| match category_from_doc(doc) {
                Ok(category) => Some(category),
                Err(e) => {
                    tracing::warn!(doc = %doc.name, error = %e, "Skipping malformed category");
                    None
                }
            })
            .collect();

        let categories = Arc::new(categories);
        self.inner
            .cache
            .insert(
                "categories".to_string(),
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Create an order document; Firestore assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or the response coercion fails.
    #[instrument(skip(self, draft), fields(session = %draft.payment_session_id))]
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<Order, FirebaseError> {
        let url = format!("{}/orders?key={}", self.inner.base_url, self.inner.api_key);
        let body = serde_json::json!({
            "fields": convert::order_fields(draft, Utc::now()),
        });

        let response = self.inner.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!(%status, "Failed to create order document");
            return Err(FirebaseError::api(status, &text));
        }

        let doc: Document = serde_json::from_str(&text)?;
        Ok(order_from_doc(&doc)?)
    }

    /// Orders belonging to a signed-in customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self), fields(customer = %customer_id))]
    pub async fn orders_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Order>, FirebaseError> {
        let url = format!(
            "{}:runQuery?key={}",
            self.inner.base_url, self.inner.api_key
        );
        let body = serde_json::json!({
            "structuredQuery": {
                "from": [{"collectionId": "orders"}],
                "where": {
                    "fieldFilter": {
                        "field": {"fieldPath": "customerId"},
                        "op": "EQUAL",
                        "value": Value::string(customer_id.as_str()),
                    }
                },
                "orderBy": [{"field": {"fieldPath": "createdAt"}, "direction": "DESCENDING"}],
            }
        });

        let response = self.inner.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!(%status, "Firestore query failed");
            return Err(FirebaseError::api(status, &text));
        }

        let rows: Vec<QueryRow> = serde_json::from_str(&text)?;
        rows.into_iter()
            .filter_map(|row| row.document)
            .map(|doc| order_from_doc(&doc).map_err(FirebaseError::from))
            .collect()
    }

    /// Write the signed-in customer's `users` document (keyed by their
    /// Firebase Auth uid).
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    #[instrument(skip(self, email), fields(customer = %customer_id))]
    pub async fn upsert_customer(
        &self,
        customer_id: &CustomerId,
        email: &fiesta_core::types::Email,
        display_name: Option<&str>,
    ) -> Result<(), FirebaseError> {
        let url = format!(
            "{}/users?documentId={}&key={}",
            self.inner.base_url,
            customer_id,
            self.inner.api_key
        );
        let body = serde_json::json!({
            "fields": convert::customer_fields(email, display_name, Utc::now()),
        });

        let response = self.inner.client.post(&url).json(&body).send().await?;
        let status = response.status();
        // Document already exists on repeat login; that's fine.
        if status == reqwest::StatusCode::CONFLICT {
            return Ok(());
        }
        if !status.is_success() {
            let text = response.text().await?;
            return Err(FirebaseError::api(status, &text));
        }
        Ok(())
    }

    /// Cheap connectivity probe for the readiness endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if Firestore is unreachable.
    pub async fn ping(&self) -> Result<(), FirebaseError> {
        let url = format!(
            "{}/categories?key={}&pageSize=1",
            self.inner.base_url, self.inner.api_key
        );
        let response = self.inner.client.get(&url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(FirebaseError::api(response.status(), ""))
        }
    }
}
