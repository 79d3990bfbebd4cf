//! Privileged Firestore REST client for the admin dashboard.
//!
//! Unlike the storefront's key-scoped client, this one authenticates with a
//! service bearer token and has full read/write access to every collection.
//! Deletes that would strand references (a category still used by products, a
//! role still assigned to staff) are refused with [`FirestoreError::Conflict`]
//! before any write happens.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use fiesta_core::firestore::convert::{
    self, CategoryDraft, ProductDraft, RoleDraft, StaffDraft, category_from_doc, order_from_doc,
    product_from_doc, role_from_doc, staff_from_doc,
};
use fiesta_core::firestore::{ConvertError, Document, Value};
use fiesta_core::records::{Category, Order, Product, Role, StaffMember};
use fiesta_core::types::{CategoryId, OrderId, OrderStatus, ProductId, RoleId, StaffId};

use crate::config::FirebaseConfig;

/// Errors from the Firestore REST API or document coercion.
#[derive(Debug, Error)]
pub enum FirestoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("Firestore API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A document failed validation/coercion into its record type.
    #[error("document conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Document not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Delete refused because other documents still reference this one.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl FirestoreError {
    fn api(status: reqwest::StatusCode, body: &str) -> Self {
        Self::Api {
            status: status.as_u16(),
            message: body.chars().take(300).collect(),
        }
    }
}

/// Response shape of a collection list call.
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

/// One result row of a `:runQuery` call.
#[derive(Debug, Deserialize)]
struct QueryRow {
    document: Option<Document>,
}

/// Privileged client for the Firestore REST API.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    /// `https://firestore.googleapis.com/v1/projects/{id}/databases/(default)/documents`
    base_url: String,
    service_token: SecretString,
}

impl FirestoreClient {
    /// Create a new privileged Firestore client.
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
                service_token: config.service_token.clone(),
            }),
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .bearer_auth(self.inner.service_token.expose_secret())
    }

    async fn read_document(
        &self,
        response: reqwest::Response,
        path: &str,
    ) -> Result<Document, FirestoreError> {
        let status = response.status();
        let body = response.text().await?;
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FirestoreError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            tracing::error!(%status, path, "Firestore returned non-success status");
            return Err(FirestoreError::api(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    // =========================================================================
    // Generic document operations
    // =========================================================================

    async fn list_collection(&self, collection: &str) -> Result<Vec<Document>, FirestoreError> {
        let url = format!("{}/{collection}?pageSize=300", self.inner.base_url);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(%status, collection, "Firestore list failed");
            return Err(FirestoreError::api(status, &body));
        }
        let list: ListResponse = serde_json::from_str(&body)?;
        Ok(list.documents)
    }

    async fn get_document(&self, path: &str) -> Result<Document, FirestoreError> {
        let url = format!("{}/{path}", self.inner.base_url);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        self.read_document(response, path).await
    }

    /// Create a document; Firestore assigns the id unless `document_id` is
    /// given.
    async fn create_document(
        &self,
        collection: &str,
        mut fields: BTreeMap<String, Value>,
        document_id: Option<&str>,
    ) -> Result<Document, FirestoreError> {
        fields.insert("createdAt".to_string(), Value::TimestampValue(Utc::now()));

        let mut url = format!("{}/{collection}", self.inner.base_url);
        if let Some(id) = document_id {
            url.push_str(&format!("?documentId={id}"));
        }
        let body = serde_json::json!({ "fields": fields });
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await?;
        self.read_document(response, collection).await
    }

    /// Patch only the fields named in `mask`; other fields are untouched. A
    /// masked field absent from `fields` is cleared.
    async fn patch_document(
        &self,
        path: &str,
        fields: &BTreeMap<String, Value>,
        mask: &[&str],
    ) -> Result<Document, FirestoreError> {
        let mask_params: Vec<String> = mask
            .iter()
            .map(|field| format!("updateMask.fieldPaths={field}"))
            .collect();
        let url = format!(
            "{}/{path}?currentDocument.exists=true&{}",
            self.inner.base_url,
            mask_params.join("&")
        );
        let body = serde_json::json!({ "fields": fields });
        let response = self
            .request(reqwest::Method::PATCH, &url)
            .json(&body)
            .send()
            .await?;
        self.read_document(response, path).await
    }

    async fn delete_document(&self, path: &str) -> Result<(), FirestoreError> {
        let url = format!("{}/{path}", self.inner.base_url);
        let response = self.request(reqwest::Method::DELETE, &url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(FirestoreError::api(status, &body));
        }
        Ok(())
    }

    /// Whether any document in `collection` has `field == value`.
    async fn any_with_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, FirestoreError> {
        let url = format!("{}:runQuery", self.inner.base_url);
        let body = serde_json::json!({
            "structuredQuery": {
                "from": [{"collectionId": collection}],
                "where": {
                    "fieldFilter": {
                        "field": {"fieldPath": field},
                        "op": "EQUAL",
                        "value": Value::string(value),
                    }
                },
                "limit": 1,
            }
        });
        let rows = self.run_query(&url, &body).await?;
        Ok(rows.iter().any(|row| row.document.is_some()))
    }

    async fn run_query(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<Vec<QueryRow>, FirestoreError> {
        let response = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!(%status, "Firestore query failed");
            return Err(FirestoreError::api(status, &text));
        }
        Ok(serde_json::from_str(&text)?)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List every product, skipping malformed documents with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, FirestoreError> {
        Ok(coerce_all(
            self.list_collection("products").await?,
            product_from_doc,
        ))
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document doesn't exist, or an error if the
    /// request or coercion fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, FirestoreError> {
        let doc = self.get_document(&format!("products/{id}")).await?;
        Ok(product_from_doc(&doc)?)
    }

    /// Create a product; Firestore assigns the id unless one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or response coercion fails.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(
        &self,
        draft: &ProductDraft,
        document_id: Option<&str>,
    ) -> Result<Product, FirestoreError> {
        let doc = self
            .create_document(
                "products",
                convert::product_fields(draft, Utc::now()),
                document_id,
            )
            .await?;
        Ok(product_from_doc(&doc)?)
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product doesn't exist, or an error if the
    /// write fails.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, FirestoreError> {
        let fields = convert::product_fields(draft, Utc::now());
        let doc = self
            .patch_document(
                &format!("products/{id}"),
                &fields,
                &[
                    "name",
                    "description",
                    "categoryId",
                    "priceCents",
                    "imageUrl",
                    "popular",
                    "updatedAt",
                ],
            )
            .await?;
        Ok(product_from_doc(&doc)?)
    }

    /// Point a product at its uploaded image.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    #[instrument(skip(self, image_url), fields(id = %id))]
    pub async fn set_product_image(
        &self,
        id: &ProductId,
        image_url: &str,
    ) -> Result<Product, FirestoreError> {
        let mut fields = BTreeMap::new();
        fields.insert("imageUrl".to_string(), Value::string(image_url));
        fields.insert("updatedAt".to_string(), Value::TimestampValue(Utc::now()));
        let doc = self
            .patch_document(
                &format!("products/{id}"),
                &fields,
                &["imageUrl", "updatedAt"],
            )
            .await?;
        Ok(product_from_doc(&doc)?)
    }

    /// Delete a product. Orders keep their denormalized line data, so no
    /// reference check is needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), FirestoreError> {
        self.delete_document(&format!("products/{id}")).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List every category, skipping malformed documents with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, FirestoreError> {
        Ok(coerce_all(
            self.list_collection("categories").await?,
            category_from_doc,
        ))
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or response coercion fails.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_category(
        &self,
        draft: &CategoryDraft,
        document_id: Option<&str>,
    ) -> Result<Category, FirestoreError> {
        let doc = self
            .create_document(
                "categories",
                convert::category_fields(draft, Utc::now()),
                document_id,
            )
            .await?;
        Ok(category_from_doc(&doc)?)
    }

    /// Replace a category's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category doesn't exist, or an error if the
    /// write fails.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update_category(
        &self,
        id: &CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Category, FirestoreError> {
        let fields = convert::category_fields(draft, Utc::now());
        let doc = self
            .patch_document(
                &format!("categories/{id}"),
                &fields,
                &["name", "description", "updatedAt"],
            )
            .await?;
        Ok(category_from_doc(&doc)?)
    }

    /// Delete a category, refusing while any product still references it.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a product still points at the category, or an
    /// error if the check or delete fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), FirestoreError> {
        if self
            .any_with_field("products", "categoryId", id.as_str())
            .await?
        {
            return Err(FirestoreError::Conflict(format!(
                "category {id} is still assigned to products"
            )));
        }
        self.delete_document(&format!("categories/{id}")).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, FirestoreError> {
        let url = format!("{}:runQuery", self.inner.base_url);
        let body = serde_json::json!({
            "structuredQuery": {
                "from": [{"collectionId": "orders"}],
                "orderBy": [{"field": {"fieldPath": "createdAt"}, "direction": "DESCENDING"}],
            }
        });
        let rows = self.run_query(&url, &body).await?;
        Ok(coerce_all(
            rows.into_iter().filter_map(|row| row.document).collect(),
            order_from_doc,
        ))
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document doesn't exist, or an error if the
    /// request or coercion fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, FirestoreError> {
        let doc = self.get_document(&format!("orders/{id}")).await?;
        Ok(order_from_doc(&doc)?)
    }

    /// Write an order's status. The caller is responsible for checking the
    /// transition first.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    #[instrument(skip(self), fields(id = %id, status = %status))]
    pub async fn set_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, FirestoreError> {
        let fields = convert::order_status_fields(status, Utc::now());
        let doc = self
            .patch_document(
                &format!("orders/{id}"),
                &fields,
                &["status", "updatedAt"],
            )
            .await?;
        Ok(order_from_doc(&doc)?)
    }

    // =========================================================================
    // Staff
    // =========================================================================

    /// List every staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_staff(&self) -> Result<Vec<StaffMember>, FirestoreError> {
        Ok(coerce_all(
            self.list_collection("staff").await?,
            staff_from_doc,
        ))
    }

    /// Fetch one staff member.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document doesn't exist, or an error if the
    /// request or coercion fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_staff(&self, id: &StaffId) -> Result<StaffMember, FirestoreError> {
        let doc = self.get_document(&format!("staff/{id}")).await?;
        Ok(staff_from_doc(&doc)?)
    }

    /// Find the staff member with this email, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn find_staff_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StaffMember>, FirestoreError> {
        let url = format!("{}:runQuery", self.inner.base_url);
        let body = serde_json::json!({
            "structuredQuery": {
                "from": [{"collectionId": "staff"}],
                "where": {
                    "fieldFilter": {
                        "field": {"fieldPath": "email"},
                        "op": "EQUAL",
                        "value": Value::string(email),
                    }
                },
                "limit": 1,
            }
        });
        let rows = self.run_query(&url, &body).await?;
        rows.into_iter()
            .find_map(|row| row.document)
            .map(|doc| staff_from_doc(&doc).map_err(FirestoreError::from))
            .transpose()
    }

    /// Create a staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or response coercion fails.
    #[instrument(skip(self, draft), fields(email = %draft.email))]
    pub async fn create_staff(
        &self,
        draft: &StaffDraft,
        document_id: Option<&str>,
    ) -> Result<StaffMember, FirestoreError> {
        let doc = self
            .create_document("staff", convert::staff_fields(draft, Utc::now()), document_id)
            .await?;
        Ok(staff_from_doc(&doc)?)
    }

    /// Replace a staff member's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the staff member doesn't exist, or an error if
    /// the write fails.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update_staff(
        &self,
        id: &StaffId,
        draft: &StaffDraft,
    ) -> Result<StaffMember, FirestoreError> {
        let fields = convert::staff_fields(draft, Utc::now());
        let doc = self
            .patch_document(
                &format!("staff/{id}"),
                &fields,
                &["name", "email", "roleId", "permissions", "active", "updatedAt"],
            )
            .await?;
        Ok(staff_from_doc(&doc)?)
    }

    /// Delete a staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_staff(&self, id: &StaffId) -> Result<(), FirestoreError> {
        self.delete_document(&format!("staff/{id}")).await
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// List every role.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_roles(&self) -> Result<Vec<Role>, FirestoreError> {
        Ok(coerce_all(
            self.list_collection("roles").await?,
            role_from_doc,
        ))
    }

    /// Fetch one role.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document doesn't exist, or an error if the
    /// request or coercion fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_role(&self, id: &RoleId) -> Result<Role, FirestoreError> {
        let doc = self.get_document(&format!("roles/{id}")).await?;
        Ok(role_from_doc(&doc)?)
    }

    /// Create a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or response coercion fails.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_role(
        &self,
        draft: &RoleDraft,
        document_id: Option<&str>,
    ) -> Result<Role, FirestoreError> {
        let doc = self
            .create_document("roles", convert::role_fields(draft, Utc::now()), document_id)
            .await?;
        Ok(role_from_doc(&doc)?)
    }

    /// Replace a role's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the role doesn't exist, or an error if the write
    /// fails.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update_role(
        &self,
        id: &RoleId,
        draft: &RoleDraft,
    ) -> Result<Role, FirestoreError> {
        let fields = convert::role_fields(draft, Utc::now());
        let doc = self
            .patch_document(
                &format!("roles/{id}"),
                &fields,
                &["name", "permissions", "updatedAt"],
            )
            .await?;
        Ok(role_from_doc(&doc)?)
    }

    /// Delete a role, refusing while any staff member still holds it.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a staff member still has the role, or an error
    /// if the check or delete fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_role(&self, id: &RoleId) -> Result<(), FirestoreError> {
        if self.any_with_field("staff", "roleId", id.as_str()).await? {
            return Err(FirestoreError::Conflict(format!(
                "role {id} is still assigned to staff"
            )));
        }
        self.delete_document(&format!("roles/{id}")).await
    }

    /// Cheap connectivity probe for the readiness endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if Firestore is unreachable.
    pub async fn ping(&self) -> Result<(), FirestoreError> {
        let url = format!("{}/roles?pageSize=1", self.inner.base_url);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(FirestoreError::api(response.status(), ""))
        }
    }
}

/// Coerce a batch of documents, dropping the ones that fail with a warning.
/// The dashboard shouldn't go blank because one document is half-written.
fn coerce_all<T>(
    documents: Vec<Document>,
    coerce: impl Fn(&Document) -> Result<T, ConvertError>,
) -> Vec<T> {
    documents
        .iter()
        .filter_map(|doc| match coerce(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(doc = %doc.name, error = %e, "Skipping malformed document");
                None
            }
        })
        .collect()
}
