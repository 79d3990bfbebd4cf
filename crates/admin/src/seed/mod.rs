//! Demo catalog seeding.
//!
//! Seed data is declarative YAML (categories, products, roles, staff) applied
//! through the same Firestore client the CRUD panels use. Documents are
//! written with fixed ids, so re-seeding over an existing demo set fails on
//! the duplicate ids rather than duplicating the catalog.

use serde::Deserialize;
use tracing::{info, instrument};

use fiesta_core::firestore::convert::{CategoryDraft, ProductDraft, RoleDraft, StaffDraft};
use fiesta_core::types::price::CurrencyCode;
use fiesta_core::types::{CategoryId, Email, Price, RoleId};

use crate::firestore::{FirestoreClient, FirestoreError};

/// The built-in demo catalog.
pub const DEMO_CATALOG: &str = include_str!("demo.yaml");

/// Errors from loading or applying a seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// YAML parsing failed.
    #[error("seed file parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A seed entry failed validation.
    #[error("invalid seed entry {entry}: {message}")]
    Invalid { entry: String, message: String },

    /// A Firestore write failed.
    #[error("seed write failed: {0}")]
    Firestore(#[from] FirestoreError),
}

/// A parsed seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub roles: Vec<SeedRole>,
    #[serde(default)]
    pub staff: Vec<SeedStaff>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub popular: bool,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedRole {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedStaff {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role_id: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

const fn default_true() -> bool {
    true
}

/// Counts of what a seed run wrote.
#[derive(Debug, Default, serde::Serialize)]
pub struct SeedReport {
    pub categories: usize,
    pub products: usize,
    pub roles: usize,
    pub staff: usize,
}

impl SeedFile {
    /// Parse a seed file from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn parse(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The built-in demo catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded YAML fails to parse, which would be a
    /// packaging defect.
    pub fn demo() -> Result<Self, SeedError> {
        Self::parse(DEMO_CATALOG)
    }
}

/// Apply a seed file, writing in dependency order (categories and roles
/// before the products and staff that reference them).
///
/// # Errors
///
/// Returns the first validation or write error; earlier writes stay.
#[instrument(skip(client, seed), fields(
    categories = seed.categories.len(),
    products = seed.products.len(),
))]
pub async fn apply(client: &FirestoreClient, seed: &SeedFile) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for category in &seed.categories {
        let draft = CategoryDraft {
            name: category.name.clone(),
            description: category.description.clone(),
        };
        client.create_category(&draft, Some(&category.id)).await?;
        report.categories += 1;
    }

    for role in &seed.roles {
        let draft = RoleDraft {
            name: role.name.clone(),
            permissions: role.permissions.clone(),
        };
        client.create_role(&draft, Some(&role.id)).await?;
        report.roles += 1;
    }

    for product in &seed.products {
        let price =
            Price::from_cents(product.price_cents, CurrencyCode::USD).map_err(|e| {
                SeedError::Invalid {
                    entry: format!("product {}", product.id),
                    message: e.to_string(),
                }
            })?;
        let draft = ProductDraft {
            name: product.name.clone(),
            description: product.description.clone(),
            category_id: product.category_id.clone().map(CategoryId::new),
            price,
            image_url: product.image_url.clone(),
            popular: product.popular,
        };
        client.create_product(&draft, Some(&product.id)).await?;
        report.products += 1;
    }

    for staff in &seed.staff {
        let email = Email::parse(&staff.email).map_err(|e| SeedError::Invalid {
            entry: format!("staff {}", staff.id),
            message: e.to_string(),
        })?;
        let draft = StaffDraft {
            name: staff.name.clone(),
            email,
            role_id: staff.role_id.clone().map(RoleId::new),
            permissions: staff.permissions.clone(),
            active: staff.active,
        };
        client.create_staff(&draft, Some(&staff.id)).await?;
        report.staff += 1;
    }

    info!(
        categories = report.categories,
        products = report.products,
        roles = report.roles,
        staff = report.staff,
        "Seed applied"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_parses() {
        let seed = SeedFile::demo().unwrap();
        assert!(!seed.categories.is_empty());
        assert!(!seed.products.is_empty());
        assert!(!seed.roles.is_empty());

        // Every product's category must exist in the same file.
        for product in &seed.products {
            if let Some(category_id) = &product.category_id {
                assert!(
                    seed.categories.iter().any(|c| &c.id == category_id),
                    "product {} references unknown category {category_id}",
                    product.id
                );
            }
        }
        // Every staff role must exist in the same file.
        for staff in &seed.staff {
            if let Some(role_id) = &staff.role_id {
                assert!(
                    seed.roles.iter().any(|r| &r.id == role_id),
                    "staff {} references unknown role {role_id}",
                    staff.id
                );
            }
        }
    }

    #[test]
    fn test_parse_minimal_seed() {
        let seed = SeedFile::parse("products: []\n").unwrap();
        assert!(seed.products.is_empty());
        assert!(seed.categories.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_yaml() {
        assert!(matches!(
            SeedFile::parse("products: {not: [a, list"),
            Err(SeedError::Parse(_))
        ));
    }
}
