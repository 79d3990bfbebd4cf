//! Record types, one per hosted collection.
//!
//! Firestore documents are loosely shaped; each collection gets an explicit
//! record type here and is validated/coerced into it at the read boundary
//! (see the `firebase::conversions` modules in the binaries). Relationships
//! are soft foreign-key fields only - `category_id` on a product, `role_id`
//! on a staff member - checked ad hoc before deletes, never enforced.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CategoryId, CustomerId, Email, OrderId, OrderStatus, Price, ProductId, RoleId, StaffId,
};

/// A rentable product in the `products` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Soft reference into the `categories` collection.
    pub category_id: Option<CategoryId>,
    /// Rental price per day.
    pub price: Price,
    /// Public URL of the uploaded product image, if any.
    pub image_url: Option<String>,
    /// Featured on the storefront home view and sortable-by.
    pub popular: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product category in the `categories` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single rented line on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    /// Product name at time of order, denormalized for display.
    pub product_name: String,
    pub rental_date: NaiveDate,
    pub quantity: u32,
    pub unit_price: Price,
}

impl OrderLine {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Customer contact details captured during checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
}

/// Delivery details captured during checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    /// Free-text delivery instructions ("gate code 1234").
    pub notes: Option<String>,
}

/// An order in the `orders` collection, written when a payment session
/// completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Signed-in customer, when the order wasn't placed as a guest.
    pub customer_id: Option<CustomerId>,
    pub customer: CustomerDetails,
    pub delivery: DeliveryDetails,
    pub lines: Vec<OrderLine>,
    pub total: Price,
    pub status: OrderStatus,
    /// Stripe checkout session that paid for this order.
    pub payment_session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Total quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

/// A staff account in the `staff` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub name: String,
    pub email: Email,
    /// Soft reference into the `roles` collection.
    pub role_id: Option<RoleId>,
    /// Permissions granted directly, on top of the role's list.
    pub permissions: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named permission bundle in the `roles` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer account in the `users` collection, mirroring the Firebase Auth
/// user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: Email,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::price::CurrencyCode;

    fn line(qty: u32, cents: i64) -> OrderLine {
        OrderLine {
            product_id: ProductId::new("p1"),
            product_name: "Bounce House".to_string(),
            rental_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            quantity: qty,
            unit_price: Price::from_cents(cents, CurrencyCode::USD).unwrap(),
        }
    }

    #[test]
    fn test_order_line_total() {
        assert_eq!(line(3, 150_00).total().to_cents(), 450_00);
    }

    #[test]
    fn test_order_item_count() {
        let order = Order {
            id: OrderId::new("o1"),
            customer_id: None,
            customer: CustomerDetails {
                first_name: "Ana".to_string(),
                last_name: "Diaz".to_string(),
                email: Email::parse("ana@example.com").unwrap(),
                phone: None,
            },
            delivery: DeliveryDetails {
                address: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                postal_code: "12345".to_string(),
                notes: None,
            },
            lines: vec![line(2, 150_00), line(1, 80_00)],
            total: Price::from_cents(380_00, CurrencyCode::USD).unwrap(),
            status: OrderStatus::Pending,
            payment_session_id: "cs_test_123".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(order.item_count(), 3);
    }
}
