//! Conversions between Firestore documents and record types.
//!
//! Reads validate and coerce each loose document into its record type,
//! reporting the offending field on failure. Writes produce the typed field
//! maps the REST API expects. Document field names follow the camelCase
//! convention the original dashboard wrote; prices are stored as integer
//! cents.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::{ConvertError, Document, Fields, MapValue, Value};
use crate::records::{
    Category, Customer, CustomerDetails, DeliveryDetails, Order, OrderLine, Product, Role,
    StaffMember,
};
use crate::types::price::CurrencyCode;
use crate::types::{
    CategoryId, CustomerId, Email, OrderId, OrderStatus, Price, ProductId, RoleId, StaffId,
};

// =============================================================================
// Drafts (client-supplied fields, before the server assigns id/timestamps)
// =============================================================================

/// Fields of a product under creation or update.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub price: Price,
    pub image_url: Option<String>,
    #[serde(default)]
    pub popular: bool,
}

/// Fields of a category under creation or update.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

/// Fields of a staff member under creation or update.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StaffDraft {
    pub name: String,
    pub email: Email,
    pub role_id: Option<RoleId>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Fields of a role under creation or update.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoleDraft {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Fields of an order about to be written by the confirm endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub customer_id: Option<CustomerId>,
    pub customer: CustomerDetails,
    pub delivery: DeliveryDetails,
    pub lines: Vec<OrderLine>,
    pub total: Price,
    pub status: OrderStatus,
    pub payment_session_id: String,
}

const fn default_true() -> bool {
    true
}

// =============================================================================
// Field helpers
// =============================================================================

fn price_from_cents(field: &str, cents: i64) -> Result<Price, ConvertError> {
    Price::from_cents(cents, CurrencyCode::USD).map_err(|e| ConvertError::Invalid {
        field: field.to_string(),
        message: e.to_string(),
    })
}

fn email_field(fields: &Fields<'_>, name: &str) -> Result<Email, ConvertError> {
    let raw = fields.string(name)?;
    Email::parse(&raw).map_err(|e| ConvertError::Invalid {
        field: name.to_string(),
        message: e.to_string(),
    })
}

fn date_field(fields: &Fields<'_>, name: &str) -> Result<NaiveDate, ConvertError> {
    let raw = fields.string(name)?;
    raw.parse().map_err(|_| ConvertError::Invalid {
        field: name.to_string(),
        message: format!("not an ISO date: {raw}"),
    })
}

fn map_field<'a>(
    fields: &Fields<'a>,
    name: &str,
) -> Result<&'a BTreeMap<String, Value>, ConvertError> {
    match fields.0.get(name) {
        Some(Value::MapValue(map)) => Ok(&map.fields),
        Some(_) => Err(ConvertError::WrongType {
            field: name.to_string(),
            expected: "map",
        }),
        None => Err(ConvertError::MissingField(name.to_string())),
    }
}

fn insert_opt_string(fields: &mut BTreeMap<String, Value>, name: &str, value: Option<&String>) {
    if let Some(value) = value {
        fields.insert(name.to_string(), Value::string(value));
    }
}

// =============================================================================
// Products
// =============================================================================

/// Coerce a `products` document into a [`Product`].
///
/// # Errors
///
/// Returns a [`ConvertError`] naming the first offending field.
pub fn product_from_doc(doc: &Document) -> Result<Product, ConvertError> {
    let fields = Fields(&doc.fields);
    Ok(Product {
        id: ProductId::new(doc.doc_id()),
        name: fields.string("name")?,
        description: fields.string_opt("description")?.unwrap_or_default(),
        category_id: fields.string_opt("categoryId")?.map(CategoryId::new),
        price: price_from_cents("priceCents", fields.integer("priceCents")?)?,
        image_url: fields.string_opt("imageUrl")?,
        popular: fields.bool_or_false("popular")?,
        created_at: fields.timestamp_or_epoch("createdAt")?,
        updated_at: fields.timestamp_or_epoch("updatedAt")?,
    })
}

/// Typed fields for writing a product.
#[must_use]
pub fn product_fields(draft: &ProductDraft, now: DateTime<Utc>) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), Value::string(&draft.name));
    fields.insert("description".to_string(), Value::string(&draft.description));
    if let Some(category_id) = &draft.category_id {
        fields.insert("categoryId".to_string(), Value::string(category_id.as_str()));
    }
    fields.insert("priceCents".to_string(), Value::integer(draft.price.to_cents()));
    insert_opt_string(&mut fields, "imageUrl", draft.image_url.as_ref());
    fields.insert("popular".to_string(), Value::BooleanValue(draft.popular));
    fields.insert("updatedAt".to_string(), Value::TimestampValue(now));
    fields
}

// =============================================================================
// Categories
// =============================================================================

/// Coerce a `categories` document into a [`Category`].
///
/// # Errors
///
/// Returns a [`ConvertError`] naming the first offending field.
pub fn category_from_doc(doc: &Document) -> Result<Category, ConvertError> {
    let fields = Fields(&doc.fields);
    Ok(Category {
        id: CategoryId::new(doc.doc_id()),
        name: fields.string("name")?,
        description: fields.string_opt("description")?.unwrap_or_default(),
        created_at: fields.timestamp_or_epoch("createdAt")?,
        updated_at: fields.timestamp_or_epoch("updatedAt")?,
    })
}

/// Typed fields for writing a category.
#[must_use]
pub fn category_fields(draft: &CategoryDraft, now: DateTime<Utc>) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), Value::string(&draft.name));
    fields.insert("description".to_string(), Value::string(&draft.description));
    fields.insert("updatedAt".to_string(), Value::TimestampValue(now));
    fields
}

// =============================================================================
// Orders
// =============================================================================

fn order_line_from_map(fields: &BTreeMap<String, Value>) -> Result<OrderLine, ConvertError> {
    let fields = Fields(fields);
    let quantity = fields.integer("quantity")?;
    let quantity = u32::try_from(quantity).map_err(|_| ConvertError::Invalid {
        field: "quantity".to_string(),
        message: format!("out of range: {quantity}"),
    })?;
    Ok(OrderLine {
        product_id: ProductId::new(fields.string("productId")?),
        product_name: fields.string_opt("productName")?.unwrap_or_default(),
        rental_date: date_field(&fields, "rentalDate")?,
        quantity,
        unit_price: price_from_cents("unitPriceCents", fields.integer("unitPriceCents")?)?,
    })
}

fn order_line_fields(line: &OrderLine) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("productId".to_string(), Value::string(line.product_id.as_str()));
    fields.insert("productName".to_string(), Value::string(&line.product_name));
    fields.insert(
        "rentalDate".to_string(),
        Value::string(line.rental_date.format("%Y-%m-%d").to_string()),
    );
    fields.insert("quantity".to_string(), Value::integer(i64::from(line.quantity)));
    fields.insert(
        "unitPriceCents".to_string(),
        Value::integer(line.unit_price.to_cents()),
    );
    fields
}

fn customer_details_from_map(
    fields: &BTreeMap<String, Value>,
) -> Result<CustomerDetails, ConvertError> {
    let fields = Fields(fields);
    Ok(CustomerDetails {
        first_name: fields.string("firstName")?,
        last_name: fields.string("lastName")?,
        email: email_field(&fields, "email")?,
        phone: fields.string_opt("phone")?,
    })
}

fn delivery_details_from_map(
    fields: &BTreeMap<String, Value>,
) -> Result<DeliveryDetails, ConvertError> {
    let fields = Fields(fields);
    Ok(DeliveryDetails {
        address: fields.string("address")?,
        city: fields.string("city")?,
        postal_code: fields.string("postalCode")?,
        notes: fields.string_opt("notes")?,
    })
}

/// Coerce an `orders` document into an [`Order`].
///
/// Unknown status strings coerce to `Pending` rather than failing the whole
/// document; the status field predates the closed vocabulary.
///
/// # Errors
///
/// Returns a [`ConvertError`] naming the first offending field.
pub fn order_from_doc(doc: &Document) -> Result<Order, ConvertError> {
    let fields = Fields(&doc.fields);
    let status = fields
        .string_opt("status")?
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(OrderStatus::Pending);

    Ok(Order {
        id: OrderId::new(doc.doc_id()),
        customer_id: fields.string_opt("customerId")?.map(CustomerId::new),
        customer: customer_details_from_map(map_field(&fields, "customer")?)?,
        delivery: delivery_details_from_map(map_field(&fields, "delivery")?)?,
        lines: fields
            .map_array("lines")?
            .into_iter()
            .map(order_line_from_map)
            .collect::<Result<_, _>>()?,
        total: price_from_cents("totalCents", fields.integer("totalCents")?)?,
        status,
        payment_session_id: fields.string_opt("paymentSessionId")?.unwrap_or_default(),
        created_at: fields.timestamp_or_epoch("createdAt")?,
        updated_at: fields.timestamp_or_epoch("updatedAt")?,
    })
}

/// Typed fields for writing a new order.
#[must_use]
pub fn order_fields(draft: &OrderDraft, now: DateTime<Utc>) -> BTreeMap<String, Value> {
    let mut customer = BTreeMap::new();
    customer.insert("firstName".to_string(), Value::string(&draft.customer.first_name));
    customer.insert("lastName".to_string(), Value::string(&draft.customer.last_name));
    customer.insert("email".to_string(), Value::string(draft.customer.email.as_str()));
    insert_opt_string(&mut customer, "phone", draft.customer.phone.as_ref());

    let mut delivery = BTreeMap::new();
    delivery.insert("address".to_string(), Value::string(&draft.delivery.address));
    delivery.insert("city".to_string(), Value::string(&draft.delivery.city));
    delivery.insert(
        "postalCode".to_string(),
        Value::string(&draft.delivery.postal_code),
    );
    insert_opt_string(&mut delivery, "notes", draft.delivery.notes.as_ref());

    let lines: Vec<Value> = draft
        .lines
        .iter()
        .map(|line| Value::MapValue(MapValue { fields: order_line_fields(line) }))
        .collect();

    let mut fields = BTreeMap::new();
    if let Some(customer_id) = &draft.customer_id {
        fields.insert("customerId".to_string(), Value::string(customer_id.as_str()));
    }
    fields.insert("customer".to_string(), Value::MapValue(MapValue { fields: customer }));
    fields.insert("delivery".to_string(), Value::MapValue(MapValue { fields: delivery }));
    fields.insert(
        "lines".to_string(),
        Value::ArrayValue(super::ArrayValue {
            values: if lines.is_empty() { None } else { Some(lines) },
        }),
    );
    fields.insert("totalCents".to_string(), Value::integer(draft.total.to_cents()));
    fields.insert("status".to_string(), Value::string(draft.status.to_string()));
    fields.insert(
        "paymentSessionId".to_string(),
        Value::string(&draft.payment_session_id),
    );
    fields.insert("createdAt".to_string(), Value::TimestampValue(now));
    fields.insert("updatedAt".to_string(), Value::TimestampValue(now));
    fields
}

/// Typed fields for an order status patch.
#[must_use]
pub fn order_status_fields(status: OrderStatus, now: DateTime<Utc>) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("status".to_string(), Value::string(status.to_string()));
    fields.insert("updatedAt".to_string(), Value::TimestampValue(now));
    fields
}

// =============================================================================
// Staff & roles
// =============================================================================

/// Coerce a `staff` document into a [`StaffMember`].
///
/// # Errors
///
/// Returns a [`ConvertError`] naming the first offending field.
pub fn staff_from_doc(doc: &Document) -> Result<StaffMember, ConvertError> {
    let fields = Fields(&doc.fields);
    Ok(StaffMember {
        id: StaffId::new(doc.doc_id()),
        name: fields.string("name")?,
        email: email_field(&fields, "email")?,
        role_id: fields.string_opt("roleId")?.map(RoleId::new),
        permissions: fields.string_array("permissions")?,
        active: fields.bool_or_false("active")?,
        created_at: fields.timestamp_or_epoch("createdAt")?,
        updated_at: fields.timestamp_or_epoch("updatedAt")?,
    })
}

/// Typed fields for writing a staff member.
#[must_use]
pub fn staff_fields(draft: &StaffDraft, now: DateTime<Utc>) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), Value::string(&draft.name));
    fields.insert("email".to_string(), Value::string(draft.email.as_str()));
    if let Some(role_id) = &draft.role_id {
        fields.insert("roleId".to_string(), Value::string(role_id.as_str()));
    }
    fields.insert(
        "permissions".to_string(),
        Value::string_array(draft.permissions.clone()),
    );
    fields.insert("active".to_string(), Value::BooleanValue(draft.active));
    fields.insert("updatedAt".to_string(), Value::TimestampValue(now));
    fields
}

/// Coerce a `roles` document into a [`Role`].
///
/// # Errors
///
/// Returns a [`ConvertError`] naming the first offending field.
pub fn role_from_doc(doc: &Document) -> Result<Role, ConvertError> {
    let fields = Fields(&doc.fields);
    Ok(Role {
        id: RoleId::new(doc.doc_id()),
        name: fields.string("name")?,
        permissions: fields.string_array("permissions")?,
        created_at: fields.timestamp_or_epoch("createdAt")?,
        updated_at: fields.timestamp_or_epoch("updatedAt")?,
    })
}

/// Typed fields for writing a role.
#[must_use]
pub fn role_fields(draft: &RoleDraft, now: DateTime<Utc>) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), Value::string(&draft.name));
    fields.insert(
        "permissions".to_string(),
        Value::string_array(draft.permissions.clone()),
    );
    fields.insert("updatedAt".to_string(), Value::TimestampValue(now));
    fields
}

// =============================================================================
// Customers
// =============================================================================

/// Coerce a `users` document into a [`Customer`].
///
/// # Errors
///
/// Returns a [`ConvertError`] naming the first offending field.
pub fn customer_from_doc(doc: &Document) -> Result<Customer, ConvertError> {
    let fields = Fields(&doc.fields);
    Ok(Customer {
        id: CustomerId::new(doc.doc_id()),
        email: email_field(&fields, "email")?,
        display_name: fields.string_opt("displayName")?,
        created_at: fields.timestamp_or_epoch("createdAt")?,
    })
}

/// Typed fields for writing a customer account document.
#[must_use]
pub fn customer_fields(
    email: &Email,
    display_name: Option<&str>,
    now: DateTime<Utc>,
) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("email".to_string(), Value::string(email.as_str()));
    if let Some(display_name) = display_name {
        fields.insert("displayName".to_string(), Value::string(display_name));
    }
    fields.insert("createdAt".to_string(), Value::TimestampValue(now));
    fields
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn doc(collection: &str, id: &str, fields: BTreeMap<String, Value>) -> Document {
        Document {
            name: format!("projects/p/databases/(default)/documents/{collection}/{id}"),
            fields,
            create_time: None,
            update_time: None,
        }
    }

    #[test]
    fn test_product_roundtrip() {
        let draft = ProductDraft {
            name: "Bounce House".to_string(),
            description: "Castle style".to_string(),
            category_id: Some(CategoryId::new("inflatables")),
            price: Price::from_cents(150_00, CurrencyCode::USD).unwrap(),
            image_url: Some("https://img.example/p1.jpg".to_string()),
            popular: true,
        };
        let now = Utc::now();
        let product = product_from_doc(&doc("products", "p1", product_fields(&draft, now))).unwrap();

        assert_eq!(product.id, ProductId::new("p1"));
        assert_eq!(product.name, "Bounce House");
        assert_eq!(product.category_id, Some(CategoryId::new("inflatables")));
        assert_eq!(product.price.to_cents(), 150_00);
        assert!(product.popular);
    }

    #[test]
    fn test_product_missing_name_fails() {
        let mut fields = BTreeMap::new();
        fields.insert("priceCents".to_string(), Value::integer(100));
        let err = product_from_doc(&doc("products", "p1", fields)).unwrap_err();
        assert_eq!(err, ConvertError::MissingField("name".to_string()));
    }

    #[test]
    fn test_product_tolerates_missing_optionals() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), Value::string("Chair"));
        fields.insert("priceCents".to_string(), Value::integer(250));
        let product = product_from_doc(&doc("products", "p4", fields)).unwrap();
        assert_eq!(product.description, "");
        assert_eq!(product.category_id, None);
        assert!(!product.popular);
        assert_eq!(product.created_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_order_roundtrip() {
        let draft = OrderDraft {
            customer_id: Some(CustomerId::new("u1")),
            customer: CustomerDetails {
                first_name: "Ana".to_string(),
                last_name: "Diaz".to_string(),
                email: Email::parse("ana@example.com").unwrap(),
                phone: Some("555-0100".to_string()),
            },
            delivery: DeliveryDetails {
                address: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                postal_code: "12345".to_string(),
                notes: None,
            },
            lines: vec![OrderLine {
                product_id: ProductId::new("p1"),
                product_name: "Bounce House".to_string(),
                rental_date: "2025-06-01".parse().unwrap(),
                quantity: 2,
                unit_price: Price::from_cents(150_00, CurrencyCode::USD).unwrap(),
            }],
            total: Price::from_cents(300_00, CurrencyCode::USD).unwrap(),
            status: OrderStatus::Pending,
            payment_session_id: "cs_test_1".to_string(),
        };

        let order = order_from_doc(&doc("orders", "o1", order_fields(&draft, Utc::now()))).unwrap();
        assert_eq!(order.id, OrderId::new("o1"));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines.first().unwrap().quantity, 2);
        assert_eq!(order.total.to_cents(), 300_00);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.item_count(), 2);
    }

    #[test]
    fn test_order_unknown_status_coerces_to_pending() {
        let draft = OrderDraft {
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
            lines: vec![],
            total: Price::zero(CurrencyCode::USD),
            status: OrderStatus::Pending,
            payment_session_id: String::new(),
        };
        let mut fields = order_fields(&draft, Utc::now());
        fields.insert("status".to_string(), Value::string("shipped"));
        let order = order_from_doc(&doc("orders", "o2", fields)).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_staff_roundtrip_with_permissions() {
        let draft = StaffDraft {
            name: "Sam".to_string(),
            email: Email::parse("sam@example.com").unwrap(),
            role_id: Some(RoleId::new("manager")),
            permissions: vec!["catalog.write".to_string()],
            active: true,
        };
        let staff = staff_from_doc(&doc("staff", "s1", staff_fields(&draft, Utc::now()))).unwrap();
        assert_eq!(staff.role_id, Some(RoleId::new("manager")));
        assert_eq!(staff.permissions, vec!["catalog.write"]);
        assert!(staff.active);
    }

    #[test]
    fn test_role_with_empty_permissions() {
        let draft = RoleDraft {
            name: "Viewer".to_string(),
            permissions: vec![],
        };
        let role = role_from_doc(&doc("roles", "r1", role_fields(&draft, Utc::now()))).unwrap();
        assert!(role.permissions.is_empty());
    }

    #[test]
    fn test_staff_bad_email_fails_with_field() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), Value::string("Sam"));
        fields.insert("email".to_string(), Value::string("not-an-email"));
        let err = staff_from_doc(&doc("staff", "s1", fields)).unwrap_err();
        assert!(matches!(err, ConvertError::Invalid { ref field, .. } if field == "email"));
    }
}
