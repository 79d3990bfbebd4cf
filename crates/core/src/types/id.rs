//! Newtype IDs for type-safe entity references.
//!
//! Firestore assigns opaque string ids to documents. The `define_doc_id!`
//! macro wraps those strings in per-entity newtypes so a `ProductId` can never
//! be passed where an `OrderId` is expected.

/// Macro to define a type-safe document ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Constructors: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use fiesta_core::define_doc_id;
/// define_doc_id!(ProductId);
/// define_doc_id!(OrderId);
///
/// let product_id = ProductId::new("p1");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = product_id;
/// ```
#[macro_export]
macro_rules! define_doc_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs, one per hosted collection.
define_doc_id!(ProductId);
define_doc_id!(CategoryId);
define_doc_id!(OrderId);
define_doc_id!(StaffId);
define_doc_id!(RoleId);
define_doc_id!(CustomerId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_roundtrip() {
        let id = ProductId::new("abc123");
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(String::from(id), "abc123");
    }

    #[test]
    fn test_doc_id_serde_transparent() {
        let id = OrderId::new("ord-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ord-1\"");
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_doc_id_from_str() {
        let id: CategoryId = "cat-9".into();
        assert_eq!(id.as_ref(), "cat-9");
    }
}
