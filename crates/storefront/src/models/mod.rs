//! Session-backed request models.
//!
//! Everything the storefront remembers between requests lives in the session:
//! the cart (as opaque bytes behind the [`CartStore`] port), the signed-in
//! customer, and checkout progress.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use fiesta_core::cart::{Cart, CartStore, CartStoreError, load_cart, save_cart};
use fiesta_core::checkout::CheckoutState;
use fiesta_core::types::{CustomerId, Email};

use crate::error::{AppError, Result};

/// Session keys. Centralized to avoid typo'd string literals in handlers.
pub mod session_keys {
    /// Serialized cart bytes.
    pub const CART: &str = "cart";
    /// Serialized [`super::CurrentCustomer`].
    pub const CUSTOMER: &str = "customer";
    /// Serialized [`fiesta_core::checkout::CheckoutState`].
    pub const CHECKOUT: &str = "checkout";
    /// Stripe Checkout Session id, set while payment is in flight.
    pub const PAYMENT_SESSION: &str = "payment_session";
}

/// The signed-in customer as stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    pub id: CustomerId,
    pub email: Email,
    pub display_name: Option<String>,
}

// =============================================================================
// Cart persistence through the session
// =============================================================================

/// [`CartStore`] backed by an already-read snapshot of the session's cart
/// bytes. The async session read/write happens around it in [`read_cart`] and
/// [`write_cart`]; the reducer itself stays synchronous.
struct SessionBytes(Option<Vec<u8>>);

impl CartStore for SessionBytes {
    fn load(&self) -> std::result::Result<Option<Vec<u8>>, CartStoreError> {
        Ok(self.0.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> std::result::Result<(), CartStoreError> {
        self.0 = Some(bytes.to_vec());
        Ok(())
    }
}

/// Load the cart from the session, defaulting to empty.
///
/// # Errors
///
/// Returns an error if the session backend fails or the stored cart is
/// corrupt.
pub async fn read_cart(session: &Session) -> Result<Cart> {
    let bytes: Option<Vec<u8>> = session
        .get(session_keys::CART)
        .await
        .map_err(|e| CartStoreError::Backend(e.to_string()))
        .map_err(AppError::from)?;
    Ok(load_cart(&SessionBytes(bytes))?)
}

/// Persist the cart back to the session.
///
/// # Errors
///
/// Returns an error if encoding or the session write fails.
pub async fn write_cart(session: &Session, cart: &Cart) -> Result<()> {
    let mut store = SessionBytes(None);
    save_cart(&mut store, cart)?;
    session
        .insert(session_keys::CART, store.0)
        .await
        .map_err(|e| CartStoreError::Backend(e.to_string()))
        .map_err(AppError::from)?;
    Ok(())
}

// =============================================================================
// Checkout state through the session
// =============================================================================

/// Load checkout progress, defaulting to a fresh flow.
///
/// # Errors
///
/// Returns an error if the session backend fails.
pub async fn read_checkout(session: &Session) -> Result<CheckoutState> {
    let state: Option<CheckoutState> = session
        .get(session_keys::CHECKOUT)
        .await
        .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?;
    Ok(state.unwrap_or_default())
}

/// Persist checkout progress.
///
/// # Errors
///
/// Returns an error if the session write fails.
pub async fn write_checkout(session: &Session, state: &CheckoutState) -> Result<()> {
    session
        .insert(session_keys::CHECKOUT, state)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fiesta_core::types::Price;
    use fiesta_core::types::price::CurrencyCode;

    #[test]
    fn test_session_bytes_roundtrip() {
        let mut cart = Cart::new();
        cart.add(
            fiesta_core::types::ProductId::new("p1"),
            "Bounce House",
            "2026-06-01".parse().unwrap(),
            Price::from_cents(150_00, CurrencyCode::USD).unwrap(),
        );

        let mut store = SessionBytes(None);
        save_cart(&mut store, &cart).unwrap();
        let loaded = load_cart(&store).unwrap();
        assert_eq!(loaded, cart);
    }

    #[test]
    fn test_current_customer_serde() {
        let customer = CurrentCustomer {
            id: CustomerId::new("uid-1"),
            email: Email::parse("ana@example.com").unwrap(),
            display_name: Some("Ana".to_string()),
        };
        let json = serde_json::to_string(&customer).unwrap();
        let back: CurrentCustomer = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id.as_str(), "uid-1");
        assert_eq!(back.email.as_str(), "ana@example.com");
    }
}
