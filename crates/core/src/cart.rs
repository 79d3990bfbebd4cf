//! Shopping cart reducer.
//!
//! The cart is a list of lines, each unique per `(product_id, rental_date)`.
//! Subtotal and item count are always recomputed from the line list - there
//! is no hidden running total to drift out of sync. Operations on a pair that
//! isn't in the cart are silent no-ops; the storefront treats a stale remove
//! from a second tab as harmless rather than an error.
//!
//! Persistence goes through the [`CartStore`] port (read/write bytes) so the
//! reducer is testable with no session layer and no UI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::price::CurrencyCode;
use crate::types::{Price, ProductId};

/// A single line in the cart: one product on one rental date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    /// Denormalized name so the cart and the payment page can render without
    /// re-fetching the product.
    pub product_name: String,
    pub rental_date: NaiveDate,
    pub quantity: u32,
    pub unit_price: Price,
}

impl CartLine {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// The shopping cart.
///
/// Invariant: at most one line per `(product_id, rental_date)` pair, every
/// line has `quantity >= 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn find_mut(&mut self, product_id: &ProductId, rental_date: NaiveDate) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id && line.rental_date == rental_date)
    }

    /// Add one unit of a product for a rental date.
    ///
    /// If a line for the same `(product_id, rental_date)` already exists its
    /// quantity is incremented by one; otherwise a new line with quantity 1
    /// is appended.
    pub fn add(
        &mut self,
        product_id: ProductId,
        product_name: impl Into<String>,
        rental_date: NaiveDate,
        unit_price: Price,
    ) {
        if let Some(line) = self.find_mut(&product_id, rental_date) {
            line.quantity += 1;
            return;
        }
        self.lines.push(CartLine {
            product_id,
            product_name: product_name.into(),
            rental_date,
            quantity: 1,
            unit_price,
        });
    }

    /// Remove the line matching `(product_id, rental_date)`.
    ///
    /// Removing a pair that isn't in the cart leaves the cart unchanged.
    pub fn remove(&mut self, product_id: &ProductId, rental_date: NaiveDate) {
        self.lines
            .retain(|line| !(&line.product_id == product_id && line.rental_date == rental_date));
    }

    /// Set the quantity of the line matching `(product_id, rental_date)`.
    ///
    /// Callers must reject quantities below 1 before calling; a zero quantity
    /// here is ignored to preserve the line-quantity invariant. Setting a
    /// pair that isn't in the cart is a no-op.
    pub fn set_quantity(&mut self, product_id: &ProductId, rental_date: NaiveDate, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.find_mut(product_id, rental_date) {
            line.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines
            .iter()
            .fold(Price::zero(CurrencyCode::USD), |acc, line| {
                acc.plus(&line.total())
            })
    }
}

// =============================================================================
// Persistence port
// =============================================================================

/// Errors from a [`CartStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum CartStoreError {
    /// The backend could not be read or written.
    #[error("cart store backend error: {0}")]
    Backend(String),
    /// Stored bytes could not be decoded as a cart.
    #[error("stored cart is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Byte-level persistence port for the cart.
///
/// The storefront backs this with the request session; tests back it with a
/// `Vec<u8>`. The reducer itself never touches I/O.
pub trait CartStore {
    /// Read the stored cart bytes, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::Backend`] if the backend read fails.
    fn load(&self) -> Result<Option<Vec<u8>>, CartStoreError>;

    /// Write the cart bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::Backend`] if the backend write fails.
    fn save(&mut self, bytes: &[u8]) -> Result<(), CartStoreError>;
}

/// Read a cart from a store, defaulting to empty when nothing is stored.
///
/// # Errors
///
/// Returns an error if the backend fails or the stored bytes are corrupt.
pub fn load_cart(store: &impl CartStore) -> Result<Cart, CartStoreError> {
    match store.load()? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(Cart::new()),
    }
}

/// Persist a cart to a store as JSON.
///
/// # Errors
///
/// Returns an error if encoding or the backend write fails.
pub fn save_cart(store: &mut impl CartStore, cart: &Cart) -> Result<(), CartStoreError> {
    let bytes = serde_json::to_vec(cart)?;
    store.save(&bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn usd(cents: i64) -> Price {
        Price::from_cents(cents, CurrencyCode::USD).unwrap()
    }

    /// The worked example from the storefront requirements: add p1 @ $150
    /// twice, set quantity back to 1, then remove.
    #[test]
    fn test_add_set_remove_example() {
        let p1 = ProductId::new("p1");
        let day = date("2025-06-01");
        let mut cart = Cart::new();

        cart.add(p1.clone(), "Bounce House", day, usd(150_00));
        cart.add(p1.clone(), "Bounce House", day, usd(150_00));
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal().to_cents(), 300_00);
        assert_eq!(cart.lines().len(), 1, "same (id, date) merges into one line");

        cart.set_quantity(&p1, day, 1);
        assert_eq!(cart.subtotal().to_cents(), 150_00);

        cart.remove(&p1, day);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.subtotal().to_cents(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_same_product_different_dates_are_separate_lines() {
        let p1 = ProductId::new("p1");
        let mut cart = Cart::new();
        cart.add(p1.clone(), "Bounce House", date("2025-06-01"), usd(150_00));
        cart.add(p1.clone(), "Bounce House", date("2025-06-02"), usd(150_00));
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_remove_nonexistent_is_noop() {
        let mut cart = Cart::new();
        cart.add(ProductId::new("p1"), "Bounce House", date("2025-06-01"), usd(150_00));
        let before = cart.clone();

        cart.remove(&ProductId::new("p2"), date("2025-06-01"));
        cart.remove(&ProductId::new("p1"), date("2025-07-01"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_quantity_nonexistent_is_noop() {
        let mut cart = Cart::new();
        cart.add(ProductId::new("p1"), "Bounce House", date("2025-06-01"), usd(150_00));
        let before = cart.clone();

        cart.set_quantity(&ProductId::new("missing"), date("2025-06-01"), 5);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_quantity_zero_is_ignored() {
        let p1 = ProductId::new("p1");
        let day = date("2025-06-01");
        let mut cart = Cart::new();
        cart.add(p1.clone(), "Bounce House", day, usd(150_00));

        cart.set_quantity(&p1, day, 0);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(ProductId::new("p1"), "Bounce House", date("2025-06-01"), usd(150_00));
        cart.add(ProductId::new("p2"), "Folding Chair", date("2025-06-01"), usd(80_00));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal().to_cents(), 0);
    }

    /// Totals must equal the recomputed sums after any sequence of operations.
    #[test]
    fn test_totals_consistent_under_op_sequences() {
        let mut cart = Cart::new();
        let day_a = date("2025-06-01");
        let day_b = date("2025-06-02");

        let ops: &[&dyn Fn(&mut Cart)] = &[
            &|c| c.add(ProductId::new("p1"), "Bounce House", day_a, usd(150_00)),
            &|c| c.add(ProductId::new("p2"), "Folding Chair", day_a, usd(80_00)),
            &|c| c.add(ProductId::new("p1"), "Bounce House", day_a, usd(150_00)),
            &|c| c.set_quantity(&ProductId::new("p2"), day_a, 4),
            &|c| c.add(ProductId::new("p1"), "Bounce House", day_b, usd(150_00)),
            &|c| c.remove(&ProductId::new("p1"), day_a),
            &|c| c.set_quantity(&ProductId::new("ghost"), day_a, 9),
            &|c| c.remove(&ProductId::new("ghost"), day_b),
        ];

        for op in ops {
            op(&mut cart);

            let expected_count: u32 = cart.lines().iter().map(|l| l.quantity).sum();
            let expected_subtotal = cart
                .lines()
                .iter()
                .map(|l| i64::from(l.quantity) * l.unit_price.to_cents())
                .sum::<i64>();

            assert_eq!(cart.item_count(), expected_count);
            assert_eq!(cart.subtotal().to_cents(), expected_subtotal);
        }

        // Final state: p2 x4 on day A, p1 x1 on day B.
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.subtotal().to_cents(), 4 * 80_00 + 150_00);
    }

    // -------------------------------------------------------------------------
    // Persistence port
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct MemStore(Option<Vec<u8>>);

    impl CartStore for MemStore {
        fn load(&self) -> Result<Option<Vec<u8>>, CartStoreError> {
            Ok(self.0.clone())
        }

        fn save(&mut self, bytes: &[u8]) -> Result<(), CartStoreError> {
            self.0 = Some(bytes.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_load_empty_store_gives_empty_cart() {
        let store = MemStore::default();
        let cart = load_cart(&store).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_cart() {
        let mut store = MemStore::default();
        let mut cart = Cart::new();
        cart.add(ProductId::new("p1"), "Bounce House", date("2025-06-01"), usd(150_00));
        cart.add(ProductId::new("p2"), "Folding Chair", date("2025-06-02"), usd(80_00));

        save_cart(&mut store, &cart).unwrap();
        let loaded = load_cart(&store).unwrap();
        assert_eq!(loaded, cart);
    }

    #[test]
    fn test_corrupt_bytes_surface_as_error() {
        let store = MemStore(Some(b"not json".to_vec()));
        assert!(matches!(
            load_cart(&store),
            Err(CartStoreError::Corrupt(_))
        ));
    }
}
