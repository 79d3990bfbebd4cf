//! Type-safe price representation using decimal arithmetic.
//!
//! Rental prices are quoted per day in the currency's standard unit. Stripe
//! wants amounts in the smallest unit (cents), so conversions in both
//! directions live here rather than at the call sites.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a [`Price`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    amount: Decimal,
    /// ISO 4217 currency code.
    currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        if amount < Decimal::ZERO {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self {
            amount,
            currency_code,
        })
    }

    /// A zero price in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency_code,
        }
    }

    /// Create a price from an amount in the smallest currency unit.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero.
    pub fn from_cents(cents: i64, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2), currency_code)
    }

    /// The amount in the smallest currency unit, rounded half-up.
    ///
    /// This is the representation Stripe's `unit_amount` expects.
    #[must_use]
    pub fn to_cents(&self) -> i64 {
        (self.amount * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    /// The amount in the currency's standard unit.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The ISO 4217 currency code.
    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    /// This price multiplied by a quantity, e.g. a cart line total.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code,
        }
    }

    /// Sum of two prices. Both sides must share a currency; callers only ever
    /// sum within a single cart or order, which is single-currency.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self {
            amount: self.amount + other.amount,
            currency_code: self.currency_code,
        }
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }

    /// Lowercase code as Stripe expects it.
    #[must_use]
    pub const fn as_stripe_code(&self) -> &'static str {
        match self {
            Self::USD => "usd",
            Self::EUR => "eur",
            Self::GBP => "gbp",
            Self::CAD => "cad",
            Self::AUD => "aud",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        let result = Price::new(Decimal::new(-100, 2), CurrencyCode::USD);
        assert!(matches!(result, Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_cents_roundtrip() {
        let price = Price::from_cents(15_000, CurrencyCode::USD).unwrap();
        assert_eq!(price.amount(), Decimal::new(150, 0));
        assert_eq!(price.to_cents(), 15_000);
    }

    #[test]
    fn test_times_and_plus() {
        let price = Price::from_cents(150_00, CurrencyCode::USD).unwrap();
        let doubled = price.times(2);
        assert_eq!(doubled.to_cents(), 300_00);
        let sum = doubled.plus(&price);
        assert_eq!(sum.to_cents(), 450_00);
    }

    #[test]
    fn test_display() {
        let price = Price::from_cents(19_99, CurrencyCode::USD).unwrap();
        assert_eq!(price.display(), "$19.99");
    }

    #[test]
    fn test_zero() {
        let zero = Price::zero(CurrencyCode::USD);
        assert_eq!(zero.to_cents(), 0);
    }

    #[test]
    fn test_stripe_code() {
        assert_eq!(CurrencyCode::USD.as_stripe_code(), "usd");
        assert_eq!(CurrencyCode::EUR.as_stripe_code(), "eur");
    }
}
