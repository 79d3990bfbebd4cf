//! Checkout step state machine.
//!
//! Checkout is a linear flow: `CustomerInfo -> Delivery -> Payment -> Review
//! -> Complete`, moving forward only when the current step's fields validate
//! and backward freely. Reaching `Complete` is what authorizes the single
//! outbound payment-session call; the machine itself performs no I/O.

use serde::{Deserialize, Serialize};

use crate::types::Email;

/// The steps of the checkout flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    CustomerInfo,
    Delivery,
    Payment,
    Review,
    Complete,
}

impl CheckoutStep {
    /// The following step, or `None` from the terminal step.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::CustomerInfo => Some(Self::Delivery),
            Self::Delivery => Some(Self::Payment),
            Self::Payment => Some(Self::Review),
            Self::Review => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// The preceding step, or `None` from the first step. `Complete` has no
    /// way back; the flow restarts instead.
    #[must_use]
    pub const fn back(self) -> Option<Self> {
        match self {
            Self::CustomerInfo | Self::Complete => None,
            Self::Delivery => Some(Self::CustomerInfo),
            Self::Payment => Some(Self::Delivery),
            Self::Review => Some(Self::Payment),
        }
    }
}

/// How the customer will pay. Stripe's hosted page collects the actual
/// details; this is only the choice made on the payment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
}

/// Fields accumulated across the checkout steps. Everything is optional
/// until the step that requires it validates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    // Customer info step
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    // Delivery step
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    // Payment step
    pub payment_method: Option<PaymentMethod>,
}

/// A single failed field validation, named for the client form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn required(field: &'static str) -> Self {
        Self {
            field,
            message: "is required".to_string(),
        }
    }
}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|s| s.trim().is_empty())
}

impl CheckoutForm {
    fn validate_customer_info(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if is_blank(self.first_name.as_ref()) {
            errors.push(FieldError::required("first_name"));
        }
        if is_blank(self.last_name.as_ref()) {
            errors.push(FieldError::required("last_name"));
        }
        match self.email.as_deref() {
            None => errors.push(FieldError::required("email")),
            Some(raw) => {
                if let Err(e) = Email::parse(raw.trim()) {
                    errors.push(FieldError {
                        field: "email",
                        message: e.to_string(),
                    });
                }
            }
        }
        errors
    }

    fn validate_delivery(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if is_blank(self.address.as_ref()) {
            errors.push(FieldError::required("address"));
        }
        if is_blank(self.city.as_ref()) {
            errors.push(FieldError::required("city"));
        }
        if is_blank(self.postal_code.as_ref()) {
            errors.push(FieldError::required("postal_code"));
        }
        errors
    }

    fn validate_payment(&self) -> Vec<FieldError> {
        if self.payment_method.is_none() {
            vec![FieldError::required("payment_method")]
        } else {
            Vec::new()
        }
    }
}

/// The checkout flow state carried in the customer's session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutState {
    pub step: CheckoutStep,
    pub form: CheckoutForm,
}

impl CheckoutState {
    /// A fresh flow at the first step with an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the current step against the accumulated form and move
    /// forward one step.
    ///
    /// The review step validates the cart instead of form fields, so the
    /// caller passes whether the cart is empty. Advancing from `Complete` is
    /// a no-op that reports the terminal step.
    ///
    /// # Errors
    ///
    /// Returns the field errors that block the current step.
    pub fn advance(&mut self, cart_is_empty: bool) -> Result<CheckoutStep, Vec<FieldError>> {
        let errors = match self.step {
            CheckoutStep::CustomerInfo => self.form.validate_customer_info(),
            CheckoutStep::Delivery => self.form.validate_delivery(),
            CheckoutStep::Payment => self.form.validate_payment(),
            CheckoutStep::Review => {
                if cart_is_empty {
                    vec![FieldError {
                        field: "cart",
                        message: "cart is empty".to_string(),
                    }]
                } else {
                    Vec::new()
                }
            }
            CheckoutStep::Complete => Vec::new(),
        };

        if !errors.is_empty() {
            return Err(errors);
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Move back one step, keeping all entered fields. At the first step (or
    /// after completion) this is a no-op.
    pub fn step_back(&mut self) -> CheckoutStep {
        if let Some(prev) = self.step.back() {
            self.step = prev;
        }
        self.step
    }
}
