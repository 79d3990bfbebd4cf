//! Status enums for orders.
//!
//! The hosted store holds order status as a loose string; it is coerced into
//! [`OrderStatus`] at the read boundary and written back as its snake_case
//! form.

use serde::{Deserialize, Serialize};

/// Lifecycle of a rental order.
///
/// The admin dashboard moves orders forward one step at a time; any
/// non-terminal order can also be cancelled. `Returned` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Payment session completed, order recorded.
    #[default]
    Pending,
    /// Staff confirmed inventory for the rental date.
    Confirmed,
    /// Items are out with the customer.
    OutForDelivery,
    /// Items returned; rental complete.
    Returned,
    /// Order cancelled before completion.
    Cancelled,
}

impl OrderStatus {
    /// Whether the admin panel may move an order from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::OutForDelivery)
                | (Self::OutForDelivery, Self::Returned)
                | (
                    Self::Pending | Self::Confirmed | Self::OutForDelivery,
                    Self::Cancelled
                )
        )
    }

    /// Whether no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Returned | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::OutForDelivery => "out_for_delivery",
            Self::Returned => "returned",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "returned" => Ok(Self::Returned),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::OutForDelivery));
        assert!(OrderStatus::OutForDelivery.can_transition_to(OrderStatus::Returned));
    }

    #[test]
    fn test_no_skipping_steps() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::OutForDelivery));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Returned));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Returned));
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::OutForDelivery.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_frozen() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::OutForDelivery,
            OrderStatus::Returned,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Returned.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
        assert!(OrderStatus::Returned.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::OutForDelivery,
            OrderStatus::Returned,
            OrderStatus::Cancelled,
        ] {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
