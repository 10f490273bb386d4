//! Order Model

use serde::{Deserialize, Serialize};

use super::payment::PaymentMethod;

/// Order status
///
/// Transitions are monotonic (UNPROCESSED → SHIPPING → COMPLETED) with a
/// single side edge UNPROCESSED → CANCELLED. A cancelled or completed
/// order never changes status again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum OrderStatus {
    #[default]
    #[cfg_attr(feature = "db", sqlx(rename = "UNPROCESSED"))]
    Unprocessed,
    #[cfg_attr(feature = "db", sqlx(rename = "SHIPPING"))]
    Shipping,
    #[cfg_attr(feature = "db", sqlx(rename = "COMPLETED"))]
    Completed,
    #[cfg_attr(feature = "db", sqlx(rename = "CANCELLED"))]
    Cancelled,
}

impl OrderStatus {
    /// Position in the monotonic forward chain; CANCELLED is terminal
    /// and outside the chain.
    fn rank(&self) -> u8 {
        match self {
            Self::Unprocessed => 0,
            Self::Shipping => 1,
            Self::Completed => 2,
            Self::Cancelled => u8::MAX,
        }
    }

    /// Whether a transition from `self` to `to` is allowed.
    ///
    /// Forward moves along UNPROCESSED → SHIPPING → COMPLETED are allowed;
    /// CANCELLED is reachable only from UNPROCESSED (the cancel operation).
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        match (self, to) {
            (Self::Unprocessed, Self::Cancelled) => true,
            (_, Self::Cancelled) => false,
            (Self::Cancelled, _) => false,
            (from, to) => to.rank() > from.rank(),
        }
    }

    /// Storage representation (SCREAMING_SNAKE_CASE text column)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unprocessed => "UNPROCESSED",
            Self::Shipping => "SHIPPING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Order entity
///
/// Amounts are integer minor units (cents). Invariant:
/// `payable_amount = total_amount - discount_amount >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Buyer reference (customer directory)
    pub customer_id: i64,
    /// Ordered total in cents
    pub total_amount: i64,
    /// Discount in cents
    pub discount_amount: i64,
    /// Amount actually due in cents (total - discount)
    pub payable_amount: i64,
    /// Declared payment method at checkout
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
}

/// Order line item
///
/// `unit_price` is a snapshot taken at purchase time, never a live join —
/// historical invoices must stay accurate after catalog price changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price in cents at time of purchase
    pub unit_price: i64,
}

/// One requested line of a checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price in cents
    pub unit_price: i64,
}

/// Checkout request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_id: i64,
    #[serde(default)]
    pub discount_amount: i64,
    pub payment_method: PaymentMethod,
    pub lines: Vec<CheckoutLine>,
}

impl CheckoutRequest {
    /// Ordered total in cents (sum of quantity × unit price)
    pub fn total_amount(&self) -> i64 {
        self.lines
            .iter()
            .map(|l| l.quantity * l.unit_price)
            .sum()
    }
}

/// Checkout result returned to the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub order_id: i64,
    pub payable_amount: i64,
    pub status: OrderStatus,
}

/// Admin status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_monotonic() {
        use OrderStatus::*;
        assert!(Unprocessed.can_transition_to(Shipping));
        assert!(Unprocessed.can_transition_to(Completed));
        assert!(Shipping.can_transition_to(Completed));
        assert!(!Shipping.can_transition_to(Unprocessed));
        assert!(!Completed.can_transition_to(Shipping));
    }

    #[test]
    fn cancel_only_from_unprocessed() {
        use OrderStatus::*;
        assert!(Unprocessed.can_transition_to(Cancelled));
        assert!(!Shipping.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Completed));
    }

    #[test]
    fn checkout_total_sums_lines() {
        let req = CheckoutRequest {
            customer_id: 1,
            discount_amount: 0,
            payment_method: PaymentMethod::Card,
            lines: vec![
                CheckoutLine { product_id: 1, quantity: 3, unit_price: 1000 },
                CheckoutLine { product_id: 2, quantity: 1, unit_price: 250 },
            ],
        };
        assert_eq!(req.total_amount(), 3250);
    }
}
