//! Error categories - classification of error codes by domain

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// High-level classification of an [`ErrorCode`], derived from its
/// numeric range. Used by clients for coarse-grained handling
/// (e.g. "any Payment error shows the payment panel").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Order,
    Payment,
    Product,
    Warranty,
    Customer,
    System,
}

impl ErrorCategory {
    /// Derive the category from an error code's numeric range
    pub fn of(code: ErrorCode) -> Self {
        match code.as_u16() {
            0..=999 => Self::General,
            4000..=4999 => Self::Order,
            5000..=5999 => Self::Payment,
            6000..=6999 => Self::Product,
            7000..=7999 => Self::Warranty,
            8000..=8999 => Self::Customer,
            _ => Self::System,
        }
    }

    /// Whether errors in this category are typically transient and the
    /// client may retry the operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::System)
    }
}

impl ErrorCode {
    /// Category of this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::of(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_map_to_categories() {
        assert_eq!(ErrorCode::ValidationFailed.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::OrderNotCancellable.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::PaymentFailed.category(), ErrorCategory::Payment);
        assert_eq!(ErrorCode::InsufficientStock.category(), ErrorCategory::Product);
        assert_eq!(ErrorCode::WarrantyNotExpired.category(), ErrorCategory::Warranty);
        assert_eq!(ErrorCode::CustomerNotFound.category(), ErrorCategory::Customer);
        assert_eq!(ErrorCode::TimeoutError.category(), ErrorCategory::System);
    }
}
