//! Unified error codes for the store back-office
//!
//! Error codes are shared between the server and its clients and are
//! organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product / stock errors
//! - 7xxx: Warranty errors
//! - 8xxx: Customer errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is already completed
    OrderAlreadyCompleted = 4002,
    /// Order is already cancelled
    OrderAlreadyCancelled = 4003,
    /// Order cannot be cancelled in its current status
    OrderNotCancellable = 4004,
    /// Order has no line items
    OrderEmpty = 4005,
    /// Requested status transition is not allowed
    OrderInvalidTransition = 4006,

    // ==================== 5xxx: Payment ====================
    /// Payment failed
    PaymentFailed = 5001,
    /// Payment method is not valid for this operation
    PaymentInvalidMethod = 5002,
    /// Card details failed plausibility checks
    PaymentInvalidCard = 5003,
    /// Upstream payment provider unreachable
    PaymentProviderUnavailable = 5004,
    /// Payment already reached a terminal SUCCESS state
    PaymentAlreadyFinal = 5005,
    /// Payment record not found
    PaymentNotFound = 5006,

    // ==================== 6xxx: Product / Stock ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Insufficient stock for the requested quantity
    InsufficientStock = 6002,
    /// Product price is invalid
    ProductInvalidPrice = 6003,

    // ==================== 7xxx: Warranty ====================
    /// Warranty not found
    WarrantyNotFound = 7001,
    /// Warranty can only be deleted once expired
    WarrantyNotExpired = 7002,

    // ==================== 8xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 8001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Network error (transient)
    NetworkError = 9004,
    /// Timeout error (transient)
    TimeoutError = 9005,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",

            Self::OrderNotFound => "Order not found",
            Self::OrderAlreadyCompleted => "Order already completed",
            Self::OrderAlreadyCancelled => "Order already cancelled",
            Self::OrderNotCancellable => "Order cannot be cancelled in its current status",
            Self::OrderEmpty => "Order has no line items",
            Self::OrderInvalidTransition => "Status transition not allowed",

            Self::PaymentFailed => "Payment failed",
            Self::PaymentInvalidMethod => "Invalid payment method",
            Self::PaymentInvalidCard => "Invalid card details",
            Self::PaymentProviderUnavailable => "Payment provider unavailable",
            Self::PaymentAlreadyFinal => "Payment already succeeded",
            Self::PaymentNotFound => "Payment record not found",

            Self::ProductNotFound => "Product not found",
            Self::InsufficientStock => "Insufficient stock",
            Self::ProductInvalidPrice => "Invalid product price",

            Self::WarrantyNotFound => "Warranty not found",
            Self::WarrantyNotExpired => "Warranty is not expired",

            Self::CustomerNotFound => "Customer not found",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
            Self::NetworkError => "Network error",
            Self::TimeoutError => "Operation timed out",
        }
    }

    /// Numeric value of the code
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_u16(), self.message())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when deserializing an unknown error code value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // 0xxx: General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // 4xxx: Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyCompleted),
            4003 => Ok(ErrorCode::OrderAlreadyCancelled),
            4004 => Ok(ErrorCode::OrderNotCancellable),
            4005 => Ok(ErrorCode::OrderEmpty),
            4006 => Ok(ErrorCode::OrderInvalidTransition),

            // 5xxx: Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentInvalidMethod),
            5003 => Ok(ErrorCode::PaymentInvalidCard),
            5004 => Ok(ErrorCode::PaymentProviderUnavailable),
            5005 => Ok(ErrorCode::PaymentAlreadyFinal),
            5006 => Ok(ErrorCode::PaymentNotFound),

            // 6xxx: Product / Stock
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::InsufficientStock),
            6003 => Ok(ErrorCode::ProductInvalidPrice),

            // 7xxx: Warranty
            7001 => Ok(ErrorCode::WarrantyNotFound),
            7002 => Ok(ErrorCode::WarrantyNotExpired),

            // 8xxx: Customer
            8001 => Ok(ErrorCode::CustomerNotFound),

            // 9xxx: System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::NetworkError),
            9005 => Ok(ErrorCode::TimeoutError),

            other => Err(InvalidErrorCode(other)),
        }
    }
}
