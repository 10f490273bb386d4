//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::PaymentNotFound
            | Self::ProductNotFound
            | Self::WarrantyNotFound
            | Self::CustomerNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::OrderAlreadyCompleted
            | Self::OrderAlreadyCancelled
            | Self::OrderNotCancellable
            | Self::OrderInvalidTransition
            | Self::PaymentAlreadyFinal => StatusCode::CONFLICT,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::PaymentProviderUnavailable
            | Self::NetworkError
            | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_is_client_reportable() {
        // Stock shortfall is a 400-class error, never retried internally
        assert_eq!(
            ErrorCode::InsufficientStock.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn cancel_conflict_is_409() {
        assert_eq!(
            ErrorCode::OrderNotCancellable.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn provider_unreachable_is_503() {
        assert_eq!(
            ErrorCode::PaymentProviderUnavailable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
