//! 统一错误处理
//!
//! Error codes and the [`AppError`] type live in `shared::error`; this
//! module re-exports them and bridges repository errors into the
//! application error space.
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Order 7"))
//!
//! // 返回成功响应
//! Ok(ok(data))
//! ```

use crate::db::repository::RepoError;
use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Generic repository-to-application error mapping.
///
/// Handlers that need a domain-specific code (e.g. a cancel conflict
/// should surface `OrderNotCancellable`, a callback conflict
/// `PaymentAlreadyFinal`) match on the variant themselves before
/// falling back to `?`.
impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Conflict(msg) => AppError::with_message(
                ErrorCode::AlreadyExists,
                format!("Conflicting state: {msg}"),
            ),
            RepoError::InsufficientStock {
                product_id,
                requested,
                available,
            } => AppError::insufficient_stock(product_id, requested, available),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_maps_to_its_own_code() {
        let err: AppError = RepoError::InsufficientStock {
            product_id: 7,
            requested: 3,
            available: 1,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.details.as_ref().unwrap()["available"], 1);
    }

    #[test]
    fn repo_not_found_keeps_its_message() {
        let err: AppError = RepoError::NotFound("Order 7 not found".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order 7 not found");
    }
}
