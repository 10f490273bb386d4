//! Shared models and error types for the store back-office.
//!
//! Used by the server and by in-process clients (admin console, tests):
//!
//! - `models`: wire/domain models (orders, payments, warranties, catalog)
//! - `error`: unified error-code system and API response envelope
//! - `util`: timestamps and snowflake ID generation

pub mod error;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
