//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::customer;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};
use shared::models::{Customer, CustomerCreate};

/// POST /api/customers - 创建客户
pub async fn create(
    State(state): State<ServerState>,
    Json(data): Json<CustomerCreate>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&data.email, "email", MAX_EMAIL_LEN)?;

    let created = customer::create(state.pool(), data).await?;
    Ok(ok(created))
}

/// GET /api/customers/{id} - 客户详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let found = customer::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::CustomerNotFound,
                format!("Customer {id} not found"),
            )
        })?;
    Ok(ok(found))
}
