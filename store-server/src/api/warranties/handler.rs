//! Warranty API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::{RepoError, warranty};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};
use shared::models::Warranty;

/// GET /api/warranties/by-customer/{id} - 客户名下的保修记录
pub async fn list_by_customer(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Warranty>>>> {
    let warranties = warranty::list_by_customer(state.pool(), id).await?;
    Ok(ok(warranties))
}

/// GET /api/warranties/by-order/{id} - 订单名下的保修记录
pub async fn list_by_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Warranty>>>> {
    let warranties = warranty::list_by_order(state.pool(), id).await?;
    Ok(ok(warranties))
}

/// DELETE /api/warranties/{id} - 仅允许删除已过期的保修记录
pub async fn delete_expired(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    match warranty::delete_expired(state.pool(), id).await {
        Ok(()) => Ok(ok(())),
        Err(RepoError::Conflict(current)) => Err(AppError::with_message(
            ErrorCode::WarrantyNotExpired,
            format!("Warranty {id} is {current}; only EXPIRED records can be deleted"),
        )
        .with_detail("current_status", current)),
        Err(RepoError::NotFound(_)) => Err(AppError::with_message(
            ErrorCode::WarrantyNotFound,
            format!("Warranty {id} not found"),
        )),
        Err(e) => Err(e.into()),
    }
}
