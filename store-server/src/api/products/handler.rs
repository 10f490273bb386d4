//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{inventory, product};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};
use shared::models::{InventoryRecord, Product, ProductCreate, StockUpdate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/products - 商品列表 (仅在售)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = product::find_all(state.pool(), query.limit, query.offset).await?;
    Ok(ok(products))
}

/// GET /api/products/{id} - 单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let found = product::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    Ok(ok(found))
}

/// POST /api/products - 创建商品及其库存记录
pub async fn create(
    State(state): State<ServerState>,
    Json(data): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    if data.price < 0 {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("price cannot be negative: {}", data.price),
        ));
    }
    let created = product::create(state.pool(), data).await?;
    Ok(ok(created))
}

/// GET /api/products/{id}/stock - 库存记录
pub async fn get_stock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<InventoryRecord>>> {
    let record = inventory::find_by_product(state.pool(), id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    Ok(ok(record))
}

/// PUT /api/products/{id}/stock - 绝对设置库存数量
pub async fn set_stock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(update): Json<StockUpdate>,
) -> AppResult<Json<ApiResponse<InventoryRecord>>> {
    let record = inventory::set_quantity(state.pool(), id, update.quantity).await?;
    Ok(ok(record))
}

fn product_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
}
