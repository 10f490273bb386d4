//! Inventory Ledger Repository
//!
//! One row per product holding the available quantity. The
//! check-then-decrement used by checkout lives in `order::checkout` so it
//! shares the order's transaction; this module covers standalone reads
//! and administrative adjustments.

use super::{RepoError, RepoResult};
use shared::models::InventoryRecord;
use sqlx::SqlitePool;

pub async fn find_by_product(
    pool: &SqlitePool,
    product_id: i64,
) -> RepoResult<Option<InventoryRecord>> {
    let record = sqlx::query_as::<_, InventoryRecord>(
        "SELECT product_id, quantity, updated_at FROM inventory WHERE product_id = ?",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

/// Administrative absolute set of the available quantity
pub async fn set_quantity(
    pool: &SqlitePool,
    product_id: i64,
    quantity: i64,
) -> RepoResult<InventoryRecord> {
    if quantity < 0 {
        return Err(RepoError::Validation(format!(
            "quantity cannot be negative: {quantity}"
        )));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE inventory SET quantity = ?, updated_at = ? WHERE product_id = ?")
        .bind(quantity)
        .bind(now)
        .bind(product_id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Inventory record for product {product_id} not found"
        )));
    }

    find_by_product(pool, product_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Inventory record for product {product_id} not found")))
}
