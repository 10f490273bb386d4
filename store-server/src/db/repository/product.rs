//! Product Repository (catalog collaborator)

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, price, warranty_months, is_active, created_at";

pub async fn find_all(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT id, name, price, warranty_months, is_active, created_at FROM product WHERE is_active = 1 ORDER BY name LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM product WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

/// Create a product and its inventory row in one transaction
pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("name cannot be empty".into()));
    }
    if data.price < 0 {
        return Err(RepoError::Validation(format!(
            "price cannot be negative: {}",
            data.price
        )));
    }
    if data.initial_stock < 0 {
        return Err(RepoError::Validation(format!(
            "initial_stock cannot be negative: {}",
            data.initial_stock
        )));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO product (id, name, price, warranty_months, is_active, created_at) VALUES (?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.price)
    .bind(data.warranty_months)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO inventory (product_id, quantity, updated_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(data.initial_stock)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}
