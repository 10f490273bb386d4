//! Warranty Repository
//!
//! Per-unit warranty rows. The UNIQUE (order_item_id, unit_seq) index is
//! the idempotence guard for the provisioner: fan-out inserts go through
//! `INSERT OR IGNORE`, so a retried provisioning run creates nothing new.

use super::{RepoError, RepoResult};
use shared::models::Warranty;
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, order_item_id, unit_seq, product_id, customer_id, purchase_date, expiry_date, status, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Warranty>> {
    let warranty = sqlx::query_as::<_, Warranty>(&format!(
        "SELECT {COLUMNS} FROM warranty WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(warranty)
}

/// Idempotent insert keyed on (order_item_id, unit_seq). Returns whether
/// a row was actually written.
pub async fn insert_unit(pool: &SqlitePool, warranty: &Warranty) -> RepoResult<bool> {
    let rows = sqlx::query(
        "INSERT OR IGNORE INTO warranty (id, order_item_id, unit_seq, product_id, customer_id, purchase_date, expiry_date, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(warranty.id)
    .bind(warranty.order_item_id)
    .bind(warranty.unit_seq)
    .bind(warranty.product_id)
    .bind(warranty.customer_id)
    .bind(warranty.purchase_date)
    .bind(warranty.expiry_date)
    .bind(warranty.status.as_str())
    .bind(warranty.created_at)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn list_by_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<Vec<Warranty>> {
    let warranties = sqlx::query_as::<_, Warranty>(&format!(
        "SELECT {COLUMNS} FROM warranty WHERE customer_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    Ok(warranties)
}

/// Warranties of every line item of an order
pub async fn list_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<Warranty>> {
    let warranties = sqlx::query_as::<_, Warranty>(&format!(
        "SELECT w.{} FROM warranty w \
         JOIN order_item oi ON oi.id = w.order_item_id \
         WHERE oi.order_id = ? ORDER BY w.order_item_id, w.unit_seq",
        COLUMNS.replace(", ", ", w.")
    ))
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(warranties)
}

/// Delete a warranty record; only EXPIRED rows may be removed
pub async fn delete_expired(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM warranty WHERE id = ? AND status = 'EXPIRED'")
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return match find_by_id(pool, id).await? {
            Some(existing) => Err(RepoError::Conflict(existing.status.as_str().to_string())),
            None => Err(RepoError::NotFound(format!("Warranty {id} not found"))),
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_customer, seed_product, test_pool};
    use shared::models::WarrantyStatus;
    use sqlx::SqlitePool;

    async fn seed_order_item(pool: &SqlitePool, customer_id: i64, product_id: i64) -> i64 {
        let order_id = shared::util::snowflake_id();
        let item_id = shared::util::snowflake_id();
        let now = shared::util::now_millis();
        sqlx::query(
            "INSERT INTO orders (id, customer_id, total_amount, discount_amount, payable_amount, payment_method, status, created_at, updated_at) VALUES (?, ?, 1000, 0, 1000, 'COD', 'COMPLETED', ?, ?)",
        )
        .bind(order_id)
        .bind(customer_id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO order_item (id, order_id, product_id, quantity, unit_price) VALUES (?, ?, ?, 2, 500)",
        )
        .bind(item_id)
        .bind(order_id)
        .bind(product_id)
        .execute(pool)
        .await
        .unwrap();
        item_id
    }

    fn unit(order_item_id: i64, unit_seq: i64, product_id: i64, customer_id: i64) -> Warranty {
        let now = shared::util::now_millis();
        Warranty {
            id: shared::util::snowflake_id(),
            order_item_id,
            unit_seq,
            product_id,
            customer_id,
            purchase_date: now,
            expiry_date: now + 1_000,
            status: WarrantyStatus::Active,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_unit_is_ignored() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let product = seed_product(&pool, "Kettle", 1000, 12, 5).await;
        let item = seed_order_item(&pool, customer, product).await;

        assert!(insert_unit(&pool, &unit(item, 1, product, customer)).await.unwrap());
        // Same (item, seq) pair with a fresh id: silently skipped
        assert!(!insert_unit(&pool, &unit(item, 1, product, customer)).await.unwrap());
        assert!(insert_unit(&pool, &unit(item, 2, product, customer)).await.unwrap());

        assert_eq!(list_by_customer(&pool, customer).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn only_expired_rows_can_be_deleted() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let product = seed_product(&pool, "Kettle", 1000, 12, 5).await;
        let item = seed_order_item(&pool, customer, product).await;

        let active = unit(item, 1, product, customer);
        insert_unit(&pool, &active).await.unwrap();

        let err = delete_expired(&pool, active.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(ref s) if s == "ACTIVE"));

        let mut expired = unit(item, 2, product, customer);
        expired.status = WarrantyStatus::Expired;
        insert_unit(&pool, &expired).await.unwrap();
        delete_expired(&pool, expired.id).await.unwrap();
        assert!(find_by_id(&pool, expired.id).await.unwrap().is_none());
    }
}
