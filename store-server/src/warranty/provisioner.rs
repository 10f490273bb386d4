//! Warranty Provisioner
//!
//! Fans a completed order out into per-unit warranty rows: a line item
//! with quantity N and a warranted product yields N rows, numbered
//! `unit_seq` 1..=N. The UNIQUE (order_item_id, unit_seq) index plus
//! `INSERT OR IGNORE` makes the whole run idempotent, so a retried
//! status update or a crashed run can simply be re-fired.

use crate::db::repository::{order, warranty, RepoError, RepoResult};
use chrono::{DateTime, Months, Utc};
use shared::models::{Warranty, WarrantyStatus};
use sqlx::SqlitePool;

/// Line items of an order that carry a warranty at all
#[derive(Debug, sqlx::FromRow)]
struct WarrantedItem {
    order_item_id: i64,
    product_id: i64,
    quantity: i64,
    warranty_months: i64,
}

/// Expiry = purchase date + warranty months (calendar months, clamped
/// to the last day where the target month is shorter)
fn expiry_millis(purchase_millis: i64, months: i64) -> RepoResult<i64> {
    let purchase = DateTime::<Utc>::from_timestamp_millis(purchase_millis)
        .ok_or_else(|| RepoError::Validation(format!("invalid purchase date {purchase_millis}")))?;
    let expiry = purchase
        .checked_add_months(Months::new(months as u32))
        .ok_or_else(|| RepoError::Validation(format!("warranty months out of range: {months}")))?;
    Ok(expiry.timestamp_millis())
}

/// Provision warranties for every unit of an order. Returns the number
/// of rows actually created (0 for a fully provisioned order).
pub async fn provision_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<u64> {
    let order = order::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {order_id} not found")))?;

    let items = sqlx::query_as::<_, WarrantedItem>(
        "SELECT oi.id AS order_item_id, oi.product_id, oi.quantity, p.warranty_months \
         FROM order_item oi JOIN product p ON p.id = oi.product_id \
         WHERE oi.order_id = ? AND p.warranty_months > 0",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    let mut created = 0u64;
    for item in &items {
        let expiry = expiry_millis(order.created_at, item.warranty_months)?;
        for unit_seq in 1..=item.quantity {
            let inserted = warranty::insert_unit(
                pool,
                &Warranty {
                    id: shared::util::snowflake_id(),
                    order_item_id: item.order_item_id,
                    unit_seq,
                    product_id: item.product_id,
                    customer_id: order.customer_id,
                    purchase_date: order.created_at,
                    expiry_date: expiry,
                    status: WarrantyStatus::Active,
                    created_at: shared::util::now_millis(),
                },
            )
            .await?;
            if inserted {
                created += 1;
            }
        }
    }

    if created > 0 {
        tracing::info!(order_id, created, "Warranties provisioned");
    }
    Ok(created)
}

/// Fire-and-forget provisioning: the status update that triggered it
/// must not fail or block on warranty work. Failures are logged and the
/// next re-fire of the trigger retries from scratch (idempotent).
pub fn spawn_provisioning(pool: SqlitePool, order_id: i64) {
    tokio::spawn(async move {
        if let Err(e) = provision_for_order(&pool, order_id).await {
            tracing::error!(order_id, error = %e, "Warranty provisioning failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::order;
    use crate::db::test_support::{seed_customer, seed_product, test_pool};
    use shared::models::{CheckoutLine, CheckoutRequest, OrderStatus, PaymentMethod};

    #[tokio::test]
    async fn fans_out_one_row_per_unit() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let warranted = seed_product(&pool, "Kettle", 1000, 12, 10).await;
        let plain = seed_product(&pool, "Sponge", 100, 0, 10).await;

        let created = order::checkout(
            &pool,
            CheckoutRequest {
                customer_id: customer,
                discount_amount: 0,
                payment_method: PaymentMethod::Cod,
                lines: vec![
                    CheckoutLine { product_id: warranted, quantity: 3, unit_price: 1000 },
                    CheckoutLine { product_id: plain, quantity: 2, unit_price: 100 },
                ],
            },
        )
        .await
        .unwrap();
        order::update_status(&pool, created.id, OrderStatus::Shipping).await.unwrap();
        order::update_status(&pool, created.id, OrderStatus::Completed).await.unwrap();

        let count = provision_for_order(&pool, created.id).await.unwrap();
        assert_eq!(count, 3);

        let rows = crate::db::repository::warranty::list_by_order(&pool, created.id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        // Unit sequence is 1-based and dense
        let seqs: Vec<i64> = rows.iter().map(|w| w.unit_seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        for row in &rows {
            assert_eq!(row.product_id, warranted);
            assert_eq!(row.customer_id, customer);
            assert_eq!(row.purchase_date, created.created_at);
            assert_eq!(row.status, WarrantyStatus::Active);
            assert!(row.expiry_date > row.purchase_date);
        }
    }

    #[tokio::test]
    async fn refire_creates_nothing_new() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let product = seed_product(&pool, "Kettle", 1000, 24, 10).await;

        let created = order::checkout(
            &pool,
            CheckoutRequest {
                customer_id: customer,
                discount_amount: 0,
                payment_method: PaymentMethod::Cod,
                lines: vec![CheckoutLine { product_id: product, quantity: 2, unit_price: 1000 }],
            },
        )
        .await
        .unwrap();

        assert_eq!(provision_for_order(&pool, created.id).await.unwrap(), 2);
        // Retried trigger: same order, zero new rows
        assert_eq!(provision_for_order(&pool, created.id).await.unwrap(), 0);
        assert_eq!(
            crate::db::repository::warranty::list_by_order(&pool, created.id)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn expiry_adds_calendar_months() {
        // 2024-01-15T00:00:00Z + 12 months = 2025-01-15T00:00:00Z
        let purchase = 1_705_276_800_000i64;
        let expiry = expiry_millis(purchase, 12).unwrap();
        let delta_days = (expiry - purchase) / 86_400_000;
        assert_eq!(delta_days, 366); // 2024 is a leap year
    }
}
