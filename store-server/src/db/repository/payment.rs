//! Payment Ledger Repository
//!
//! Append-oriented ledger of payment attempts across all channels. A
//! transaction's `reference` is the idempotence key for provider
//! callbacks, and SUCCESS is sticky: once a row has succeeded no
//! callback may rewrite it.

use super::{RepoError, RepoResult};
use shared::models::{PaymentStatus, PaymentTransaction};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, order_id, method, amount, status, provider, reference, qr_payload, channel_info, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<PaymentTransaction>> {
    let txn = sqlx::query_as::<_, PaymentTransaction>(&format!(
        "SELECT {COLUMNS} FROM payment_transaction WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(txn)
}

pub async fn find_by_reference(
    pool: &SqlitePool,
    reference: &str,
) -> RepoResult<Option<PaymentTransaction>> {
    let txn = sqlx::query_as::<_, PaymentTransaction>(&format!(
        "SELECT {COLUMNS} FROM payment_transaction WHERE reference = ?"
    ))
    .bind(reference)
    .fetch_optional(pool)
    .await?;
    Ok(txn)
}

/// Append a ledger row. `reference` collisions surface as `Duplicate`
/// via the unique index.
pub async fn insert(pool: &SqlitePool, txn: &PaymentTransaction) -> RepoResult<PaymentTransaction> {
    sqlx::query(
        "INSERT INTO payment_transaction (id, order_id, method, amount, status, provider, reference, qr_payload, channel_info, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(txn.id)
    .bind(txn.order_id)
    .bind(txn.method.as_str())
    .bind(txn.amount)
    .bind(txn.status.as_str())
    .bind(&txn.provider)
    .bind(&txn.reference)
    .bind(&txn.qr_payload)
    .bind(&txn.channel_info)
    .bind(txn.created_at)
    .bind(txn.updated_at)
    .execute(pool)
    .await?;

    find_by_id(pool, txn.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to record payment transaction".into()))
}

/// Apply a provider callback by reference.
///
/// The guarded update skips rows already in SUCCESS, so a late or
/// duplicated callback can never downgrade a settled payment. Returns
/// `Conflict` carrying the current status in that case, `NotFound` when
/// the reference was never issued.
pub async fn update_status_by_reference(
    pool: &SqlitePool,
    reference: &str,
    status: PaymentStatus,
    channel_info: Option<&str>,
) -> RepoResult<PaymentTransaction> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE payment_transaction SET status = ?, channel_info = COALESCE(?, channel_info), updated_at = ? WHERE reference = ? AND status != 'SUCCESS'",
    )
    .bind(status.as_str())
    .bind(channel_info)
    .bind(now)
    .bind(reference)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return match find_by_reference(pool, reference).await? {
            Some(existing) => Err(RepoError::Conflict(existing.status.as_str().to_string())),
            None => Err(RepoError::NotFound(format!(
                "Payment reference {reference} not found"
            ))),
        };
    }

    find_by_reference(pool, reference)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payment reference {reference} not found")))
}

/// Latest ledger row explicitly linked to the order
pub async fn latest_by_order(
    pool: &SqlitePool,
    order_id: i64,
) -> RepoResult<Option<PaymentTransaction>> {
    let txn = sqlx::query_as::<_, PaymentTransaction>(&format!(
        "SELECT {COLUMNS} FROM payment_transaction WHERE order_id = ? ORDER BY created_at DESC, id DESC LIMIT 1"
    ))
    .bind(order_id)
    .fetch_optional(pool)
    .await?;
    Ok(txn)
}

/// Full ledger history for an order, newest first
pub async fn list_by_order(
    pool: &SqlitePool,
    order_id: i64,
) -> RepoResult<Vec<PaymentTransaction>> {
    let txns = sqlx::query_as::<_, PaymentTransaction>(&format!(
        "SELECT {COLUMNS} FROM payment_transaction WHERE order_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(txns)
}

/// Heuristic candidate for an order with no linked ledger row: same
/// method, exact amount, created within `window_millis` of the order,
/// closest in time wins.
pub async fn closest_match(
    pool: &SqlitePool,
    method: &str,
    amount: i64,
    order_created_at: i64,
    window_millis: i64,
) -> RepoResult<Option<PaymentTransaction>> {
    let txn = sqlx::query_as::<_, PaymentTransaction>(&format!(
        "SELECT {COLUMNS} FROM payment_transaction \
         WHERE order_id IS NULL AND method = ? AND amount = ? \
           AND created_at BETWEEN ? AND ? \
         ORDER BY ABS(created_at - ?) ASC, id ASC LIMIT 1"
    ))
    .bind(method)
    .bind(amount)
    .bind(order_created_at - window_millis)
    .bind(order_created_at + window_millis)
    .bind(order_created_at)
    .fetch_optional(pool)
    .await?;
    Ok(txn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use shared::models::PaymentMethod;

    fn ledger_row(
        order_id: Option<i64>,
        method: PaymentMethod,
        amount: i64,
        status: PaymentStatus,
        reference: &str,
        created_at: i64,
    ) -> PaymentTransaction {
        PaymentTransaction {
            id: shared::util::snowflake_id(),
            order_id,
            method,
            amount,
            status,
            provider: "test-provider".into(),
            reference: reference.to_string(),
            qr_payload: None,
            channel_info: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn callback_updates_pending_row() {
        let (_dir, pool) = test_pool().await;
        let row = ledger_row(None, PaymentMethod::Card, 3000, PaymentStatus::Pending, "REF-1", 1000);
        insert(&pool, &row).await.unwrap();

        let updated = update_status_by_reference(&pool, "REF-1", PaymentStatus::Success, Some("auth=ok"))
            .await
            .unwrap();
        assert_eq!(updated.status, PaymentStatus::Success);
        assert_eq!(updated.channel_info.as_deref(), Some("auth=ok"));
    }

    #[tokio::test]
    async fn success_is_never_overwritten() {
        let (_dir, pool) = test_pool().await;
        let row = ledger_row(None, PaymentMethod::Card, 3000, PaymentStatus::Success, "REF-2", 1000);
        insert(&pool, &row).await.unwrap();

        let err = update_status_by_reference(&pool, "REF-2", PaymentStatus::Failed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(ref s) if s == "SUCCESS"));

        let still = find_by_reference(&pool, "REF-2").await.unwrap().unwrap();
        assert_eq!(still.status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn unknown_reference_is_not_found() {
        let (_dir, pool) = test_pool().await;
        let err = update_status_by_reference(&pool, "NO-SUCH", PaymentStatus::Success, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_reference_is_rejected() {
        let (_dir, pool) = test_pool().await;
        let a = ledger_row(None, PaymentMethod::QrTransfer, 500, PaymentStatus::Pending, "REF-3", 1000);
        insert(&pool, &a).await.unwrap();

        let b = ledger_row(None, PaymentMethod::QrTransfer, 700, PaymentStatus::Pending, "REF-3", 2000);
        let err = insert(&pool, &b).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn closest_match_prefers_nearest_in_time() {
        let (_dir, pool) = test_pool().await;
        let far = ledger_row(None, PaymentMethod::Card, 3000, PaymentStatus::Success, "REF-FAR", 1_000);
        let near = ledger_row(None, PaymentMethod::Card, 3000, PaymentStatus::Success, "REF-NEAR", 9_000);
        insert(&pool, &far).await.unwrap();
        insert(&pool, &near).await.unwrap();

        let hit = closest_match(&pool, "CARD", 3000, 10_000, 60_000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.reference, "REF-NEAR");
    }

    #[tokio::test]
    async fn closest_match_requires_exact_amount_and_method() {
        let (_dir, pool) = test_pool().await;
        let wrong_amount =
            ledger_row(None, PaymentMethod::Card, 2999, PaymentStatus::Success, "REF-A", 10_000);
        let wrong_method =
            ledger_row(None, PaymentMethod::Ewallet, 3000, PaymentStatus::Success, "REF-B", 10_000);
        insert(&pool, &wrong_amount).await.unwrap();
        insert(&pool, &wrong_method).await.unwrap();

        let hit = closest_match(&pool, "CARD", 3000, 10_000, 60_000).await.unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn closest_match_ignores_rows_outside_window() {
        let (_dir, pool) = test_pool().await;
        let stale = ledger_row(None, PaymentMethod::Card, 3000, PaymentStatus::Success, "REF-OLD", 1_000);
        insert(&pool, &stale).await.unwrap();

        let hit = closest_match(&pool, "CARD", 3000, 500_000, 60_000).await.unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn closest_match_skips_linked_rows() {
        let (_dir, pool) = test_pool().await;
        let linked = ledger_row(Some(42), PaymentMethod::Card, 3000, PaymentStatus::Success, "REF-L", 10_000);
        insert(&pool, &linked).await.unwrap();

        let hit = closest_match(&pool, "CARD", 3000, 10_000, 60_000).await.unwrap();
        assert!(hit.is_none());
    }
}
