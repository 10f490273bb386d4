//! Order Repository
//!
//! Order Store + Inventory Ledger 的原子结账单元。
//!
//! Checkout either commits the order, its line items, and every stock
//! decrement, or fails with no visible effect — partial fulfillment is
//! never allowed. Cancellation is the mirror operation: status flip and
//! stock restoration in one transaction, valid only from UNPROCESSED.

use super::{RepoError, RepoResult};
use shared::models::{CheckoutRequest, Order, OrderLineItem, OrderStatus};
use sqlx::SqlitePool;

const ORDER_COLUMNS: &str = "id, customer_id, total_amount, discount_amount, payable_amount, payment_method, status, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

pub async fn find_all(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Line items of an order (insertion order)
pub async fn line_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderLineItem>> {
    let items = sqlx::query_as::<_, OrderLineItem>(
        "SELECT id, order_id, product_id, quantity, unit_price FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

fn validate_checkout(req: &CheckoutRequest) -> RepoResult<(i64, i64)> {
    if req.lines.is_empty() {
        return Err(RepoError::Validation("order has no line items".into()));
    }
    if req.discount_amount < 0 {
        return Err(RepoError::Validation(format!(
            "discount cannot be negative: {}",
            req.discount_amount
        )));
    }
    for line in &req.lines {
        if line.quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "quantity must be positive for product {}: {}",
                line.product_id, line.quantity
            )));
        }
        if line.unit_price < 0 {
            return Err(RepoError::Validation(format!(
                "unit price cannot be negative for product {}: {}",
                line.product_id, line.unit_price
            )));
        }
    }
    let total = req.total_amount();
    let payable = total - req.discount_amount;
    if payable < 0 {
        return Err(RepoError::Validation(format!(
            "discount {} exceeds ordered total {}",
            req.discount_amount, total
        )));
    }
    Ok((total, payable))
}

/// Atomic checkout: validate every line against the inventory ledger,
/// insert the order and its line items, decrement stock, commit.
///
/// Any absent product or shortfall aborts the whole unit and reports
/// which product failed. The decrement is conditional
/// (`AND quantity >= ?`) so a concurrent checkout that passed the read
/// check cannot oversell — the loser aborts instead.
pub async fn checkout(pool: &SqlitePool, req: CheckoutRequest) -> RepoResult<Order> {
    let (total, payable) = validate_checkout(&req)?;

    let order_id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    // Validation pass: every line must be satisfiable before any write
    for line in &req.lines {
        let available: Option<i64> =
            sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = ?")
                .bind(line.product_id)
                .fetch_optional(&mut *tx)
                .await?;

        match available {
            None => {
                return Err(RepoError::NotFound(format!(
                    "Product {} has no inventory ledger entry",
                    line.product_id
                )));
            }
            Some(available) if available < line.quantity => {
                return Err(RepoError::InsufficientStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available,
                });
            }
            Some(_) => {}
        }
    }

    sqlx::query(
        "INSERT INTO orders (id, customer_id, total_amount, discount_amount, payable_amount, payment_method, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 'UNPROCESSED', ?, ?)",
    )
    .bind(order_id)
    .bind(req.customer_id)
    .bind(total)
    .bind(req.discount_amount)
    .bind(payable)
    .bind(req.payment_method.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for line in &req.lines {
        sqlx::query(
            "INSERT INTO order_item (id, order_id, product_id, quantity, unit_price) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(shared::util::snowflake_id())
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .execute(&mut *tx)
        .await?;

        // Conditional decrement; zero rows means a concurrent checkout
        // got there first and the whole unit aborts
        let rows = sqlx::query(
            "UPDATE inventory SET quantity = quantity - ?, updated_at = ? WHERE product_id = ? AND quantity >= ?",
        )
        .bind(line.quantity)
        .bind(now)
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;

        if rows.rows_affected() == 0 {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = ?")
                    .bind(line.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(RepoError::InsufficientStock {
                product_id: line.product_id,
                requested: line.quantity,
                available: available.unwrap_or(0),
            });
        }
    }

    tx.commit().await?;

    find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

/// Cancel an order: UNPROCESSED → CANCELLED, restoring every line's
/// quantity to the inventory ledger in the same transaction.
///
/// Returns `Conflict` carrying the current status when the order has
/// already shipped, completed, or been cancelled — stock is left
/// untouched in that case.
pub async fn cancel(pool: &SqlitePool, id: i64) -> RepoResult<Order> {
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }

    // Guarded flip; the status check in SQL makes this safe against a
    // concurrent shipment between the read above and the update
    let rows = sqlx::query(
        "UPDATE orders SET status = 'CANCELLED', updated_at = ? WHERE id = ? AND status = 'UNPROCESSED'",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        // Read the status as of the failed flip, not an earlier snapshot
        let current: OrderStatus =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        return Err(RepoError::Conflict(current.as_str().to_string()));
    }

    let items = sqlx::query_as::<_, OrderLineItem>(
        "SELECT id, order_id, product_id, quantity, unit_price FROM order_item WHERE order_id = ?",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    // Restoration only increments; no oversell race here
    for item in &items {
        sqlx::query(
            "UPDATE inventory SET quantity = quantity + ?, updated_at = ? WHERE product_id = ?",
        )
        .bind(item.quantity)
        .bind(now)
        .bind(item.product_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Monotonic status update (UNPROCESSED → SHIPPING → COMPLETED).
///
/// Re-applying the current status is a no-op success so retried admin
/// calls stay idempotent. CANCELLED is rejected here — cancellation goes
/// through [`cancel`] so stock restoration is never skipped.
pub async fn update_status(pool: &SqlitePool, id: i64, new: OrderStatus) -> RepoResult<Order> {
    if new == OrderStatus::Cancelled {
        return Err(RepoError::Validation(
            "use the cancel operation to cancel an order".into(),
        ));
    }

    let order = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;

    if order.status == new {
        return Ok(order);
    }
    if !order.status.can_transition_to(new) {
        return Err(RepoError::Conflict(order.status.as_str().to_string()));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
        .bind(new.as_str())
        .bind(now)
        .bind(id)
        .bind(order.status.as_str())
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        // Lost an optimistic race; report whatever the status is now
        let current = find_by_id(pool, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;
        return Err(RepoError::Conflict(current.status.as_str().to_string()));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_customer, seed_product, stock_of, test_pool};
    use shared::models::{CheckoutLine, PaymentMethod};

    fn request(customer_id: i64, lines: Vec<CheckoutLine>, discount: i64) -> CheckoutRequest {
        CheckoutRequest {
            customer_id,
            discount_amount: discount,
            payment_method: PaymentMethod::Card,
            lines,
        }
    }

    #[tokio::test]
    async fn checkout_commits_order_and_decrements_stock() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let product = seed_product(&pool, "Kettle", 1000, 12, 5).await;

        let order = checkout(
            &pool,
            request(customer, vec![CheckoutLine { product_id: product, quantity: 3, unit_price: 1000 }], 0),
        )
        .await
        .unwrap();

        assert_eq!(order.total_amount, 3000);
        assert_eq!(order.payable_amount, 3000);
        assert_eq!(order.status, OrderStatus::Unprocessed);
        assert_eq!(stock_of(&pool, product).await, 2);

        let items = line_items(&pool, order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].unit_price, 1000);
    }

    #[tokio::test]
    async fn insufficient_stock_aborts_whole_unit() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let p1 = seed_product(&pool, "Kettle", 1000, 0, 5).await;
        let p2 = seed_product(&pool, "Toaster", 2000, 0, 1).await;

        let err = checkout(
            &pool,
            request(
                customer,
                vec![
                    CheckoutLine { product_id: p1, quantity: 2, unit_price: 1000 },
                    CheckoutLine { product_id: p2, quantity: 3, unit_price: 2000 },
                ],
                0,
            ),
        )
        .await
        .unwrap_err();

        match err {
            RepoError::InsufficientStock { product_id, requested, available } => {
                assert_eq!(product_id, p2);
                assert_eq!(requested, 3);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // No partial fulfillment: the first line's stock is untouched
        assert_eq!(stock_of(&pool, p1).await, 5);
        assert_eq!(stock_of(&pool, p2).await, 1);
        assert!(find_all(&pool, 10, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_checkout_fails_when_stock_is_spent() {
        // Spec example: stock 5, qty 3 at 1000, discount 0 → payable 3000,
        // stock becomes 2; another qty-3 checkout must fail leaving 2.
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let product = seed_product(&pool, "Kettle", 1000, 0, 5).await;

        let line = CheckoutLine { product_id: product, quantity: 3, unit_price: 1000 };
        let first = checkout(&pool, request(customer, vec![line.clone()], 0))
            .await
            .unwrap();
        assert_eq!(first.payable_amount, 3000);
        assert_eq!(stock_of(&pool, product).await, 2);

        let err = checkout(&pool, request(customer, vec![line], 0))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InsufficientStock { available: 2, .. }));
        assert_eq!(stock_of(&pool, product).await, 2);
    }

    #[tokio::test]
    async fn unknown_product_is_reported() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;

        let err = checkout(
            &pool,
            request(customer, vec![CheckoutLine { product_id: 999, quantity: 1, unit_price: 100 }], 0),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn discount_beyond_total_is_rejected() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let product = seed_product(&pool, "Kettle", 1000, 0, 5).await;

        let err = checkout(
            &pool,
            request(customer, vec![CheckoutLine { product_id: product, quantity: 1, unit_price: 1000 }], 1500),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn cancel_restores_stock_exactly() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let product = seed_product(&pool, "Kettle", 1000, 0, 5).await;

        let line = CheckoutLine { product_id: product, quantity: 4, unit_price: 1000 };
        let order = checkout(&pool, request(customer, vec![line.clone()], 0))
            .await
            .unwrap();
        assert_eq!(stock_of(&pool, product).await, 1);

        let cancelled = cancel(&pool, order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(stock_of(&pool, product).await, 5);

        // Round-trip invariant: a fresh checkout sees the original quantity
        let again = checkout(&pool, request(customer, vec![line], 0)).await.unwrap();
        assert_eq!(again.status, OrderStatus::Unprocessed);
        assert_eq!(stock_of(&pool, product).await, 1);
    }

    #[tokio::test]
    async fn cancel_rejected_outside_unprocessed() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let product = seed_product(&pool, "Kettle", 1000, 0, 5).await;

        let order = checkout(
            &pool,
            request(customer, vec![CheckoutLine { product_id: product, quantity: 2, unit_price: 1000 }], 0),
        )
        .await
        .unwrap();

        update_status(&pool, order.id, OrderStatus::Shipping).await.unwrap();

        let err = cancel(&pool, order.id).await.unwrap_err();
        match err {
            RepoError::Conflict(current) => assert_eq!(current, "SHIPPING"),
            other => panic!("expected Conflict, got {other:?}"),
        }
        // Inventory untouched by the failed cancel
        assert_eq!(stock_of(&pool, product).await, 3);

        // The conflict always carries the status at the time of the
        // failed flip, however far the order has moved on
        update_status(&pool, order.id, OrderStatus::Completed).await.unwrap();
        let err = cancel(&pool, order.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(ref s) if s == "COMPLETED"));
    }

    #[tokio::test]
    async fn status_transitions_are_monotonic() {
        let (_dir, pool) = test_pool().await;
        let customer = seed_customer(&pool).await;
        let product = seed_product(&pool, "Kettle", 1000, 0, 5).await;

        let order = checkout(
            &pool,
            request(customer, vec![CheckoutLine { product_id: product, quantity: 1, unit_price: 1000 }], 0),
        )
        .await
        .unwrap();

        let shipped = update_status(&pool, order.id, OrderStatus::Shipping).await.unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipping);

        // Backwards move rejected with the current status
        let err = update_status(&pool, order.id, OrderStatus::Unprocessed).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(ref s) if s == "SHIPPING"));

        let done = update_status(&pool, order.id, OrderStatus::Completed).await.unwrap();
        assert_eq!(done.status, OrderStatus::Completed);

        // Re-applying the terminal status is an idempotent no-op
        let again = update_status(&pool, order.id, OrderStatus::Completed).await.unwrap();
        assert_eq!(again.status, OrderStatus::Completed);
    }
}
