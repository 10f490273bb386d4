//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::{RepoError, customer, order};
use crate::notify::invoice::{self, ConfirmationLine};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};
use crate::warranty;
use shared::models::{
    CheckoutRequest, CheckoutResult, Order, OrderLineItem, OrderPaymentView, OrderStatus,
    OrderStatusUpdate,
};

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

/// Order with its line items
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLineItem>,
}

/// Batch payment lookup payload
#[derive(Debug, Deserialize)]
pub struct PaymentStatusBatch {
    pub order_ids: Vec<i64>,
}

#[derive(sqlx::FromRow)]
struct NamedLine {
    name: String,
    quantity: i64,
    unit_price: i64,
}

/// POST /api/orders/checkout - 原子结账
///
/// Stock validation, order creation and inventory decrement happen in
/// one transaction; a confirmation notification is enqueued after the
/// commit (fire-and-forget).
pub async fn checkout(
    State(state): State<ServerState>,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutResult>>> {
    if req.lines.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }

    let buyer = customer::find_by_id(state.pool(), req.customer_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::CustomerNotFound,
                format!("Customer {} not found", req.customer_id),
            )
        })?;

    let created = match order::checkout(state.pool(), req).await {
        Ok(created) => created,
        Err(RepoError::NotFound(msg)) => {
            return Err(AppError::with_message(ErrorCode::ProductNotFound, msg));
        }
        Err(e) => return Err(e.into()),
    };

    // Confirmation document; a dropped notification never fails checkout
    let lines = confirmation_lines(&state, created.id).await;
    state.notify.dispatch(invoice::build_confirmation(
        &state.config.company_name,
        &created,
        &lines,
        buyer.email,
    ));

    Ok(ok(CheckoutResult {
        order_id: created.id,
        payable_amount: created.payable_amount,
        status: created.status,
    }))
}

/// GET /api/orders - 订单列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = order::find_all(state.pool(), query.limit, query.offset).await?;
    Ok(ok(orders))
}

/// GET /api/orders/{id} - 订单详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let found = order::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| order_not_found(id))?;
    let items = order::line_items(state.pool(), id).await?;
    Ok(ok(OrderDetail {
        order: found,
        items,
    }))
}

/// POST /api/orders/{id}/cancel - 取消订单并回补库存
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Order>>> {
    match order::cancel(state.pool(), id).await {
        Ok(cancelled) => Ok(ok(cancelled)),
        Err(RepoError::Conflict(current)) => Err(AppError::with_message(
            ErrorCode::OrderNotCancellable,
            format!("Order {id} is {current}; only UNPROCESSED orders can be cancelled"),
        )
        .with_detail("current_status", current)),
        Err(e) => Err(e.into()),
    }
}

/// PUT /api/orders/{id}/status - 状态流转
///
/// CANCELLED routes through the cancel path so stock restoration is
/// never skipped. Reaching COMPLETED fires warranty provisioning in the
/// background (re-fires are harmless, the provisioner is idempotent)
/// and enqueues the final invoice.
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(update): Json<OrderStatusUpdate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    if update.status == OrderStatus::Cancelled {
        return cancel(State(state), Path(id)).await;
    }

    let updated = match order::update_status(state.pool(), id, update.status).await {
        Ok(updated) => updated,
        Err(RepoError::Conflict(current)) => {
            return Err(AppError::with_message(
                ErrorCode::OrderInvalidTransition,
                format!(
                    "Order {id} cannot move from {current} to {}",
                    update.status.as_str()
                ),
            )
            .with_detail("current_status", current));
        }
        Err(e) => return Err(e.into()),
    };

    if updated.status == OrderStatus::Completed {
        warranty::spawn_provisioning(state.pool().clone(), updated.id);
        dispatch_invoice(&state, &updated).await;
    }

    Ok(ok(updated))
}

/// Enqueue the invoice for a completed order. The payment line is the
/// reconciled view, so a COD order paid on handover reads as SUCCESS.
/// Best effort: a lookup failure logs and skips, never fails the caller.
async fn dispatch_invoice(state: &ServerState, completed: &Order) {
    let view = match state
        .resolver
        .resolve(state.pool(), &state.channels, completed)
        .await
    {
        Ok(view) => view,
        Err(e) => {
            tracing::warn!("Invoice for order {} skipped: {e}", completed.id);
            return;
        }
    };

    let recipient = customer::find_by_id(state.pool(), completed.customer_id)
        .await
        .ok()
        .flatten()
        .and_then(|c| c.email);

    let lines = confirmation_lines(state, completed.id).await;
    state.notify.dispatch(invoice::build_invoice(
        &state.config.company_name,
        completed,
        &lines,
        view.status,
        recipient,
    ));
}

/// Line items joined with their product names, for document rendering
async fn confirmation_lines(state: &ServerState, order_id: i64) -> Vec<ConfirmationLine> {
    sqlx::query_as::<_, NamedLine>(
        "SELECT p.name, oi.quantity, oi.unit_price FROM order_item oi \
         JOIN product p ON p.id = oi.product_id WHERE oi.order_id = ? ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(state.pool())
    .await
    .unwrap_or_default()
    .into_iter()
    .map(|l| ConfirmationLine {
        product_name: l.name,
        quantity: l.quantity,
        unit_price: l.unit_price,
    })
    .collect()
}

/// GET /api/orders/{id}/payment - 订单支付视图
pub async fn payment_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderPaymentView>>> {
    let found = order::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| order_not_found(id))?;
    let view = state
        .resolver
        .resolve(state.pool(), &state.channels, &found)
        .await?;
    Ok(ok(view))
}

/// POST /api/orders/payment-status - 批量支付视图
///
/// One entry per requested id, unknown ids included (sentinel status).
pub async fn payment_status_batch(
    State(state): State<ServerState>,
    Json(batch): Json<PaymentStatusBatch>,
) -> AppResult<Json<ApiResponse<Vec<OrderPaymentView>>>> {
    let views = state
        .resolver
        .resolve_batch(state.pool(), &state.channels, &batch.order_ids)
        .await?;
    Ok(ok(views))
}

fn order_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_customer, seed_product};
    use shared::models::{CheckoutLine, PaymentMethod};

    async fn checkout_cod(state: &ServerState, customer_id: i64, product_id: i64) -> i64 {
        let resp = checkout(
            State(state.clone()),
            Json(CheckoutRequest {
                customer_id,
                discount_amount: 0,
                payment_method: PaymentMethod::Cod,
                lines: vec![CheckoutLine { product_id, quantity: 2, unit_price: 1000 }],
            }),
        )
        .await
        .unwrap();
        resp.0.data.unwrap().order_id
    }

    #[tokio::test]
    async fn completing_an_order_enqueues_the_invoice() {
        let dir = tempfile::tempdir().unwrap();
        let (state, mut rx) = ServerState::for_tests(dir.path().to_str().unwrap()).await;
        let customer = seed_customer(state.pool()).await;
        let product = seed_product(state.pool(), "Kettle", 1000, 0, 5).await;

        let order_id = checkout_cod(&state, customer, product).await;
        let confirmation = rx.recv().await.unwrap();
        assert_eq!(confirmation.order_id, order_id);
        assert!(confirmation.subject.contains("confirmation"));

        update_status(
            State(state.clone()),
            Path(order_id),
            Json(OrderStatusUpdate { status: OrderStatus::Shipping }),
        )
        .await
        .unwrap();
        // Shipping is not a notification trigger
        assert!(rx.try_recv().is_err());

        update_status(
            State(state.clone()),
            Path(order_id),
            Json(OrderStatusUpdate { status: OrderStatus::Completed }),
        )
        .await
        .unwrap();

        let note = rx.recv().await.unwrap();
        assert_eq!(note.order_id, order_id);
        assert!(note.subject.contains("Invoice"));
        assert!(note.body.contains("Kettle x2 @ 10.00"));
        // COD settles on handover: the completed order reads as paid
        assert!(note.body.contains("Payment status: SUCCESS"));
    }
}
