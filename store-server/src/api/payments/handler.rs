//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::{RepoError, customer, order, payment};
use crate::notify::invoice;
use crate::payments::PaymentContext;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};
use shared::models::{
    OrderStatus, PaymentCallbackRequest, PaymentInitiateRequest, PaymentInitiateResponse,
    PaymentStatus, PaymentTransaction,
};

/// POST /api/payments/initiate - 发起支付
///
/// Dispatches to the channel adapter for the requested method. The
/// amount must match the order's payable amount exactly.
pub async fn initiate(
    State(state): State<ServerState>,
    Json(req): Json<PaymentInitiateRequest>,
) -> AppResult<Json<ApiResponse<PaymentInitiateResponse>>> {
    let target = order::find_by_id(state.pool(), req.order_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OrderNotFound,
                format!("Order {} not found", req.order_id),
            )
        })?;

    if target.status == OrderStatus::Cancelled {
        return Err(AppError::with_message(
            ErrorCode::OrderAlreadyCancelled,
            format!("Order {} is cancelled", target.id),
        ));
    }
    if req.amount != target.payable_amount {
        return Err(AppError::validation(format!(
            "amount {} does not match payable amount {}",
            req.amount, target.payable_amount
        ))
        .with_detail("payable_amount", target.payable_amount));
    }

    let channel = state.channels.get(req.method)?;
    let ctx = PaymentContext {
        card: req.card,
        wallet_account: req.wallet_account,
    };
    let response = channel.initiate(state.pool(), &target, req.amount, &ctx).await?;
    Ok(ok(response))
}

/// POST /api/payments/callback - 渠道回调
///
/// Idempotence key is the reference; a settled (SUCCESS) row is never
/// rewritten, a repeated identical callback is a conflict the provider
/// can safely ignore.
pub async fn callback(
    State(state): State<ServerState>,
    Json(req): Json<PaymentCallbackRequest>,
) -> AppResult<Json<ApiResponse<PaymentTransaction>>> {
    if req.status == PaymentStatus::Pending {
        return Err(AppError::validation(
            "callback status must be terminal (SUCCESS, FAILED or CANCELLED)",
        ));
    }

    match payment::update_status_by_reference(state.pool(), &req.reference, req.status, None).await
    {
        Ok(updated) => {
            if updated.status == PaymentStatus::Success {
                dispatch_receipt(&state, &updated).await;
            }
            Ok(ok(updated))
        }
        Err(RepoError::Conflict(current)) => Err(AppError::with_message(
            ErrorCode::PaymentAlreadyFinal,
            format!("Payment {} is already {current}", req.reference),
        )
        .with_detail("current_status", current)),
        Err(RepoError::NotFound(_)) => Err(AppError::with_message(
            ErrorCode::PaymentNotFound,
            format!("Payment reference {} not found", req.reference),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Enqueue a payment receipt for a settled, order-linked ledger row.
/// Best effort: any lookup hiccup just skips the notification.
async fn dispatch_receipt(state: &ServerState, txn: &PaymentTransaction) {
    let Some(order_id) = txn.order_id else { return };
    let Ok(Some(paid_order)) = order::find_by_id(state.pool(), order_id).await else {
        return;
    };
    let recipient = customer::find_by_id(state.pool(), paid_order.customer_id)
        .await
        .ok()
        .flatten()
        .and_then(|c| c.email);
    state.notify.dispatch(invoice::build_receipt(
        &state.config.company_name,
        &paid_order,
        &txn.reference,
        recipient,
    ));
}

/// GET /api/payments/by-order/{id} - 订单的账本历史 (最新在前)
pub async fn list_by_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<PaymentTransaction>>>> {
    order::find_by_id(state.pool(), id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
    })?;
    let txns = payment::list_by_order(state.pool(), id).await?;
    Ok(ok(txns))
}
