//! Payment Reconciliation Resolver
//!
//! Answers "has order X been paid?" for channels that do not reliably
//! echo the order id. Resolution order:
//!
//! 1. COD orders have no ledger row; the order's own status stands in.
//! 2. The latest ledger row explicitly linked to the order.
//! 3. Heuristic: an unlinked row with the same method, the exact payable
//!    amount, created within the configured window of the order, closest
//!    in time first.
//! 4. The NO_PAYMENT_RECORD sentinel.
//!
//! The result is advisory, for back-office display. It is never an
//! authority for releasing goods or issuing refunds.

use crate::db::repository::{order as order_repo, payment};
use crate::payments::channel::ChannelRegistry;
use crate::utils::AppResult;
use shared::models::{
    Order, OrderPaymentView, OrderStatus, PaymentDisplayStatus, PaymentMethod,
};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct ReconciliationResolver {
    /// Heuristic match window around the order's creation time (millis)
    window_ms: i64,
}

impl ReconciliationResolver {
    pub fn new(window_ms: i64) -> Self {
        Self { window_ms }
    }

    /// Resolve the payment view of a single order
    pub async fn resolve(
        &self,
        pool: &SqlitePool,
        channels: &ChannelRegistry,
        order: &Order,
    ) -> AppResult<OrderPaymentView> {
        if order.payment_method == PaymentMethod::Cod {
            return Ok(OrderPaymentView {
                order_id: order.id,
                status: cod_display(order.status),
                transaction: None,
            });
        }

        if let Some(txn) = payment::latest_by_order(pool, order.id).await? {
            let status = self.display(channels, &txn);
            return Ok(OrderPaymentView {
                order_id: order.id,
                status,
                transaction: Some(txn),
            });
        }

        let candidate = payment::closest_match(
            pool,
            order.payment_method.as_str(),
            order.payable_amount,
            order.created_at,
            self.window_ms,
        )
        .await?;

        match candidate {
            Some(txn) => {
                tracing::debug!(
                    order_id = order.id,
                    payment_id = txn.id,
                    "Heuristic reconciliation match"
                );
                let status = self.display(channels, &txn);
                Ok(OrderPaymentView {
                    order_id: order.id,
                    status,
                    transaction: Some(txn),
                })
            }
            None => Ok(OrderPaymentView {
                order_id: order.id,
                status: PaymentDisplayStatus::NoPaymentRecord,
                transaction: None,
            }),
        }
    }

    /// Batch lookup: the result has exactly one entry per requested id,
    /// in request order; unknown orders get the sentinel.
    pub async fn resolve_batch(
        &self,
        pool: &SqlitePool,
        channels: &ChannelRegistry,
        order_ids: &[i64],
    ) -> AppResult<Vec<OrderPaymentView>> {
        let mut views = Vec::with_capacity(order_ids.len());
        for &order_id in order_ids {
            let view = match order_repo::find_by_id(pool, order_id).await? {
                Some(order) => self.resolve(pool, channels, &order).await?,
                None => OrderPaymentView {
                    order_id,
                    status: PaymentDisplayStatus::NoPaymentRecord,
                    transaction: None,
                },
            };
            views.push(view);
        }
        Ok(views)
    }

    fn display(
        &self,
        channels: &ChannelRegistry,
        txn: &shared::models::PaymentTransaction,
    ) -> PaymentDisplayStatus {
        match channels.get(txn.method) {
            Ok(channel) => channel.display_status(txn.status),
            Err(_) => txn.status.into(),
        }
    }
}

/// COD never writes a ledger row; the order's status is the answer
fn cod_display(status: OrderStatus) -> PaymentDisplayStatus {
    match status {
        OrderStatus::Completed => PaymentDisplayStatus::Success,
        OrderStatus::Cancelled => PaymentDisplayStatus::Cancelled,
        _ => PaymentDisplayStatus::Pending,
    }
}
