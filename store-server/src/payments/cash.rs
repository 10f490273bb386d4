//! Cash on Delivery Channel
//!
//! COD collects money at the door, so initiation writes nothing to the
//! ledger. The order's own status stands in for the payment at display
//! time (see the reconciliation resolver).

use crate::payments::channel::{PaymentChannel, PaymentContext};
use crate::utils::AppResult;
use async_trait::async_trait;
use shared::models::{
    Order, PaymentDisplayStatus, PaymentInitiateResponse, PaymentMethod,
};
use sqlx::SqlitePool;

pub struct CashChannel;

impl CashChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CashChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentChannel for CashChannel {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Cod
    }

    async fn initiate(
        &self,
        _pool: &SqlitePool,
        order: &Order,
        _amount: i64,
        _ctx: &PaymentContext,
    ) -> AppResult<PaymentInitiateResponse> {
        tracing::debug!(order_id = order.id, "COD checkout, no ledger row written");
        Ok(PaymentInitiateResponse {
            payment_id: None,
            reference: None,
            status: PaymentDisplayStatus::Pending,
            qr_payload: None,
        })
    }
}
