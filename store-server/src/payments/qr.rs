//! Bank QR Transfer Channel
//!
//! Builds a renderable transfer payload from the configured receiving
//! account and parks a PENDING ledger row until the bank's callback
//! settles it.

use crate::db::repository::payment;
use crate::payments::channel::{PaymentChannel, PaymentContext};
use crate::utils::AppResult;
use async_trait::async_trait;
use shared::models::{
    Order, PaymentInitiateResponse, PaymentMethod, PaymentStatus, PaymentTransaction,
};
use sqlx::SqlitePool;

pub struct QrChannel {
    bank_name: String,
    bank_account: String,
}

impl QrChannel {
    pub fn new(bank_name: String, bank_account: String) -> Self {
        Self {
            bank_name,
            bank_account,
        }
    }

    /// Pipe-delimited payload the front end renders as a QR code
    fn payload(&self, amount: i64, reference: &str) -> String {
        format!(
            "BANKQR|{}|{}|{}|{}",
            self.bank_name, self.bank_account, amount, reference
        )
    }
}

#[async_trait]
impl PaymentChannel for QrChannel {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::QrTransfer
    }

    async fn initiate(
        &self,
        pool: &SqlitePool,
        order: &Order,
        amount: i64,
        _ctx: &PaymentContext,
    ) -> AppResult<PaymentInitiateResponse> {
        let reference = format!("QR-{}", uuid::Uuid::new_v4());
        let qr_payload = self.payload(amount, &reference);
        let now = shared::util::now_millis();

        let txn = payment::insert(
            pool,
            &PaymentTransaction {
                id: shared::util::snowflake_id(),
                order_id: Some(order.id),
                method: PaymentMethod::QrTransfer,
                amount,
                status: PaymentStatus::Pending,
                provider: "internal-qr".into(),
                reference: reference.clone(),
                qr_payload: Some(qr_payload.clone()),
                channel_info: None,
                created_at: now,
                updated_at: now,
            },
        )
        .await?;

        tracing::info!(
            order_id = order.id,
            payment_id = txn.id,
            reference = %reference,
            "QR transfer initiated, awaiting bank callback"
        );

        Ok(PaymentInitiateResponse {
            payment_id: Some(txn.id),
            reference: Some(reference),
            status: txn.status.into(),
            qr_payload: Some(qr_payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_embeds_account_amount_and_reference() {
        let channel = QrChannel::new("Demo Bank".into(), "1111-2222".into());
        let payload = channel.payload(3000, "QR-abc");
        assert_eq!(payload, "BANKQR|Demo Bank|1111-2222|3000|QR-abc");
    }
}
