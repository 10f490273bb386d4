//! E-Wallet Partner Channel
//!
//! Hands the charge to the wallet partner, who settles asynchronously.
//! The ledger row stays PENDING until the partner's callback, but this
//! channel's display convention shows an accepted handshake as SUCCESS —
//! the partner guarantees settlement once accepted. That override lives
//! only in [`PaymentChannel::display_status`]; the ledger is untouched.

use crate::db::repository::payment;
use crate::payments::channel::{PaymentChannel, PaymentContext};
use crate::utils::{AppError, AppResult, ErrorCode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{
    Order, PaymentDisplayStatus, PaymentInitiateResponse, PaymentMethod, PaymentStatus,
    PaymentTransaction,
};
use sqlx::SqlitePool;

#[derive(Debug, Serialize)]
struct WalletChargeRequest<'a> {
    reference: &'a str,
    /// Amount in cents
    amount: i64,
    wallet_account: &'a str,
}

#[derive(Debug, Deserialize)]
struct WalletChargeResponse {
    accepted: bool,
    partner_ref: Option<String>,
}

pub struct WalletChannel {
    client: reqwest::Client,
    partner_url: String,
    partner_key: String,
}

impl WalletChannel {
    pub fn new(client: reqwest::Client, partner_url: String, partner_key: String) -> Self {
        Self {
            client,
            partner_url,
            partner_key,
        }
    }
}

#[async_trait]
impl PaymentChannel for WalletChannel {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Ewallet
    }

    async fn initiate(
        &self,
        pool: &SqlitePool,
        order: &Order,
        amount: i64,
        ctx: &PaymentContext,
    ) -> AppResult<PaymentInitiateResponse> {
        let account = ctx.wallet_account.as_deref().ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ValidationFailed,
                "wallet_account required for an e-wallet payment",
            )
        })?;

        let reference = format!("WAL-{}", uuid::Uuid::new_v4());
        let request = WalletChargeRequest {
            reference: &reference,
            amount,
            wallet_account: account,
        };

        let outcome = self
            .client
            .post(format!("{}/v1/charge", self.partner_url))
            .header("X-Partner-Key", &self.partner_key)
            .json(&request)
            .send()
            .await;

        let now = shared::util::now_millis();
        let mut row = PaymentTransaction {
            id: shared::util::snowflake_id(),
            order_id: Some(order.id),
            method: PaymentMethod::Ewallet,
            amount,
            status: PaymentStatus::Pending,
            provider: "wallet-partner".into(),
            reference: reference.clone(),
            qr_payload: None,
            channel_info: Some(format!("account={account}")),
            created_at: now,
            updated_at: now,
        };

        let handshake: Option<WalletChargeResponse> = match outcome {
            Ok(resp) => match resp.error_for_status() {
                Ok(resp) => resp.json().await.ok(),
                Err(_) => None,
            },
            Err(_) => None,
        };

        let Some(handshake) = handshake else {
            // The charge may already be in flight partner-side; park it
            payment::insert(pool, &row).await?;
            tracing::warn!(
                order_id = order.id,
                reference = %reference,
                "Wallet partner unreachable, attempt parked as PENDING"
            );
            return Err(AppError::new(ErrorCode::PaymentProviderUnavailable));
        };

        if !handshake.accepted {
            row.status = PaymentStatus::Failed;
            let txn = payment::insert(pool, &row).await?;
            tracing::info!(
                order_id = order.id,
                payment_id = txn.id,
                "Wallet partner rejected the charge"
            );
            return Ok(PaymentInitiateResponse {
                payment_id: Some(txn.id),
                reference: Some(reference),
                status: PaymentDisplayStatus::Failed,
                qr_payload: None,
            });
        }

        if let Some(partner_ref) = &handshake.partner_ref {
            row.channel_info = Some(format!("account={account} partner_ref={partner_ref}"));
        }
        let txn = payment::insert(pool, &row).await?;
        tracing::info!(
            order_id = order.id,
            payment_id = txn.id,
            reference = %reference,
            "Wallet charge accepted, settlement pending partner callback"
        );

        Ok(PaymentInitiateResponse {
            payment_id: Some(txn.id),
            reference: Some(reference),
            // Display convention, not ledger truth
            status: self.display_status(txn.status),
            qr_payload: None,
        })
    }

    /// Accepted-but-unsettled wallet charges read as SUCCESS to operators
    fn display_status(&self, ledger: PaymentStatus) -> PaymentDisplayStatus {
        match ledger {
            PaymentStatus::Pending => PaymentDisplayStatus::Success,
            other => other.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_displays_as_success() {
        let channel = WalletChannel::new(
            reqwest::Client::new(),
            "http://localhost:9402".into(),
            "key".into(),
        );
        assert_eq!(
            channel.display_status(PaymentStatus::Pending),
            PaymentDisplayStatus::Success
        );
        // Terminal statuses pass through untouched
        assert_eq!(
            channel.display_status(PaymentStatus::Failed),
            PaymentDisplayStatus::Failed
        );
        assert_eq!(
            channel.display_status(PaymentStatus::Cancelled),
            PaymentDisplayStatus::Cancelled
        );
    }
}
