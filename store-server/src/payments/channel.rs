//! Payment Channel Abstraction
//!
//! One adapter per tender type. A channel decides what (if anything) is
//! written to the payment ledger at initiation time and how its ledger
//! status is presented to operators.

use crate::core::Config;
use crate::payments::{card::CardChannel, cash::CashChannel, qr::QrChannel, wallet::WalletChannel};
use crate::utils::{AppError, AppResult};
use async_trait::async_trait;
use shared::models::{
    CardDetails, Order, PaymentDisplayStatus, PaymentInitiateResponse, PaymentMethod,
    PaymentStatus,
};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;

/// Channel-specific inputs accompanying an initiation request
#[derive(Debug, Clone, Default)]
pub struct PaymentContext {
    pub card: Option<CardDetails>,
    pub wallet_account: Option<String>,
}

/// A payment tender adapter
#[async_trait]
pub trait PaymentChannel: Send + Sync {
    fn method(&self) -> PaymentMethod;

    /// Run the channel's initiation flow for `order`, writing whatever
    /// ledger rows the channel calls for. Validation errors must surface
    /// before any ledger write.
    async fn initiate(
        &self,
        pool: &SqlitePool,
        order: &Order,
        amount: i64,
        ctx: &PaymentContext,
    ) -> AppResult<PaymentInitiateResponse>;

    /// Presentation of a ledger status for this channel.
    ///
    /// The default is the identity mapping; channels with a display
    /// convention of their own (wallet) override it. The override never
    /// touches the ledger itself.
    fn display_status(&self, ledger: PaymentStatus) -> PaymentDisplayStatus {
        ledger.into()
    }
}

/// Registry of the configured channels, keyed by method
#[derive(Clone)]
pub struct ChannelRegistry {
    channels: HashMap<PaymentMethod, Arc<dyn PaymentChannel>>,
}

impl ChannelRegistry {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        let mut channels: HashMap<PaymentMethod, Arc<dyn PaymentChannel>> = HashMap::new();
        channels.insert(PaymentMethod::Cod, Arc::new(CashChannel::new()));
        channels.insert(
            PaymentMethod::QrTransfer,
            Arc::new(QrChannel::new(
                config.bank_name.clone(),
                config.bank_account.clone(),
            )),
        );
        channels.insert(
            PaymentMethod::Card,
            Arc::new(CardChannel::new(
                client.clone(),
                config.card_gateway_url.clone(),
            )),
        );
        channels.insert(
            PaymentMethod::Ewallet,
            Arc::new(WalletChannel::new(
                client,
                config.wallet_partner_url.clone(),
                config.wallet_partner_key.clone(),
            )),
        );

        Ok(Self { channels })
    }

    pub fn get(&self, method: PaymentMethod) -> AppResult<Arc<dyn PaymentChannel>> {
        self.channels.get(&method).cloned().ok_or_else(|| {
            AppError::with_message(
                crate::utils::ErrorCode::PaymentInvalidMethod,
                format!("No payment channel configured for {}", method.as_str()),
            )
        })
    }
}
