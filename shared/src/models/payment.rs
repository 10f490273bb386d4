//! Payment Model
//!
//! Payment records have a lifecycle independent of orders: a transaction
//! can exist before the matching order is resolvable (some channels do not
//! echo the application's order identifier).

use serde::{Deserialize, Serialize};

/// Payment channel tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum PaymentMethod {
    /// Cash on delivery - never writes a ledger row at checkout
    #[cfg_attr(feature = "db", sqlx(rename = "COD"))]
    Cod,
    /// Bank QR transfer - pending until the customer scans and pays
    #[cfg_attr(feature = "db", sqlx(rename = "QR_TRANSFER"))]
    QrTransfer,
    #[cfg_attr(feature = "db", sqlx(rename = "CARD"))]
    Card,
    #[cfg_attr(feature = "db", sqlx(rename = "EWALLET"))]
    Ewallet,
}

impl PaymentMethod {
    /// Storage representation (SCREAMING_SNAKE_CASE text column)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::QrTransfer => "QR_TRANSFER",
            Self::Card => "CARD",
            Self::Ewallet => "EWALLET",
        }
    }
}

/// Ledger status of a payment transaction
///
/// This is the authoritative record. Presentation may differ (see
/// [`PaymentDisplayStatus`]); the override never flows back here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum PaymentStatus {
    #[default]
    #[cfg_attr(feature = "db", sqlx(rename = "PENDING"))]
    Pending,
    #[cfg_attr(feature = "db", sqlx(rename = "SUCCESS"))]
    Success,
    #[cfg_attr(feature = "db", sqlx(rename = "FAILED"))]
    Failed,
    #[cfg_attr(feature = "db", sqlx(rename = "CANCELLED"))]
    Cancelled,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Storage representation (SCREAMING_SNAKE_CASE text column)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Display status of an order's payment
///
/// Superset of [`PaymentStatus`]: adds the NO_PAYMENT_RECORD sentinel used
/// by the batch lookup (every requested order id gets an entry), and is
/// where channel display overrides surface. Advisory for display only -
/// never an authority for releasing goods or issuing refunds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentDisplayStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
    NoPaymentRecord,
}

impl PaymentDisplayStatus {
    /// Display representation (SCREAMING_SNAKE_CASE)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::NoPaymentRecord => "NO_PAYMENT_RECORD",
        }
    }
}

impl From<PaymentStatus> for PaymentDisplayStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Success => Self::Success,
            PaymentStatus::Failed => Self::Failed,
            PaymentStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Payment ledger entry
///
/// `order_id` may be unset or unreliable for some channels; the
/// reconciliation resolver maps such records back to orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentTransaction {
    pub id: i64,
    pub order_id: Option<i64>,
    pub method: PaymentMethod,
    /// Amount in cents
    pub amount: i64,
    pub status: PaymentStatus,
    /// Provider name ("internal-qr", "card-gateway", "wallet-partner", ...)
    pub provider: String,
    /// Provider-specific reference string (unique; callback correlation key)
    pub reference: String,
    /// Renderable QR payload (QR transfer only)
    pub qr_payload: Option<String>,
    /// Serialized channel-specific customer info (masked card, wallet account)
    pub channel_info: Option<String>,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
}

/// Card details submitted for a card payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub holder: String,
    /// Expiry in MM/YY form
    pub expiry: String,
}

/// Payment initiation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitiateRequest {
    pub order_id: i64,
    pub method: PaymentMethod,
    /// Amount in cents
    pub amount: i64,
    /// Card details (CARD only)
    pub card: Option<CardDetails>,
    /// Wallet account identifier (EWALLET only)
    pub wallet_account: Option<String>,
}

/// Payment initiation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitiateResponse {
    /// Ledger row id; None for channels that write nothing at checkout (COD)
    pub payment_id: Option<i64>,
    /// Provider reference string, used by the status callback
    pub reference: Option<String>,
    pub status: PaymentDisplayStatus,
    /// Renderable QR artifact (QR transfer only)
    pub qr_payload: Option<String>,
}

/// Terminal status callback from a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCallbackRequest {
    pub reference: String,
    pub status: PaymentStatus,
}

/// One entry of the (single or batch) order payment lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPaymentView {
    pub order_id: i64,
    pub status: PaymentDisplayStatus,
    /// Matched ledger entry, if any (advisory - heuristic match possible)
    pub transaction: Option<PaymentTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_sentinel_serializes_screaming_snake() {
        let json = serde_json::to_string(&PaymentDisplayStatus::NoPaymentRecord).unwrap();
        assert_eq!(json, "\"NO_PAYMENT_RECORD\"");
    }

    #[test]
    fn terminal_statuses() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Success.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Cancelled.is_terminal());
    }
}
