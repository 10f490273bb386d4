//! Card Channel
//!
//! Synchronous charge against the card gateway. Card details are
//! validated locally before anything is written or sent: an obviously
//! bad card must not produce ledger noise or a gateway round trip.
//!
//! Only the masked number ever reaches the ledger.

use crate::db::repository::payment;
use crate::payments::channel::{PaymentChannel, PaymentContext};
use crate::utils::{AppError, AppResult, ErrorCode};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{
    CardDetails, Order, PaymentInitiateResponse, PaymentMethod, PaymentStatus, PaymentTransaction,
};
use sqlx::SqlitePool;

#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    reference: &'a str,
    /// Amount in cents
    amount: i64,
    card_number: &'a str,
    holder: &'a str,
    expiry: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    approved: bool,
    auth_code: Option<String>,
}

pub struct CardChannel {
    client: reqwest::Client,
    gateway_url: String,
}

impl CardChannel {
    pub fn new(client: reqwest::Client, gateway_url: String) -> Self {
        Self {
            client,
            gateway_url,
        }
    }
}

fn invalid_card(msg: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::PaymentInvalidCard, msg)
}

/// Plausibility check, not issuer verification: digit count and a
/// non-expired MM/YY date
fn validate_card(card: &CardDetails) -> AppResult<String> {
    let digits: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid_card("card number must contain only digits"));
    }
    if !(12..=19).contains(&digits.len()) {
        return Err(invalid_card(format!(
            "card number length {} is out of range",
            digits.len()
        )));
    }
    if card.holder.trim().is_empty() {
        return Err(invalid_card("card holder must not be empty"));
    }

    let (month, year) = card
        .expiry
        .split_once('/')
        .ok_or_else(|| invalid_card("expiry must be in MM/YY form"))?;
    let month: u32 = month
        .parse()
        .map_err(|_| invalid_card("expiry month is not a number"))?;
    let year: i32 = year
        .parse()
        .map_err(|_| invalid_card("expiry year is not a number"))?;
    if !(1..=12).contains(&month) {
        return Err(invalid_card(format!("expiry month {month} is out of range")));
    }

    let now = Utc::now();
    let full_year = 2000 + year;
    if (full_year, month) < (now.year(), now.month()) {
        return Err(invalid_card(format!("card expired {}", card.expiry)));
    }

    let masked = format!("****{}", &digits[digits.len() - 4..]);
    Ok(masked)
}

#[async_trait]
impl PaymentChannel for CardChannel {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Card
    }

    async fn initiate(
        &self,
        pool: &SqlitePool,
        order: &Order,
        amount: i64,
        ctx: &PaymentContext,
    ) -> AppResult<PaymentInitiateResponse> {
        let card = ctx
            .card
            .as_ref()
            .ok_or_else(|| invalid_card("card details required for a card payment"))?;
        let masked = validate_card(card)?;

        let reference = format!("CARD-{}", uuid::Uuid::new_v4());
        let request = ChargeRequest {
            reference: &reference,
            amount,
            card_number: &card.number,
            holder: &card.holder,
            expiry: &card.expiry,
        };

        let outcome = self
            .client
            .post(format!("{}/charge", self.gateway_url))
            .json(&request)
            .send()
            .await;

        let now = shared::util::now_millis();
        let mut row = PaymentTransaction {
            id: shared::util::snowflake_id(),
            order_id: Some(order.id),
            method: PaymentMethod::Card,
            amount,
            status: PaymentStatus::Pending,
            provider: "card-gateway".into(),
            reference: reference.clone(),
            qr_payload: None,
            channel_info: Some(masked),
            created_at: now,
            updated_at: now,
        };

        let charge = match outcome {
            Ok(resp) => resp.error_for_status().ok(),
            Err(_) => None,
        };

        let Some(resp) = charge else {
            // The charge may or may not have reached the gateway; park
            // the attempt as PENDING so a late callback can settle it
            payment::insert(pool, &row).await?;
            tracing::warn!(
                order_id = order.id,
                reference = %reference,
                "Card gateway unreachable, attempt parked as PENDING"
            );
            return Err(AppError::new(ErrorCode::PaymentProviderUnavailable));
        };

        let charge: ChargeResponse = match resp.json().await {
            Ok(c) => c,
            Err(e) => {
                payment::insert(pool, &row).await?;
                tracing::warn!(
                    order_id = order.id,
                    reference = %reference,
                    error = %e,
                    "Card gateway returned an unreadable body, attempt parked as PENDING"
                );
                return Err(AppError::new(ErrorCode::PaymentProviderUnavailable));
            }
        };

        row.status = if charge.approved {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        };
        if let Some(auth) = &charge.auth_code {
            row.channel_info = Some(format!("{} auth={}", row.channel_info.as_deref().unwrap_or(""), auth));
        }

        let txn = payment::insert(pool, &row).await?;
        tracing::info!(
            order_id = order.id,
            payment_id = txn.id,
            approved = charge.approved,
            "Card charge settled synchronously"
        );

        Ok(PaymentInitiateResponse {
            payment_id: Some(txn.id),
            reference: Some(reference),
            status: txn.status.into(),
            qr_payload: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str, expiry: &str) -> CardDetails {
        CardDetails {
            number: number.into(),
            holder: "A HOLDER".into(),
            expiry: expiry.into(),
        }
    }

    #[test]
    fn valid_card_yields_masked_number() {
        let masked = validate_card(&card("4242 4242 4242 4242", "12/99")).unwrap();
        assert_eq!(masked, "****4242");
    }

    #[test]
    fn non_digits_rejected() {
        let err = validate_card(&card("4242-4242-4242-4242", "12/99")).unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentInvalidCard);
    }

    #[test]
    fn short_number_rejected() {
        assert!(validate_card(&card("12345678901", "12/99")).is_err());
    }

    #[test]
    fn expired_card_rejected() {
        let err = validate_card(&card("4242424242424242", "01/20")).unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentInvalidCard);
    }

    #[test]
    fn malformed_expiry_rejected() {
        assert!(validate_card(&card("4242424242424242", "1299")).is_err());
        assert!(validate_card(&card("4242424242424242", "13/99")).is_err());
    }
}
