//! Warranty Model
//!
//! One warranty row per physical unit sold: a line item with quantity N
//! yields N independent rows (each unit may be serviced separately).

use serde::{Deserialize, Serialize};

/// Warranty status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum WarrantyStatus {
    #[default]
    #[cfg_attr(feature = "db", sqlx(rename = "ACTIVE"))]
    Active,
    #[cfg_attr(feature = "db", sqlx(rename = "EXPIRED"))]
    Expired,
    #[cfg_attr(feature = "db", sqlx(rename = "IN_REPAIR"))]
    InRepair,
    #[cfg_attr(feature = "db", sqlx(rename = "CLAIM_REQUESTED"))]
    ClaimRequested,
}

impl WarrantyStatus {
    /// Storage representation (SCREAMING_SNAKE_CASE text column)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::InRepair => "IN_REPAIR",
            Self::ClaimRequested => "CLAIM_REQUESTED",
        }
    }
}

/// Warranty entity
///
/// References exactly one order line item (not the order). `unit_seq`
/// numbers the physical unit within the line (1..=quantity); the pair
/// (order_item_id, unit_seq) is unique - the provisioner's idempotence
/// guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Warranty {
    pub id: i64,
    pub order_item_id: i64,
    /// Physical unit index within the line item (1-based)
    pub unit_seq: i64,
    pub product_id: i64,
    pub customer_id: i64,
    /// Unix millis, copied from the order's creation time
    pub purchase_date: i64,
    /// Unix millis: purchase date + product warranty months
    pub expiry_date: i64,
    pub status: WarrantyStatus,
    /// Unix millis
    pub created_at: i64,
}
