//! Product Model (catalog collaborator)

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Catalog price in cents (checkout snapshots its own unit price)
    pub price: i64,
    /// Warranty duration in months; 0 = no warranty provisioned
    pub warranty_months: i64,
    pub is_active: bool,
    /// Unix millis
    pub created_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    /// Price in cents
    pub price: i64,
    #[serde(default)]
    pub warranty_months: i64,
    /// Initial available quantity in the inventory ledger
    #[serde(default)]
    pub initial_stock: i64,
}

/// Inventory adjustment payload (absolute set)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpdate {
    pub quantity: i64,
}

/// Inventory ledger view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventoryRecord {
    pub product_id: i64,
    /// Available quantity; never negative
    pub quantity: i64,
    /// Unix millis
    pub updated_at: i64,
}
