//! Products and variants

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A sellable item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    /// Quantity at or below which a low-stock alert opens.
    pub reorder_level: Decimal,
    /// Lead time in days for expiring-soon alerts.
    pub expiry_alert_days: i32,
    pub has_variants: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A size/color combination of a product with its own SKU and barcode
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub sku: String,
    pub barcode: Option<String>,
    pub is_active: bool,
}
