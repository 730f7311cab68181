//! Stock alerts and their trigger conditions

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kinds of derived stock signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stock_alert_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowStock,
    ExpiringSoon,
    Expired,
    OutOfStock,
}

/// An open or resolved stock alert.
///
/// At most one unresolved alert exists per (product, variant, location,
/// type); resolution is an explicit action, never automatic.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockAlert {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub location_id: Uuid,
    pub alert_type: AlertType,
    pub quantity: Decimal,
    pub expiry_date: Option<NaiveDate>,
    pub is_resolved: bool,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Evaluate which alert types a balance snapshot triggers.
///
/// - `out_of_stock` at zero quantity, `low_stock` when the quantity is
///   positive but at or below the reorder level (never both at once)
/// - `expired` when the expiry date is strictly before today, otherwise
///   `expiring_soon` when it falls within the product's lead window
pub fn triggered_alerts(
    quantity: Decimal,
    reorder_level: Decimal,
    expiry_date: Option<NaiveDate>,
    expiry_alert_days: i32,
    today: NaiveDate,
) -> Vec<AlertType> {
    let mut triggered = Vec::new();

    if quantity <= Decimal::ZERO {
        triggered.push(AlertType::OutOfStock);
    } else if quantity <= reorder_level {
        triggered.push(AlertType::LowStock);
    }

    if let Some(expiry) = expiry_date {
        if expiry < today {
            triggered.push(AlertType::Expired);
        } else if let Some(horizon) = today.checked_add_days(Days::new(expiry_alert_days.max(0) as u64)) {
            if expiry <= horizon {
                triggered.push(AlertType::ExpiringSoon);
            }
        }
    }

    triggered
}
