//! Stock movements and balances
//!
//! `StockMovement` is the append-only ledger entry, the audit source of
//! truth for every inventory change. `StockBalance` is the mutable per-key
//! projection the backend keeps in lock-step with the ledger.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The cause of a stock movement, with its direction baked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stock_movement_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    PurchaseIn,
    PosSaleOut,
    OnlineOrderOut,
    TransferIn,
    TransferOut,
    ReturnIn,
    DamageOut,
    AdjustmentIn,
    AdjustmentOut,
}

/// Whether a movement adds to or removes from the affected balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    Inbound,
    Outbound,
}

impl MovementType {
    /// Direction is a total function of the type; there is no unknown state.
    pub fn direction(&self) -> MovementDirection {
        match self {
            MovementType::PurchaseIn
            | MovementType::TransferIn
            | MovementType::ReturnIn
            | MovementType::AdjustmentIn => MovementDirection::Inbound,
            MovementType::PosSaleOut
            | MovementType::OnlineOrderOut
            | MovementType::TransferOut
            | MovementType::DamageOut
            | MovementType::AdjustmentOut => MovementDirection::Outbound,
        }
    }

    pub fn is_inbound(&self) -> bool {
        self.direction() == MovementDirection::Inbound
    }

    pub fn is_outbound(&self) -> bool {
        self.direction() == MovementDirection::Outbound
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::PurchaseIn => "purchase_in",
            MovementType::PosSaleOut => "pos_sale_out",
            MovementType::OnlineOrderOut => "online_order_out",
            MovementType::TransferIn => "transfer_in",
            MovementType::TransferOut => "transfer_out",
            MovementType::ReturnIn => "return_in",
            MovementType::DamageOut => "damage_out",
            MovementType::AdjustmentIn => "adjustment_in",
            MovementType::AdjustmentOut => "adjustment_out",
        }
    }
}

/// Immutable ledger entry; created once per applied movement, never updated
/// or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    /// Always stored positive; direction comes from `movement_type`.
    pub quantity: Decimal,
    pub movement_type: MovementType,
    pub source_location_id: Option<Uuid>,
    pub dest_location_id: Option<Uuid>,
    /// External reference (invoice, order, transfer, etc.)
    pub reference: String,
    pub batch_number: String,
    pub expiry_date: Option<NaiveDate>,
    pub unit_cost: Option<Decimal>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

/// Current on-hand quantity for one (location, product, variant, batch) key.
///
/// Created lazily on first movement touching the key and updated in place;
/// never deleted, even at zero quantity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockBalance {
    pub id: Uuid,
    pub location_id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    /// Empty string when the product is not batch-tracked.
    pub batch_number: String,
    pub quantity: Decimal,
    pub expiry_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of checking an outbound movement against the available quantity.
///
/// Policy: outbound movements that would drive a balance negative are
/// rejected, never clamped to zero.
pub fn debit_balance(available: Decimal, requested: Decimal) -> Result<Decimal, Decimal> {
    if requested > available {
        Err(available)
    } else {
        Ok(available - requested)
    }
}

/// Merge a movement-supplied expiry date into a balance row.
///
/// A row without an expiry adopts the supplied date; an existing date is
/// never overwritten by later movements.
pub fn merge_expiry(
    existing: Option<NaiveDate>,
    supplied: Option<NaiveDate>,
) -> Option<NaiveDate> {
    existing.or(supplied)
}
