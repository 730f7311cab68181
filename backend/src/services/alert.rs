//! Stock alert service
//!
//! Post-movement evaluation of low-stock / expiring / out-of-stock
//! conditions, plus the read and resolve operations used by dashboards.
//! Evaluation runs inside the movement's transaction; resolution is always
//! an explicit, actor-attributed action.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{triggered_alerts, PartitionKind, StockAlert};
use crate::services::stock::stock_table;

/// Service for reading and resolving stock alerts
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

/// Query filter for alert listings
#[derive(Debug, Default, Deserialize)]
pub struct AlertFilter {
    pub location_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    /// When unset, only open alerts are returned.
    pub include_resolved: Option<bool>,
}

impl AlertService {
    /// Create a new AlertService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List alerts, open ones first, newest first.
    pub async fn list_alerts(&self, filter: AlertFilter) -> AppResult<Vec<StockAlert>> {
        let include_resolved = filter.include_resolved.unwrap_or(false);

        let alerts = sqlx::query_as::<_, StockAlert>(
            r#"
            SELECT id, product_id, variant_id, location_id, alert_type, quantity,
                   expiry_date, is_resolved, resolved_by, resolved_at, created_at
            FROM stock_alerts
            WHERE ($1::uuid IS NULL OR location_id = $1)
              AND ($2::uuid IS NULL OR product_id = $2)
              AND ($3 OR NOT is_resolved)
            ORDER BY is_resolved, created_at DESC
            "#,
        )
        .bind(filter.location_id)
        .bind(filter.product_id)
        .bind(include_resolved)
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    /// Mark an open alert as resolved.
    ///
    /// Alerts never auto-resolve when the triggering condition clears; this
    /// is the only path out of the open state.
    pub async fn resolve_alert(&self, alert_id: Uuid, actor: Uuid) -> AppResult<StockAlert> {
        let alert = sqlx::query_as::<_, StockAlert>(
            r#"
            UPDATE stock_alerts
            SET is_resolved = TRUE, resolved_by = $2, resolved_at = now()
            WHERE id = $1 AND NOT is_resolved
            RETURNING id, product_id, variant_id, location_id, alert_type, quantity,
                      expiry_date, is_resolved, resolved_by, resolved_at, created_at
            "#,
        )
        .bind(alert_id)
        .bind(actor)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Open alert".to_string()))?;

        debug!(alert_id = %alert_id, resolved_by = %actor, "Resolved stock alert");

        Ok(alert)
    }
}

/// Evaluate alert conditions for one (product, variant, location) key.
///
/// Reads the aggregate balance across batches plus the product's thresholds
/// and opens any triggered alerts. De-duplication happens at the database
/// level: the partial unique index over unresolved alerts turns a repeat
/// trigger into a no-op insert.
pub(crate) async fn evaluate(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    location_id: Uuid,
    partition: PartitionKind,
) -> AppResult<()> {
    let thresholds = sqlx::query_as::<_, (Decimal, i32)>(
        "SELECT reorder_level, expiry_alert_days FROM products WHERE id = $1",
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?;

    let Some((reorder_level, expiry_alert_days)) = thresholds else {
        return Ok(());
    };

    let table = stock_table(partition);

    let (quantity, earliest_expiry) = sqlx::query_as::<_, (Decimal, Option<chrono::NaiveDate>)>(
        &format!(
            "SELECT COALESCE(SUM(quantity), 0), MIN(expiry_date) FROM {table} \
             WHERE location_id = $1 AND product_id = $2 \
               AND variant_id IS NOT DISTINCT FROM $3"
        ),
    )
    .bind(location_id)
    .bind(product_id)
    .bind(variant_id)
    .fetch_one(&mut **tx)
    .await?;

    let today = Utc::now().date_naive();

    for alert_type in triggered_alerts(
        quantity,
        reorder_level,
        earliest_expiry,
        expiry_alert_days,
        today,
    ) {
        sqlx::query(
            r#"
            INSERT INTO stock_alerts (product_id, variant_id, location_id, alert_type,
                                      quantity, expiry_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (product_id, variant_id, location_id, alert_type)
                WHERE NOT is_resolved
            DO NOTHING
            "#,
        )
        .bind(product_id)
        .bind(variant_id)
        .bind(location_id)
        .bind(alert_type)
        .bind(quantity)
        .bind(earliest_expiry)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
