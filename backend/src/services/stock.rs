//! Stock ledger service
//!
//! Central service for all stock changes. Every module that affects
//! inventory (purchase receiving, POS checkout, order fulfillment, returns,
//! transfers, manual corrections) calls `apply_movement` instead of touching
//! balance rows directly. Each application is one atomic transaction: the
//! ledger entry, the balance update and the alert evaluation commit or roll
//! back together.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    debit_balance, merge_expiry, MovementDirection, MovementType, PartitionKind, StockBalance,
    StockMovement,
};
use crate::services::alert;
use shared::{
    validate_positive_quantity, validate_reference, PaginatedResponse, Pagination, PaginationMeta,
};

/// Service owning the movement ledger and the balance partitions
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Input for applying a single stock movement
#[derive(Debug, Clone, Deserialize)]
pub struct RecordMovementInput {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: Decimal,
    pub movement_type: MovementType,
    pub source_location_id: Option<Uuid>,
    pub dest_location_id: Option<Uuid>,
    pub reference: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub unit_cost: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for an inter-location transfer
#[derive(Debug, Deserialize)]
pub struct TransferInput {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: Decimal,
    pub source_location_id: Uuid,
    pub dest_location_id: Uuid,
    pub reference: Option<String>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
}

/// Query filter for ledger listings
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Balance row joined with product details for per-location views
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LocationBalance {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub variant_id: Option<Uuid>,
    pub batch_number: String,
    pub quantity: Decimal,
    pub expiry_date: Option<NaiveDate>,
}

/// Single-key balance lookup parameters
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub location_id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub batch_number: Option<String>,
}

/// Row returned by the upsert-and-lock primitive
#[derive(Debug, FromRow)]
struct LockedBalance {
    id: Uuid,
    quantity: Decimal,
    expiry_date: Option<NaiveDate>,
}

/// Map a partition to its balance table.
pub(crate) fn stock_table(partition: PartitionKind) -> &'static str {
    match partition {
        PartitionKind::Warehouse => "warehouse_stock",
        PartitionKind::Branch => "branch_stock",
    }
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply a single stock movement atomically.
    ///
    /// The ledger entry, the balance change and the alert evaluation are one
    /// unit of work; an insufficient balance rolls all of it back.
    pub async fn apply_movement(
        &self,
        input: RecordMovementInput,
        actor: Uuid,
    ) -> AppResult<StockMovement> {
        let mut tx = self.db.begin().await?;
        let movement = apply_movement_tx(&mut tx, &input, actor).await?;
        tx.commit().await?;

        debug!(
            movement_id = %movement.id,
            movement_type = ?input.movement_type,
            quantity = %input.quantity,
            "Applied stock movement"
        );

        Ok(movement)
    }

    /// Transfer stock between two locations.
    ///
    /// Composes a transfer-out at the source and a transfer-in at the
    /// destination, tied by the same reference, inside one transaction. If
    /// the outbound leg fails sufficiency the inbound leg never runs and
    /// nothing persists. The source batch's expiry date travels with the
    /// stock so the destination keeps alerting on it.
    pub async fn transfer(
        &self,
        input: TransferInput,
        actor: Uuid,
    ) -> AppResult<(StockMovement, StockMovement)> {
        if input.source_location_id == input.dest_location_id {
            return Err(AppError::Validation {
                field: "dest_location_id".to_string(),
                message: "Source and destination must differ".to_string(),
            });
        }

        let reference = input
            .reference
            .clone()
            .unwrap_or_else(|| format!("TRF-{}", Uuid::new_v4()));
        let batch_number = input.batch_number.clone().unwrap_or_default();

        let mut tx = self.db.begin().await?;

        ensure_product_exists(&mut tx, input.product_id, input.variant_id).await?;

        let source_partition = resolve_partition_tx(&mut tx, input.source_location_id).await?;
        let dest_partition = resolve_partition_tx(&mut tx, input.dest_location_id).await?;

        // Take both balance-row locks up front, ordered by location id.
        // Opposing transfers on the same key then queue behind each other
        // instead of deadlocking on locks taken in opposite orders.
        let mut keys = [
            (source_partition, input.source_location_id),
            (dest_partition, input.dest_location_id),
        ];
        keys.sort_by_key(|(_, location_id)| *location_id);

        let mut source_expiry = None;
        for (partition, location_id) in keys {
            let row = lock_balance_row(
                &mut tx,
                partition,
                location_id,
                input.product_id,
                input.variant_id,
                &batch_number,
            )
            .await?;

            if location_id == input.source_location_id {
                source_expiry = row.expiry_date;
            }
        }

        let outbound_input = RecordMovementInput {
            product_id: input.product_id,
            variant_id: input.variant_id,
            quantity: input.quantity,
            movement_type: MovementType::TransferOut,
            source_location_id: Some(input.source_location_id),
            dest_location_id: None,
            reference: Some(reference.clone()),
            batch_number: input.batch_number.clone(),
            expiry_date: source_expiry,
            unit_cost: None,
            notes: input.notes.clone(),
        };
        let inbound_input = RecordMovementInput {
            movement_type: MovementType::TransferIn,
            source_location_id: None,
            dest_location_id: Some(input.dest_location_id),
            ..outbound_input.clone()
        };

        let outbound = apply_movement_tx(&mut tx, &outbound_input, actor).await?;
        let inbound = apply_movement_tx(&mut tx, &inbound_input, actor).await?;
        tx.commit().await?;

        debug!(
            reference = %reference,
            source = %input.source_location_id,
            dest = %input.dest_location_id,
            quantity = %input.quantity,
            "Transferred stock"
        );

        Ok((outbound, inbound))
    }

    /// List ledger entries, newest first, with optional product/location
    /// filters.
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
    ) -> AppResult<PaginatedResponse<StockMovement>> {
        let pagination = Pagination::new(filter.page.unwrap_or(1), filter.per_page.unwrap_or(50));

        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::uuid IS NULL OR source_location_id = $2 OR dest_location_id = $2)
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.location_id)
        .fetch_one(&self.db)
        .await?;

        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, variant_id, quantity, movement_type,
                   source_location_id, dest_location_id, reference, batch_number,
                   expiry_date, unit_cost, notes, created_at, created_by
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::uuid IS NULL OR source_location_id = $2 OR dest_location_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.location_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            pagination: PaginationMeta::new(&pagination, total_items as u64),
            data: movements,
        })
    }

    /// Look up balance rows for one (location, product) key, optionally
    /// narrowed to a variant and batch. Reads are idempotent; missing rows
    /// mean zero on hand.
    pub async fn get_balance(&self, query: BalanceQuery) -> AppResult<Vec<StockBalance>> {
        let partition = self.resolve_partition(query.location_id).await?;

        let balances = sqlx::query_as::<_, StockBalance>(&format!(
            r#"
            SELECT id, location_id, product_id, variant_id, batch_number,
                   quantity, expiry_date, updated_at
            FROM {}
            WHERE location_id = $1 AND product_id = $2
              AND ($3::uuid IS NULL OR variant_id IS NOT DISTINCT FROM $3)
              AND ($4::text IS NULL OR batch_number = $4)
            ORDER BY batch_number
            "#,
            stock_table(partition)
        ))
        .bind(query.location_id)
        .bind(query.product_id)
        .bind(query.variant_id)
        .bind(query.batch_number)
        .fetch_all(&self.db)
        .await?;

        Ok(balances)
    }

    /// All balances held at a location, joined with product details.
    pub async fn list_location_balances(
        &self,
        location_id: Uuid,
    ) -> AppResult<Vec<LocationBalance>> {
        let partition = self.resolve_partition(location_id).await?;

        let balances = sqlx::query_as::<_, LocationBalance>(&format!(
            r#"
            SELECT s.product_id, p.name AS product_name, p.sku,
                   s.variant_id, s.batch_number, s.quantity, s.expiry_date
            FROM {} s
            JOIN products p ON p.id = s.product_id
            WHERE s.location_id = $1
            ORDER BY p.name, s.batch_number
            "#,
            stock_table(partition)
        ))
        .bind(location_id)
        .fetch_all(&self.db)
        .await?;

        Ok(balances)
    }

    /// Resolve which partition a location's balances live in.
    async fn resolve_partition(&self, location_id: Uuid) -> AppResult<PartitionKind> {
        let is_warehouse =
            sqlx::query_scalar::<_, bool>("SELECT is_warehouse FROM locations WHERE id = $1")
                .bind(location_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

        Ok(PartitionKind::resolve(is_warehouse))
    }
}

/// Transactional form of movement application, shared with the transfer
/// coordinator.
pub(crate) async fn apply_movement_tx(
    tx: &mut Transaction<'_, Postgres>,
    input: &RecordMovementInput,
    actor: Uuid,
) -> AppResult<StockMovement> {
    validate_positive_quantity(input.quantity).map_err(|msg| AppError::Validation {
        field: "quantity".to_string(),
        message: msg.to_string(),
    })?;

    let reference = input.reference.clone().unwrap_or_default();
    validate_reference(&reference).map_err(|msg| AppError::Validation {
        field: "reference".to_string(),
        message: msg.to_string(),
    })?;

    let batch_number = input.batch_number.clone().unwrap_or_default();
    let notes = input.notes.clone().unwrap_or_default();

    ensure_product_exists(tx, input.product_id, input.variant_id).await?;

    // Ledger entry first. It is recorded even when the direction-relevant
    // location is absent, so movements can be logged before a location is
    // finalized.
    let movement = sqlx::query_as::<_, StockMovement>(
        r#"
        INSERT INTO stock_movements (
            product_id, variant_id, quantity, movement_type,
            source_location_id, dest_location_id, reference, batch_number,
            expiry_date, unit_cost, notes, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id, product_id, variant_id, quantity, movement_type,
                  source_location_id, dest_location_id, reference, batch_number,
                  expiry_date, unit_cost, notes, created_at, created_by
        "#,
    )
    .bind(input.product_id)
    .bind(input.variant_id)
    .bind(input.quantity)
    .bind(input.movement_type)
    .bind(input.source_location_id)
    .bind(input.dest_location_id)
    .bind(&reference)
    .bind(&batch_number)
    .bind(input.expiry_date)
    .bind(input.unit_cost)
    .bind(&notes)
    .bind(actor)
    .fetch_one(&mut **tx)
    .await?;

    match input.movement_type.direction() {
        MovementDirection::Outbound => {
            if let Some(source_id) = input.source_location_id {
                let partition = resolve_partition_tx(tx, source_id).await?;
                let row = lock_balance_row(
                    tx,
                    partition,
                    source_id,
                    input.product_id,
                    input.variant_id,
                    &batch_number,
                )
                .await?;

                let new_quantity = debit_balance(row.quantity, input.quantity).map_err(
                    |available| AppError::InsufficientStock {
                        requested: input.quantity,
                        available,
                    },
                )?;

                sqlx::query(&format!(
                    "UPDATE {} SET quantity = $1, updated_at = now() WHERE id = $2",
                    stock_table(partition)
                ))
                .bind(new_quantity)
                .bind(row.id)
                .execute(&mut **tx)
                .await?;

                alert::evaluate(tx, input.product_id, input.variant_id, source_id, partition)
                    .await?;
            }
        }
        MovementDirection::Inbound => {
            if let Some(dest_id) = input.dest_location_id {
                let partition = resolve_partition_tx(tx, dest_id).await?;
                let row = lock_balance_row(
                    tx,
                    partition,
                    dest_id,
                    input.product_id,
                    input.variant_id,
                    &batch_number,
                )
                .await?;

                // Record an expiry date on the row if it never had one.
                let expiry = merge_expiry(row.expiry_date, input.expiry_date);

                sqlx::query(&format!(
                    "UPDATE {} SET quantity = quantity + $1, expiry_date = $2, updated_at = now() \
                     WHERE id = $3",
                    stock_table(partition)
                ))
                .bind(input.quantity)
                .bind(expiry)
                .bind(row.id)
                .execute(&mut **tx)
                .await?;

                alert::evaluate(tx, input.product_id, input.variant_id, dest_id, partition)
                    .await?;
            }
        }
    }

    Ok(movement)
}

/// Validate that the product (and, when given, the variant belonging to it)
/// exists before any write.
async fn ensure_product_exists(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    variant_id: Option<Uuid>,
) -> AppResult<()> {
    let product_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(product_id)
            .fetch_one(&mut **tx)
            .await?;

    if !product_exists {
        return Err(AppError::NotFound("Product".to_string()));
    }

    if let Some(variant_id) = variant_id {
        let variant_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_variants WHERE id = $1 AND product_id = $2)",
        )
        .bind(variant_id)
        .bind(product_id)
        .fetch_one(&mut **tx)
        .await?;

        if !variant_exists {
            return Err(AppError::NotFound("Product variant".to_string()));
        }
    }

    Ok(())
}

/// Resolve a location's partition inside an open transaction.
async fn resolve_partition_tx(
    tx: &mut Transaction<'_, Postgres>,
    location_id: Uuid,
) -> AppResult<PartitionKind> {
    let is_warehouse =
        sqlx::query_scalar::<_, bool>("SELECT is_warehouse FROM locations WHERE id = $1")
            .bind(location_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

    Ok(PartitionKind::resolve(is_warehouse))
}

/// Upsert-and-lock primitive for a balance row.
///
/// Creates the row at zero quantity if it does not exist, then takes an
/// exclusive row lock. Concurrent movements on the same key block here until
/// the holding transaction commits or rolls back, which closes the
/// check-then-act race on the sufficiency check.
async fn lock_balance_row(
    tx: &mut Transaction<'_, Postgres>,
    partition: PartitionKind,
    location_id: Uuid,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    batch_number: &str,
) -> AppResult<LockedBalance> {
    let table = stock_table(partition);

    sqlx::query(&format!(
        "INSERT INTO {table} (location_id, product_id, variant_id, batch_number) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (location_id, product_id, variant_id, batch_number) DO NOTHING"
    ))
    .bind(location_id)
    .bind(product_id)
    .bind(variant_id)
    .bind(batch_number)
    .execute(&mut **tx)
    .await?;

    let row = sqlx::query_as::<_, LockedBalance>(&format!(
        "SELECT id, quantity, expiry_date FROM {table} \
         WHERE location_id = $1 AND product_id = $2 \
           AND variant_id IS NOT DISTINCT FROM $3 AND batch_number = $4 \
         FOR UPDATE"
    ))
    .bind(location_id)
    .bind(product_id)
    .bind(variant_id)
    .bind(batch_number)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}
