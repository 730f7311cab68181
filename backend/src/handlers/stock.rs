//! HTTP handlers for the stock ledger endpoints
//!
//! One movement contract serves every inventory-affecting module: purchase
//! receiving, POS sales, online order fulfillment, returns, damage
//! write-offs and manual adjustments all post here. Transfers go through the
//! dedicated transfer endpoint, never through two direct movement calls.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{StockBalance, StockMovement};
use crate::services::stock::{
    BalanceQuery, LocationBalance, MovementFilter, RecordMovementInput, StockService, TransferInput,
};
use crate::AppState;
use shared::PaginatedResponse;

/// Apply a stock movement
pub async fn record_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<Json<StockMovement>> {
    let service = StockService::new(state.db);
    let movement = service
        .apply_movement(input, current_user.0.user_id)
        .await?;
    Ok(Json(movement))
}

/// List ledger entries with optional filters
pub async fn list_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<PaginatedResponse<StockMovement>>> {
    let service = StockService::new(state.db);
    let movements = service.list_movements(filter).await?;
    Ok(Json(movements))
}

/// Response for a completed transfer
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub outbound: StockMovement,
    pub inbound: StockMovement,
}

/// Transfer stock between two locations
pub async fn transfer_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<TransferInput>,
) -> AppResult<Json<TransferResponse>> {
    let service = StockService::new(state.db);
    let (outbound, inbound) = service.transfer(input, current_user.0.user_id).await?;
    Ok(Json(TransferResponse { outbound, inbound }))
}

/// Look up balance rows for one location/product key
pub async fn get_balance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<BalanceQuery>,
) -> AppResult<Json<Vec<StockBalance>>> {
    let service = StockService::new(state.db);
    let balances = service.get_balance(query).await?;
    Ok(Json(balances))
}

/// List all balances held at a location
pub async fn list_location_balances(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(location_id): Path<Uuid>,
) -> AppResult<Json<Vec<LocationBalance>>> {
    let service = StockService::new(state.db);
    let balances = service.list_location_balances(location_id).await?;
    Ok(Json(balances))
}
