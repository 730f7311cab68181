//! HTTP handlers for branch/warehouse management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Location;
use crate::services::location::{CreateLocationInput, LocationService};
use crate::AppState;

/// Create a branch or warehouse
pub async fn create_location(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateLocationInput>,
) -> AppResult<Json<Location>> {
    let service = LocationService::new(state.db);
    let location = service.create_location(input).await?;
    Ok(Json(location))
}

/// List locations
pub async fn list_locations(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Location>>> {
    let service = LocationService::new(state.db);
    let locations = service.list_locations().await?;
    Ok(Json(locations))
}

/// Get a location
pub async fn get_location(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(location_id): Path<Uuid>,
) -> AppResult<Json<Location>> {
    let service = LocationService::new(state.db);
    let location = service.get_location(location_id).await?;
    Ok(Json(location))
}
