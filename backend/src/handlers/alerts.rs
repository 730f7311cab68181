//! HTTP handlers for stock alert endpoints
//!
//! Dashboards read alerts; the only write they are allowed is marking one
//! resolved.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::StockAlert;
use crate::services::alert::{AlertFilter, AlertService};
use crate::AppState;

/// List stock alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<AlertFilter>,
) -> AppResult<Json<Vec<StockAlert>>> {
    let service = AlertService::new(state.db);
    let alerts = service.list_alerts(filter).await?;
    Ok(Json(alerts))
}

/// Resolve an open alert
pub async fn resolve_alert(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<StockAlert>> {
    let service = AlertService::new(state.db);
    let alert = service
        .resolve_alert(alert_id, current_user.0.user_id)
        .await?;
    Ok(Json(alert))
}
