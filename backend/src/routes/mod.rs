//! Route definitions for the Retail ERP backend

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - branch/warehouse management
        .nest("/locations", location_routes())
        // Protected routes - product catalog
        .nest("/products", product_routes())
        // Protected routes - the stock ledger
        .nest("/stock", stock_routes())
        // Protected routes - stock alerts
        .nest("/alerts", alert_routes())
}

/// Location management routes (protected)
fn location_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_locations).post(handlers::create_location),
        )
        .route("/:location_id", get(handlers::get_location))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/:product_id", get(handlers::get_product))
        .route(
            "/:product_id/variants",
            get(handlers::list_variants).post(handlers::create_variant),
        )
        .route("/:product_id/stock", get(handlers::get_product_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock ledger routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        // Movements
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        // Transfers (the only sanctioned path for moving stock between locations)
        .route("/transfers", post(handlers::transfer_stock))
        // Balances
        .route("/balance", get(handlers::get_balance))
        .route(
            "/locations/:location_id/balances",
            get(handlers::list_location_balances),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock alert routes (protected)
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/:alert_id/resolve", post(handlers::resolve_alert))
        .route_layer(middleware::from_fn(auth_middleware))
}
