//! Route definitions for the ERP analytics server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - analytics
        .nest("/analytics", analytics_routes(state.clone()))
        // Protected routes - CSV imports
        .nest("/imports", import_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Analytics routes (protected)
fn analytics_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/months", get(handlers::list_months))
        .route("/orders/summary", get(handlers::get_order_summary))
        .route("/orders/by/:dimension", get(handlers::get_orders_by))
        .route("/stock", get(handlers::get_stock_status))
        .route("/production-needs", get(handlers::get_production_needs))
        .route("/sales-recommendations", get(handlers::get_sales_recommendations))
        .route("/dashboard", get(handlers::get_dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Import routes (protected)
fn import_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:kind", post(handlers::import_csv))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
