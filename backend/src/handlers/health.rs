//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::DataSourceKind;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub data_source: String,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check database connectivity
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected".to_string(),
        Err(_) => "disconnected".to_string(),
    };

    let data_source = match state.config.data_source {
        DataSourceKind::Database => "database",
        DataSourceKind::ErpApi => "erp_api",
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
        data_source: data_source.to_string(),
    })
}
