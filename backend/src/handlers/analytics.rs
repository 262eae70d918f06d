//! Analytics handlers
//!
//! Every list endpoint answers JSON by default and CSV with `format=csv`;
//! CSV needs the `analytics:export` permission.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use shared::{
    Action, DashboardMetrics, Dimension, MonthScope, OrderSummary, RecommendationScope,
    ReportingMonth, Resource,
};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::reporting::AggregateCsvRow;
use crate::services::{AnalyticsService, ErpDataService, ReportingService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    /// "YYYY-MM", "latest" (default) or "all"
    pub month: Option<String>,
    pub format: Option<String>, // "json" or "csv"
    pub limit: Option<usize>,
    /// "all" (default) or "excess"
    pub scope: Option<String>,
}

impl AnalyticsQuery {
    pub fn month_scope(&self) -> AppResult<MonthScope> {
        self.month
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e: shared::MonthParseError| AppError::validation("month", e.to_string()))
    }

    pub fn recommendation_scope(&self) -> AppResult<RecommendationScope> {
        self.scope
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|message: String| AppError::validation("scope", message))
    }

    /// Whether CSV was asked for; checks the export permission when it was
    pub fn csv_requested(&self, user: &AuthUser) -> AppResult<bool> {
        match self.format.as_deref() {
            None | Some("json") => Ok(false),
            Some("csv") => {
                user.require(Resource::Analytics, Action::Export)?;
                Ok(true)
            }
            Some(other) => Err(AppError::validation(
                "format",
                format!("unsupported format '{}'", other),
            )),
        }
    }
}

fn analytics_service(state: &AppState, user: &AuthUser) -> AppResult<AnalyticsService> {
    user.require(Resource::Analytics, Action::View)?;
    Ok(AnalyticsService::new(ErpDataService::new(state)?))
}

fn csv_response<T: Serialize>(filename: &str, rows: &[T]) -> AppResult<Response> {
    let csv = ReportingService::export_to_csv(rows)?;
    let disposition = format!("attachment; filename=\"{}.csv\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// List reporting months, latest first
pub async fn list_months(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<ReportingMonth>>> {
    let service = analytics_service(&state, &user)?;
    Ok(Json(service.available_months().await?))
}

/// Get order totals and export/local split
pub async fn get_order_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<OrderSummary>> {
    let service = analytics_service(&state, &user)?;
    let summary = service.order_summary(query.month_scope()?).await?;
    Ok(Json(summary))
}

/// Get orders grouped by a dimension
pub async fn get_orders_by(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(dimension): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Response> {
    let dimension: Dimension = dimension
        .parse()
        .map_err(|message: String| AppError::validation("dimension", message))?;
    let service = analytics_service(&state, &user)?;
    let csv = query.csv_requested(&user)?;

    let report = service
        .orders_by(dimension, query.month_scope()?, query.limit)
        .await?;

    if csv {
        let rows: Vec<AggregateCsvRow> = report
            .items
            .iter()
            .map(|aggregate| AggregateCsvRow::new(dimension.as_str(), aggregate))
            .collect();
        csv_response(&format!("orders_by_{}", dimension.as_str()), &rows)
    } else {
        Ok(Json(report).into_response())
    }
}

/// Get stock status per product
pub async fn get_stock_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Response> {
    let service = analytics_service(&state, &user)?;
    let csv = query.csv_requested(&user)?;
    let report = service.stock_status(query.month_scope()?).await?;

    if csv {
        csv_response("stock_status", &report.items)
    } else {
        Ok(Json(report).into_response())
    }
}

/// Get production needs, largest gap first
pub async fn get_production_needs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Response> {
    let service = analytics_service(&state, &user)?;
    let csv = query.csv_requested(&user)?;
    let report = service.production_needs(query.month_scope()?).await?;

    if csv {
        csv_response("production_needs", &report.items)
    } else {
        Ok(Json(report).into_response())
    }
}

/// Get sales recommendations, most urgent first
pub async fn get_sales_recommendations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Response> {
    let service = analytics_service(&state, &user)?;
    let csv = query.csv_requested(&user)?;
    let report = service
        .sales_recommendations(query.month_scope()?, query.recommendation_scope()?)
        .await?;

    if csv {
        csv_response("sales_recommendations", &report.items)
    } else {
        Ok(Json(report).into_response())
    }
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<DashboardMetrics>> {
    let service = analytics_service(&state, &user)?;
    let metrics = service.dashboard(query.month_scope()?).await?;
    Ok(Json(metrics))
}
