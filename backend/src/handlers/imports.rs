//! CSV import handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use shared::{Action, Channel, Resource};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::{ImportKind, ImportReport, ImportService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    /// Tag every order row with this channel instead of reading a column
    pub channel: Option<String>,
}

/// Import a CSV body of orders, inventory snapshots or demand forecasts
pub async fn import_csv(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(kind): Path<String>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> AppResult<(StatusCode, Json<ImportReport>)> {
    user.require(Resource::Imports, Action::Create)?;

    let kind: ImportKind = kind
        .parse()
        .map_err(|_| AppError::NotFound(format!("Import kind '{}'", kind)))?;

    let channel = query
        .channel
        .as_deref()
        .map(str::parse::<Channel>)
        .transpose()
        .map_err(|message| AppError::validation("channel", message))?;

    if body.trim().is_empty() {
        return Err(AppError::validation("body", "CSV body is empty"));
    }

    tracing::debug!(user_id = %user.user_id, role = %user.role, kind = kind.as_str(), "CSV import requested");

    let service = ImportService::new(state.db.clone(), state.config.analytics.normalize_options());
    let report = service.import_csv(kind, &body, channel, user.user_id).await?;

    let status = if report.accepted > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(report)))
}
