//! ERP REST API client
//!
//! Fetches raw order, inventory and demand rows as JSON. Rows are handed to
//! the shared normalizers unchanged, so the API can use any of the column
//! aliases the CSV imports accept.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use shared::{row_from_json, RawRow};

use crate::config::ErpApiConfig;
use crate::error::{AppError, AppResult};

/// Row sets exposed by the ERP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErpResource {
    ExportOrders,
    LocalOrders,
    Inventory,
    Demand,
}

impl ErpResource {
    pub fn path(&self) -> &'static str {
        match self {
            ErpResource::ExportOrders => "orders/export",
            ErpResource::LocalOrders => "orders/local",
            ErpResource::Inventory => "inventory",
            ErpResource::Demand => "demand",
        }
    }
}

/// ERP API client
#[derive(Clone)]
pub struct ErpApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ErpApiClient {
    /// Create a new ErpApiClient from configuration
    pub fn new(config: &ErpApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("ERP HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Create a new ErpApiClient with custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key: None,
        }
    }

    pub fn url(&self, resource: ErpResource) -> String {
        format!("{}/{}", self.base_url, resource.path())
    }

    /// Fetch every row of a resource
    pub async fn fetch_rows(&self, resource: ErpResource) -> AppResult<Vec<RawRow>> {
        let url = self.url(resource);
        tracing::debug!(%url, "Fetching ERP rows");

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::DataSource(format!("{} request failed: {}", resource.path(), e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::DataSource(format!(
                "{} returned {} - {}",
                resource.path(),
                status,
                body
            )));
        }

        let payload: Value = response.json().await.map_err(|e| {
            AppError::DataSource(format!("Failed to parse {} response: {}", resource.path(), e))
        })?;

        let rows = rows_from_payload(&payload)?;
        tracing::debug!(resource = resource.path(), rows = rows.len(), "Fetched ERP rows");
        Ok(rows)
    }
}

/// Extract rows from a payload that is either an array of objects or an
/// object wrapping one under `data` or `rows`
pub fn rows_from_payload(payload: &Value) -> AppResult<Vec<RawRow>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(object) => object
            .get("data")
            .or_else(|| object.get("rows"))
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::DataSource("response has no row array".to_string()))?,
        _ => return Err(AppError::DataSource("response is not a row array".to_string())),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            row_from_json(item).ok_or_else(|| {
                AppError::DataSource(format!("row {} is not an object", index + 1))
            })
        })
        .collect()
}
