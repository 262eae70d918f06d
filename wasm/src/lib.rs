//! WebAssembly module for the ERP analytics dashboard
//!
//! Runs the shared analytics in the browser so the dashboard can recompute
//! figures for uploaded spreadsheets without a server round trip:
//! - Record normalization of spreadsheet rows
//! - Production needs and sales recommendations
//! - Stock status and dashboard metrics
//!
//! Structured inputs and outputs are JSON strings. Quantities are decimal
//! strings (numbers are accepted on input).

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

use shared::{
    apply_scope, build_dashboard, calculate_production_needs, generate_sales_recommendations,
    normalize_demand, normalize_inventory, normalize_orders, sort_by_gap, sort_by_urgency,
    CoercionPolicy, ErpDataset, NormalizeOptions, RawRow, RowIssue,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    log("erp-analytics wasm module loaded");
}

fn log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

fn to_js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn parse_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Failed to serialize result: {}", e))
}

fn quantity_map(what: &str, json: &str) -> Result<HashMap<ProductId, Decimal>, String> {
    parse_json(what, json)
}

fn report_issues(kind: &str, rejected: &[RowIssue], warnings: &[RowIssue]) {
    for issue in rejected {
        warn(&format!("{} row {} rejected: {}", kind, issue.row, issue.message));
    }
    if !warnings.is_empty() {
        warn(&format!("{} {} rows had values defaulted to 0", warnings.len(), kind));
    }
}

// ============================================================================
// Ingestion
// ============================================================================

fn normalize_rows_json(kind: &str, rows_json: &str, policy: &str) -> Result<String, String> {
    let rows: Vec<RawRow> = parse_json("rows", rows_json)?;
    let coercion = match policy {
        "" | "zero_default" => CoercionPolicy::ZeroDefault,
        "reject" => CoercionPolicy::Reject,
        other => return Err(format!("Unknown coercion policy '{}'", other)),
    };
    let options = NormalizeOptions {
        coercion,
        ..NormalizeOptions::default()
    };

    match kind {
        "export_orders" | "local_orders" | "orders" => {
            let channel = match kind {
                "export_orders" => Some(Channel::Export),
                "local_orders" => Some(Channel::Local),
                _ => None,
            };
            let result = normalize_orders(&rows, channel, options);
            report_issues(kind, &result.rejected, &result.warnings);
            to_json(&result)
        }
        "inventory" => {
            let result = normalize_inventory(&rows, options);
            report_issues(kind, &result.rejected, &result.warnings);
            to_json(&result)
        }
        "demand" => {
            let result = normalize_demand(&rows, options);
            report_issues(kind, &result.rejected, &result.warnings);
            to_json(&result)
        }
        other => Err(format!("Unknown record kind '{}'", other)),
    }
}

/// Normalize spreadsheet rows (array of header->value objects).
///
/// `kind` is one of "orders", "export_orders", "local_orders", "inventory"
/// or "demand". Returns `{records, rejected, warnings}`.
#[wasm_bindgen]
pub fn normalize_rows(kind: &str, rows_json: &str, policy: &str) -> Result<String, JsValue> {
    normalize_rows_json(kind, rows_json, policy).map_err(to_js_error)
}

// ============================================================================
// Production and sales
// ============================================================================

fn production_needs_json(demand_json: &str, stock_json: &str) -> Result<String, String> {
    let demand = quantity_map("demand", demand_json)?;
    let stock = quantity_map("stock", stock_json)?;

    let mut gaps = calculate_production_needs(&demand, &stock);
    sort_by_gap(&mut gaps);
    to_json(&gaps)
}

/// Production gaps from `{product: demand}` and `{product: stock}` maps,
/// largest gap first
#[wasm_bindgen]
pub fn production_needs(demand_json: &str, stock_json: &str) -> Result<String, JsValue> {
    production_needs_json(demand_json, stock_json).map_err(to_js_error)
}

fn sales_recommendations_json(stock_json: &str, demand_json: &str, scope: &str) -> Result<String, String> {
    let stock = quantity_map("stock", stock_json)?;
    let demand = quantity_map("demand", demand_json)?;
    let scope: RecommendationScope = scope.parse()?;

    let mut recommendations = apply_scope(generate_sales_recommendations(&stock, &demand), scope);
    sort_by_urgency(&mut recommendations);
    to_json(&recommendations)
}

/// Sales recommendations, most urgent first. `scope` is "all" or "excess".
#[wasm_bindgen]
pub fn sales_recommendations(stock_json: &str, demand_json: &str, scope: &str) -> Result<String, JsValue> {
    sales_recommendations_json(stock_json, demand_json, scope).map_err(to_js_error)
}

// ============================================================================
// Stock and dashboard
// ============================================================================

fn stock_status_json(snapshots_json: &str, month: Option<String>) -> Result<String, String> {
    let snapshots: Vec<InventorySnapshot> = parse_json("snapshots", snapshots_json)?;
    let month = month
        .filter(|m| !m.trim().is_empty())
        .map(|m| m.parse::<ReportingMonth>())
        .transpose()
        .map_err(|e| e.to_string())?;

    to_json(&shared::stock_status(&snapshots, month))
}

/// Stock status per product from inventory snapshots; every month when
/// `month` is omitted
#[wasm_bindgen]
pub fn stock_status(snapshots_json: &str, month: Option<String>) -> Result<String, JsValue> {
    stock_status_json(snapshots_json, month).map_err(to_js_error)
}

fn dashboard_json(dataset_json: &str, month: &str) -> Result<String, String> {
    let dataset: ErpDataset = parse_json("dataset", dataset_json)?;
    let scope: MonthScope = month.parse().map_err(|e: MonthParseError| e.to_string())?;
    to_json(&build_dashboard(&dataset, scope))
}

/// Dashboard metrics for `{orders, inventory, demand}`; `month` is
/// "YYYY-MM", "latest" or "all"
#[wasm_bindgen]
pub fn dashboard(dataset_json: &str, month: &str) -> Result<String, JsValue> {
    dashboard_json(dataset_json, month).map_err(to_js_error)
}

// ============================================================================
// Classifiers
// ============================================================================

fn decimal(what: &str, value: f64) -> Result<Decimal, String> {
    Decimal::try_from(value).map_err(|_| format!("{} must be a finite number, got {}", what, value))
}

fn production_priority_label(gap_percentage: f64) -> Result<String, String> {
    Ok(classify_priority(decimal("gap_percentage", gap_percentage)?).to_string())
}

fn liquidation_urgency_label(excess_stock: f64, stock: f64) -> Result<String, String> {
    let excess_stock = decimal("excess_stock", excess_stock)?;
    let stock = decimal("stock", stock)?;
    Ok(classify_urgency(excess_stock, stock).to_string())
}

fn stock_level_label(days_of_inventory: f64) -> Result<String, String> {
    Ok(classify_stock_status(decimal("days_of_inventory", days_of_inventory)?).to_string())
}

/// Production priority for a gap percentage
#[wasm_bindgen]
pub fn production_priority(gap_percentage: f64) -> Result<String, JsValue> {
    production_priority_label(gap_percentage).map_err(to_js_error)
}

/// Liquidation urgency for an excess against stock on hand
#[wasm_bindgen]
pub fn liquidation_urgency(excess_stock: f64, stock: f64) -> Result<String, JsValue> {
    liquidation_urgency_label(excess_stock, stock).map_err(to_js_error)
}

/// Stock status for a days-of-inventory figure
#[wasm_bindgen]
pub fn stock_level(days_of_inventory: f64) -> Result<String, JsValue> {
    stock_level_label(days_of_inventory).map_err(to_js_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_classifiers() {
        assert_eq!(production_priority_label(60.0).unwrap(), "High");
        assert_eq!(production_priority_label(50.0).unwrap(), "Medium");
        assert_eq!(production_priority_label(5.0).unwrap(), "Low");
        assert_eq!(liquidation_urgency_label(400.0, 1000.0).unwrap(), "Medium");
        assert_eq!(liquidation_urgency_label(600.0, 1000.0).unwrap(), "High");
        assert_eq!(stock_level_label(15.0).unwrap(), "Low");
        assert_eq!(stock_level_label(45.0).unwrap(), "Normal");
        assert_eq!(stock_level_label(999.0).unwrap(), "High");
    }

    #[test]
    fn test_classifiers_reject_non_finite_input() {
        assert!(stock_level_label(f64::NAN).is_err());
        assert!(production_priority_label(f64::INFINITY).is_err());
        assert!(liquidation_urgency_label(100.0, f64::NEG_INFINITY).is_err());
        assert!(liquidation_urgency_label(f64::NAN, 100.0)
            .unwrap_err()
            .contains("excess_stock"));
    }

    #[test]
    fn test_extreme_stock_figures_do_not_abort() {
        let max = Decimal::MAX.to_string();
        let stock = format!(r#"{{"A": "{}"}}"#, max);
        let recs: Vec<SalesRecommendation> =
            serde_json::from_str(&sales_recommendations_json(&stock, &stock, "all").unwrap()).unwrap();
        assert_eq!(recs[0].excess_stock, Decimal::ZERO);

        let snapshots = r#"[
            {"product_id": "A", "month": "2024-04", "opening_stock": "0.00000000000000000001",
             "closing_stock": "0.00000000000000000001", "sales": "1000000000"}
        ]"#;
        let entries: Vec<StockStatusEntry> =
            serde_json::from_str(&stock_status_json(snapshots, None).unwrap()).unwrap();
        assert_eq!(entries[0].status, StockStatus::Low);
    }

    #[test]
    fn test_production_needs_sorted_by_gap() {
        let json = production_needs_json(r#"{"A": "100", "B": 50}"#, r#"{"A": "90"}"#).unwrap();
        let gaps: Vec<ProductionGap> = serde_json::from_str(&json).unwrap();

        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].product_id.as_str(), "B");
        assert_eq!(gaps[0].production_needed, Decimal::from(50));
        assert_eq!(gaps[1].production_needed, Decimal::from(10));
    }

    #[test]
    fn test_sales_recommendations_scope() {
        let stock = r#"{"A": "1000", "B": "100"}"#;
        let demand = r#"{"A": "500", "B": "100"}"#;

        let all: Vec<Value> =
            serde_json::from_str(&sales_recommendations_json(stock, demand, "all").unwrap()).unwrap();
        assert_eq!(all.len(), 2);

        let excess: Vec<SalesRecommendation> =
            serde_json::from_str(&sales_recommendations_json(stock, demand, "excess").unwrap())
                .unwrap();
        assert_eq!(excess.len(), 1);
        assert_eq!(excess[0].excess_stock, Decimal::from(400));

        assert!(sales_recommendations_json(stock, demand, "most").is_err());
    }

    #[test]
    fn test_normalize_rows() {
        let rows = r#"[
            {"Item Code": "PSF-01", "Month": "2024-05", "Forecast": "45"},
            {"Item Code": "PSF-02", "Month": "2024-05", "Forecast": "n/a"}
        ]"#;

        let lenient: Value = serde_json::from_str(&normalize_rows_json("demand", rows, "").unwrap()).unwrap();
        assert_eq!(lenient["records"].as_array().unwrap().len(), 2);
        assert_eq!(lenient["warnings"].as_array().unwrap().len(), 1);

        let strict: Value =
            serde_json::from_str(&normalize_rows_json("demand", rows, "reject").unwrap()).unwrap();
        assert_eq!(strict["records"].as_array().unwrap().len(), 1);
        assert_eq!(strict["rejected"].as_array().unwrap().len(), 1);

        assert!(normalize_rows_json("invoices", rows, "").is_err());
        assert!(normalize_rows_json("demand", "not json", "").is_err());
    }

    #[test]
    fn test_stock_status_for_month() {
        let snapshots = r#"[
            {"product_id": "A", "month": "2024-04", "opening_stock": "100", "closing_stock": "100", "sales": "50"},
            {"product_id": "A", "month": "2024-05", "opening_stock": "100", "closing_stock": "100", "sales": "0"}
        ]"#;

        let entries: Vec<StockStatusEntry> =
            serde_json::from_str(&stock_status_json(snapshots, Some("2024-04".to_string())).unwrap())
                .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, StockStatus::Normal);

        let every_month: Vec<StockStatusEntry> =
            serde_json::from_str(&stock_status_json(snapshots, None).unwrap()).unwrap();
        assert_eq!(every_month.len(), 2);

        assert!(stock_status_json(snapshots, Some("2024-13".to_string())).is_err());
    }

    #[test]
    fn test_dashboard_of_empty_dataset() {
        let json = dashboard_json(r#"{"orders": [], "inventory": [], "demand": []}"#, "latest").unwrap();
        let metrics: Value = serde_json::from_str(&json).unwrap();
        assert!(metrics["planning_month"].is_null());
        assert!(dashboard_json("{}", "2024-99").is_err());
    }
}
