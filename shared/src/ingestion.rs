//! Normalization of raw ERP rows into canonical records
//!
//! Spreadsheet exports, CSV dumps and the REST API all name their columns
//! differently ("Product Code", "product_code", "productId"). Column names
//! are folded to lowercase alphanumerics and matched against alias lists.
//!
//! Malformed numeric values never disappear silently: under
//! [`CoercionPolicy::ZeroDefault`] they become zero and a warning is
//! recorded, under [`CoercionPolicy::Reject`] the row is rejected.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Channel, DemandRecord, InventorySnapshot, OrderRecord, ProductId};
use crate::types::{QuantityUnit, ReportingMonth};
use crate::validation::{bound_quantity, parse_amount, parse_date, parse_quantity, ParseError};

/// A raw row keyed by its source column header
pub type RawRow = HashMap<String, String>;

/// Reasons a row cannot become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}': {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("field '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// What to do with a numeric field that is missing or unparseable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoercionPolicy {
    /// Treat the value as zero and record a warning
    #[default]
    ZeroDefault,
    /// Reject the whole row
    Reject,
}

/// Options shared by all normalizers
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub coercion: CoercionPolicy,
    /// Unit of quantity columns that do not name one
    pub default_unit: QuantityUnit,
}

/// A problem found in one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    /// 1-based data row number
    pub row: usize,
    pub message: String,
}

/// Result of normalizing a batch of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RowIssue>,
    pub warnings: Vec<RowIssue>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> Normalized<T> {
    pub fn accepted(&self) -> usize {
        self.records.len()
    }
}

// ============================================================================
// Column aliases (folded form)
// ============================================================================

const PRODUCT: &[&str] = &["productid", "productcode", "product", "itemcode", "item", "sku"];
const VARIANT: &[&str] = &["variant", "denier", "grade"];
const CUSTOMER: &[&str] = &["customer", "customername", "buyer", "party"];
const COUNTRY: &[&str] = &["country", "destination", "destinationcountry"];
const QUANTITY: &[&str] = &["quantity", "qty", "quantitymt", "qtymt", "volume"];
const QUANTITY_KG: &[&str] = &["quantitykg", "qtykg", "weightkg"];
const VALUE: &[&str] = &["value", "amount", "totalvalue", "ordervalue", "netvalue"];
const DATE: &[&str] = &["date", "orderdate", "documentdate", "createdat"];
const CHANNEL: &[&str] = &["channel", "ordertype", "type", "market"];
const MONTH: &[&str] = &["month", "period", "reportingmonth"];
const OPENING: &[&str] = &["openingstock", "opening", "openingbalance"];
const CLOSING: &[&str] = &["closingstock", "closing", "closingbalance", "currentstock", "stock"];
const SALES: &[&str] = &["sales", "salesquantity", "issued", "dispatched"];
const DEMAND: &[&str] = &["demandquantity", "demand", "forecast", "forecastquantity"];

/// Fold a column header to lowercase alphanumerics
pub fn fold_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A raw row with headers folded for alias lookup
struct FoldedRow {
    fields: HashMap<String, String>,
}

impl FoldedRow {
    fn new(row: &RawRow) -> Self {
        let fields = row
            .iter()
            .map(|(key, value)| (fold_header(key), value.trim().to_string()))
            .collect();
        Self { fields }
    }

    /// First non-empty value among the aliases
    fn get(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.fields.get(*alias))
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }

    fn text(&self, field: &'static str, aliases: &[&str]) -> Result<String, IngestError> {
        self.get(aliases)
            .map(str::to_string)
            .ok_or(IngestError::MissingField(field))
    }

    fn optional_text(&self, aliases: &[&str]) -> Option<String> {
        self.get(aliases).map(str::to_string)
    }
}

/// Per-row numeric reader that applies the coercion policy
struct NumberReader<'a> {
    row_number: usize,
    policy: CoercionPolicy,
    warnings: &'a mut Vec<RowIssue>,
}

impl NumberReader<'_> {
    fn coerce(&mut self, field: &'static str, parsed: Result<Decimal, ParseError>) -> Result<Decimal, IngestError> {
        match (parsed, self.policy) {
            (Ok(value), _) => Ok(value),
            (Err(source), CoercionPolicy::Reject) => Err(IngestError::InvalidField { field, source }),
            (Err(source), CoercionPolicy::ZeroDefault) => {
                tracing::warn!(row = self.row_number, field, error = %source, "coercing value to zero");
                self.warnings.push(RowIssue {
                    row: self.row_number,
                    message: format!("field '{}' defaulted to 0: {}", field, source),
                });
                Ok(Decimal::ZERO)
            }
        }
    }

    /// Monetary amount, rounded to cents
    fn amount(
        &mut self,
        row: &FoldedRow,
        field: &'static str,
        aliases: &[&str],
    ) -> Result<Decimal, IngestError> {
        let parsed = match row.get(aliases) {
            Some(raw) => parse_amount(raw),
            None => Err(ParseError::Empty),
        };
        self.coerce(field, parsed)
    }

    /// Quantity in metric tons.
    ///
    /// A unit written next to the number wins over the column's unit; kg
    /// columns are kilograms, every other column uses `default_unit`.
    fn quantity(
        &mut self,
        row: &FoldedRow,
        field: &'static str,
        aliases: &[&str],
        default_unit: QuantityUnit,
    ) -> Result<Decimal, IngestError> {
        let (raw, column_unit) = match row.get(aliases) {
            Some(raw) => (Some(raw), default_unit),
            None => (row.get(QUANTITY_KG), QuantityUnit::Kilogram),
        };

        let parsed = match raw {
            Some(raw) => parse_quantity(raw).and_then(|(value, unit)| {
                bound_quantity(unit.unwrap_or(column_unit).to_metric_tons(value))
            }),
            None => Err(ParseError::Empty),
        };
        self.coerce(field, parsed)
    }
}

fn product_id(row: &FoldedRow) -> Result<ProductId, IngestError> {
    let code = row.text("product_id", PRODUCT)?;
    crate::validation::validate_product_code(&code).map_err(|message| {
        IngestError::InvalidValue {
            field: "product_id",
            message: message.to_string(),
        }
    })?;
    Ok(ProductId::new(code))
}

fn month(row: &FoldedRow) -> Result<ReportingMonth, IngestError> {
    let raw = row.text("month", MONTH)?;
    if let Ok(month) = ReportingMonth::from_str(&raw) {
        return Ok(month);
    }
    // Some exports put the month-end date in the period column
    parse_date(&raw)
        .map(ReportingMonth::from_date)
        .map_err(|source| IngestError::InvalidField {
            field: "month",
            source,
        })
}

fn date(row: &FoldedRow) -> Result<NaiveDate, IngestError> {
    let raw = row.text("date", DATE)?;
    parse_date(&raw).map_err(|source| IngestError::InvalidField {
        field: "date",
        source,
    })
}

/// Run a per-row normalizer over a batch, sorting rows into records and issues
fn normalize_rows<T, F>(rows: &[RawRow], options: NormalizeOptions, mut build: F) -> Normalized<T>
where
    F: FnMut(&FoldedRow, &mut NumberReader<'_>) -> Result<T, IngestError>,
{
    let mut result = Normalized::default();

    for (index, raw) in rows.iter().enumerate() {
        let row_number = index + 1;
        let row = FoldedRow::new(raw);
        let mut row_warnings = Vec::new();
        let outcome = {
            let mut reader = NumberReader {
                row_number,
                policy: options.coercion,
                warnings: &mut row_warnings,
            };
            build(&row, &mut reader)
        };

        match outcome {
            Ok(record) => {
                result.records.push(record);
                result.warnings.append(&mut row_warnings);
            }
            Err(error) => {
                tracing::debug!(row = row_number, %error, "rejecting row");
                result.rejected.push(RowIssue {
                    row: row_number,
                    message: error.to_string(),
                });
            }
        }
    }

    result
}

/// Normalize order rows.
///
/// `channel` is the fixed tag of the source table; when `None` each row must
/// carry its own channel column.
pub fn normalize_orders(
    rows: &[RawRow],
    channel: Option<Channel>,
    options: NormalizeOptions,
) -> Normalized<OrderRecord> {
    normalize_rows(rows, options, |row, numbers| {
        let product_id = product_id(row)?;
        let channel = match channel {
            Some(channel) => channel,
            None => {
                let raw = row.text("channel", CHANNEL)?;
                Channel::from_str(&raw).map_err(|message| IngestError::InvalidValue {
                    field: "channel",
                    message,
                })?
            }
        };

        Ok(OrderRecord {
            product_id,
            variant: row.optional_text(VARIANT),
            customer: row.text("customer", CUSTOMER)?,
            country: row
                .optional_text(COUNTRY)
                .unwrap_or_else(|| "Unknown".to_string()),
            quantity: numbers.quantity(row, "quantity", QUANTITY, options.default_unit)?,
            value: numbers.amount(row, "value", VALUE)?,
            date: date(row)?,
            channel,
        })
    })
}

/// Normalize monthly inventory snapshot rows
pub fn normalize_inventory(rows: &[RawRow], options: NormalizeOptions) -> Normalized<InventorySnapshot> {
    normalize_rows(rows, options, |row, numbers| {
        Ok(InventorySnapshot {
            product_id: product_id(row)?,
            month: month(row)?,
            opening_stock: numbers.quantity(row, "opening_stock", OPENING, options.default_unit)?,
            closing_stock: numbers.quantity(row, "closing_stock", CLOSING, options.default_unit)?,
            sales: numbers.quantity(row, "sales", SALES, options.default_unit)?,
        })
    })
}

/// Normalize demand forecast rows
pub fn normalize_demand(rows: &[RawRow], options: NormalizeOptions) -> Normalized<DemandRecord> {
    normalize_rows(rows, options, |row, numbers| {
        Ok(DemandRecord {
            product_id: product_id(row)?,
            month: month(row)?,
            demand_quantity: numbers.quantity(row, "demand_quantity", DEMAND, options.default_unit)?,
        })
    })
}

/// Flatten a JSON object (REST payload row) into a raw row.
///
/// Nested values are skipped; nulls become empty strings.
pub fn row_from_json(value: &serde_json::Value) -> Option<RawRow> {
    let object = value.as_object()?;
    let row = object
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => String::new(),
                _ => return None,
            };
            Some((key.clone(), text))
        })
        .collect();
    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fold_header() {
        assert_eq!(fold_header("Product Code"), "productcode");
        assert_eq!(fold_header("product_code"), "productcode");
        assert_eq!(fold_header("productCode"), "productcode");
        assert_eq!(fold_header("Qty (MT)"), "qtymt");
    }

    #[test]
    fn test_normalize_order_from_spreadsheet_headers() {
        let rows = vec![row(&[
            ("Product Code", "PSF-1.4D"),
            ("Denier", "1.4"),
            ("Customer Name", "Acme Textiles"),
            ("Destination Country", "Vietnam"),
            ("Qty (MT)", "24.5"),
            ("Amount", "31,850"),
            ("Order Date", "12/03/2024"),
        ])];

        let result = normalize_orders(&rows, Some(Channel::Export), NormalizeOptions::default());

        assert!(result.rejected.is_empty());
        assert!(result.warnings.is_empty());
        let order = &result.records[0];
        assert_eq!(order.product_id.as_str(), "PSF-1.4D");
        assert_eq!(order.variant.as_deref(), Some("1.4"));
        assert_eq!(order.customer, "Acme Textiles");
        assert_eq!(order.country, "Vietnam");
        assert_eq!(order.quantity, Decimal::new(245, 1));
        assert_eq!(order.value, Decimal::from(31850));
        assert_eq!(order.channel, Channel::Export);
        assert_eq!(order.month().to_string(), "2024-03");
    }

    #[test]
    fn test_normalize_order_channel_from_row() {
        let rows = vec![
            row(&[
                ("productId", "A1"),
                ("customer", "Local Mill"),
                ("quantity", "10"),
                ("value", "1000"),
                ("date", "2024-01-05"),
                ("channel", "domestic"),
            ]),
            row(&[
                ("productId", "A1"),
                ("customer", "Someone"),
                ("quantity", "10"),
                ("value", "1000"),
                ("date", "2024-01-05"),
                ("channel", "barter"),
            ]),
        ];

        let result = normalize_orders(&rows, None, NormalizeOptions::default());

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].channel, Channel::Local);
        assert_eq!(result.records[0].country, "Unknown");
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].row, 2);
    }

    #[test]
    fn test_zero_default_policy_records_warning() {
        let rows = vec![row(&[
            ("product_id", "B2"),
            ("customer", "Acme"),
            ("quantity", "n/a"),
            ("value", "500"),
            ("date", "2024-02-01"),
        ])];

        let result = normalize_orders(&rows, Some(Channel::Local), NormalizeOptions::default());

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].quantity, Decimal::ZERO);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("quantity"));
    }

    #[test]
    fn test_reject_policy_rejects_row() {
        let rows = vec![row(&[
            ("product_id", "B2"),
            ("customer", "Acme"),
            ("quantity", "n/a"),
            ("value", "500"),
            ("date", "2024-02-01"),
        ])];
        let options = NormalizeOptions {
            coercion: CoercionPolicy::Reject,
            ..Default::default()
        };

        let result = normalize_orders(&rows, Some(Channel::Local), options);

        assert!(result.records.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.rejected.len(), 1);
    }

    #[test]
    fn test_missing_product_is_always_rejected() {
        let rows = vec![row(&[("customer", "Acme"), ("quantity", "5"), ("date", "2024-02-01")])];

        let result = normalize_orders(&rows, Some(Channel::Local), NormalizeOptions::default());

        assert!(result.records.is_empty());
        assert!(result.rejected[0].message.contains("product_id"));
    }

    #[test]
    fn test_kilogram_column_converted_to_metric_tons() {
        let rows = vec![row(&[("product", "C3"), ("month", "2024-05"), ("Qty (kg)", "12500")])];

        let result = normalize_demand(&rows, NormalizeOptions::default());

        assert_eq!(result.records[0].demand_quantity, Decimal::new(125, 1));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_quantity_header_defaults_to_zero() {
        let rows = vec![row(&[("product", "C3"), ("month", "2024-05"), ("demand (kg)", "12500")])];

        let result = normalize_demand(&rows, NormalizeOptions::default());

        assert_eq!(result.records[0].demand_quantity, Decimal::ZERO);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_default_unit_kilogram() {
        let rows = vec![row(&[
            ("product", "C3"),
            ("period", "2024-05-31"),
            ("opening stock", "2000"),
            ("closing stock", "1000"),
            ("sales", "1500"),
        ])];
        let options = NormalizeOptions {
            default_unit: QuantityUnit::Kilogram,
            ..Default::default()
        };

        let result = normalize_inventory(&rows, options);

        let snapshot = &result.records[0];
        assert_eq!(snapshot.month.to_string(), "2024-05");
        assert_eq!(snapshot.opening_stock, Decimal::from(2));
        assert_eq!(snapshot.closing_stock, Decimal::from(1));
        assert_eq!(snapshot.sales, Decimal::new(15, 1));
    }

    #[test]
    fn test_unit_suffix_overrides_column_unit() {
        let rows = vec![
            row(&[("product", "C3"), ("month", "2024-05"), ("forecast", "300kg")]),
            row(&[("product", "C4"), ("month", "2024-05"), ("forecast", "2.5 MT")]),
        ];

        let tons = normalize_demand(&rows, NormalizeOptions::default());
        assert_eq!(tons.records[0].demand_quantity, Decimal::new(3, 1));
        assert_eq!(tons.records[1].demand_quantity, Decimal::new(25, 1));
        assert!(tons.warnings.is_empty());

        let options = NormalizeOptions {
            default_unit: QuantityUnit::Kilogram,
            ..Default::default()
        };
        let kilograms = normalize_demand(&rows, options);
        assert_eq!(kilograms.records[0].demand_quantity, Decimal::new(3, 1));
        assert_eq!(kilograms.records[1].demand_quantity, Decimal::new(25, 1));
    }

    #[test]
    fn test_unknown_unit_follows_coercion_policy() {
        let rows = vec![row(&[("product", "C3"), ("month", "2024-05"), ("forecast", "40 bales")])];

        let lenient = normalize_demand(&rows, NormalizeOptions::default());
        assert_eq!(lenient.records[0].demand_quantity, Decimal::ZERO);
        assert!(lenient.warnings[0].message.contains("unknown unit"));

        let strict = normalize_demand(
            &rows,
            NormalizeOptions {
                coercion: CoercionPolicy::Reject,
                ..Default::default()
            },
        );
        assert!(strict.records.is_empty());
        assert_eq!(strict.rejected.len(), 1);
    }

    #[test]
    fn test_out_of_range_values_are_coerced() {
        let rows = vec![row(&[
            ("product_id", "B2"),
            ("customer", "Acme"),
            ("quantity", "79228162514264337593543950335"),
            ("value", "1e20"),
            ("date", "2024-02-01"),
        ])];

        let result = normalize_orders(&rows, Some(Channel::Local), NormalizeOptions::default());

        assert_eq!(result.records[0].quantity, Decimal::ZERO);
        assert_eq!(result.records[0].value, Decimal::ZERO);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].message.contains("outside the supported range"));
    }

    #[test]
    fn test_quantities_rounded_to_stored_scale() {
        let rows = vec![row(&[("product", "C3"), ("month", "2024-05"), ("forecast", "0.00000000001")])];

        let result = normalize_demand(&rows, NormalizeOptions::default());

        assert_eq!(result.records[0].demand_quantity, Decimal::ZERO);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_row_from_json() {
        let value = serde_json::json!({
            "productId": "D4",
            "quantity": 12.5,
            "note": null,
            "tags": ["ignored"]
        });

        let raw = row_from_json(&value).unwrap();

        assert_eq!(raw.get("productId").map(String::as_str), Some("D4"));
        assert_eq!(raw.get("quantity").map(String::as_str), Some("12.5"));
        assert_eq!(raw.get("note").map(String::as_str), Some(""));
        assert!(!raw.contains_key("tags"));
        assert!(row_from_json(&serde_json::json!([1, 2])).is_none());
    }
}
