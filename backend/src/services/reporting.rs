//! CSV export of analytics results

use rust_decimal::Decimal;
use serde::Serialize;
use shared::ProductAggregate;

use crate::error::{AppError, AppResult};

/// Flat aggregate row; the typed group key does not fit a CSV column
#[derive(Debug, Serialize)]
pub struct AggregateCsvRow {
    pub dimension: &'static str,
    pub group: String,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
    pub count: u64,
    pub average_price: Decimal,
}

impl AggregateCsvRow {
    pub fn new(dimension: &'static str, aggregate: &ProductAggregate) -> Self {
        Self {
            dimension,
            group: aggregate.label.clone(),
            total_quantity: aggregate.total_quantity,
            total_value: aggregate.total_value,
            count: aggregate.count,
            average_price: aggregate.average_price,
        }
    }
}

/// Reporting service
pub struct ReportingService;

impl ReportingService {
    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
