//! Demand forecast models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;
use crate::types::ReportingMonth;

/// Forecast demand for a product in a month, in metric tons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    pub product_id: ProductId,
    pub month: ReportingMonth,
    pub demand_quantity: Decimal,
}
