//! Inventory snapshot and stock status models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;
use crate::types::ReportingMonth;

/// Days of inventory reported when stock does not turn over at all
pub const DAYS_OF_INVENTORY_SENTINEL: u32 = 999;

/// Below this many days of inventory stock is considered low
pub const LOW_STOCK_DAYS: u32 = 30;

/// Above this many days of inventory stock is considered high
pub const HIGH_STOCK_DAYS: u32 = 90;

/// Month-end stock position for a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub product_id: ProductId,
    pub month: ReportingMonth,
    pub opening_stock: Decimal,
    pub closing_stock: Decimal,
    pub sales: Decimal,
}

/// Stock level classification by days of inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Low,
    Normal,
    High,
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::Low => write!(f, "Low"),
            StockStatus::Normal => write!(f, "Normal"),
            StockStatus::High => write!(f, "High"),
        }
    }
}

/// Classify stock by days of inventory (<30 low, >90 high)
pub fn classify_stock_status(days_of_inventory: Decimal) -> StockStatus {
    if days_of_inventory < Decimal::from(LOW_STOCK_DAYS) {
        StockStatus::Low
    } else if days_of_inventory > Decimal::from(HIGH_STOCK_DAYS) {
        StockStatus::High
    } else {
        StockStatus::Normal
    }
}

/// Derived stock metrics for one product in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockStatusEntry {
    pub product_id: ProductId,
    pub month: ReportingMonth,
    pub opening_stock: Decimal,
    pub closing_stock: Decimal,
    pub sales: Decimal,
    pub average_stock: Decimal,
    /// Annualized turnover (monthly turnover * 12)
    pub turnover: Decimal,
    pub days_of_inventory: Decimal,
    pub status: StockStatus,
}
