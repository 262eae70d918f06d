//! Production planning models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// Production priority derived from the gap percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
        }
    }
}

/// Classify production priority (>50% high, >20% medium, else low)
pub fn classify_priority(gap_percentage: Decimal) -> Priority {
    if gap_percentage > Decimal::from(50) {
        Priority::High
    } else if gap_percentage > Decimal::from(20) {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Shortfall between forecast demand and stock on hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionGap {
    pub product_id: ProductId,
    pub demand: Decimal,
    pub current_stock: Decimal,
    pub production_needed: Decimal,
    pub gap_percentage: Decimal,
    pub priority: Priority,
}
