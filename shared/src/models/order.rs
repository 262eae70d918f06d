//! Order records from the export and local order books

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ProductId, ProductKey};
use crate::types::ReportingMonth;

/// Sales channel of an order.
///
/// Fixed by the source table the order came from, never computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Export,
    Local,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Export => "export",
            Channel::Local => "local",
        }
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "export" | "exp" | "e" => Ok(Channel::Export),
            "local" | "domestic" | "loc" | "l" => Ok(Channel::Local),
            other => Err(format!("unknown order channel '{}'", other)),
        }
    }
}

/// A single order line. Quantity is in metric tons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub product_id: ProductId,
    /// Product variant such as denier, when the ERP tracks one
    pub variant: Option<String>,
    pub customer: String,
    pub country: String,
    pub quantity: Decimal,
    pub value: Decimal,
    pub date: NaiveDate,
    pub channel: Channel,
}

impl OrderRecord {
    pub fn month(&self) -> ReportingMonth {
        ReportingMonth::from_date(self.date)
    }

    pub fn product_key(&self) -> ProductKey {
        ProductKey {
            product_id: self.product_id.clone(),
            variant: self.variant.clone(),
        }
    }
}
