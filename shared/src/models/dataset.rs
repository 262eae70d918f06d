//! Raw record bundle an analysis runs over

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{DemandRecord, InventorySnapshot, OrderRecord};
use crate::types::ReportingMonth;

/// Everything fetched from the ERP for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErpDataset {
    pub orders: Vec<OrderRecord>,
    pub inventory: Vec<InventorySnapshot>,
    pub demand: Vec<DemandRecord>,
}

impl ErpDataset {
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.inventory.is_empty() && self.demand.is_empty()
    }

    /// Every month that appears in any of the record sets, newest first
    pub fn available_months(&self) -> Vec<ReportingMonth> {
        let months: BTreeSet<ReportingMonth> = self
            .orders
            .iter()
            .map(OrderRecord::month)
            .chain(self.inventory.iter().map(|s| s.month))
            .chain(self.demand.iter().map(|d| d.month))
            .collect();

        months.into_iter().rev().collect()
    }
}
