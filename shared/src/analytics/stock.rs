//! Stock turnover and status classification

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{
    classify_stock_status, InventorySnapshot, ProductId, StockStatusEntry,
    DAYS_OF_INVENTORY_SENTINEL,
};
use crate::types::ReportingMonth;

const MONTHS_PER_YEAR: u32 = 12;
const DAYS_PER_YEAR: u32 = 365;

/// Turnover and days-of-inventory for one product-month.
///
/// - turnover = sales / average(opening, closing) * 12, zero when there are
///   no sales; days of inventory is then the 999 sentinel
/// - with sales but no average stock the shelf is empty: turnover is
///   reported as zero and days of inventory as zero
/// - a turnover beyond the `Decimal` range saturates, leaving days of
///   inventory at zero
pub fn classify_snapshot(snapshot: &InventorySnapshot) -> StockStatusEntry {
    let average_stock = snapshot
        .opening_stock
        .saturating_add(snapshot.closing_stock)
        / Decimal::TWO;

    let (turnover, days_of_inventory) = if snapshot.sales.is_zero() {
        (Decimal::ZERO, Decimal::from(DAYS_OF_INVENTORY_SENTINEL))
    } else if average_stock <= Decimal::ZERO {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let turnover = snapshot
            .sales
            .checked_div(average_stock)
            .and_then(|rate| rate.checked_mul(Decimal::from(MONTHS_PER_YEAR)))
            .unwrap_or(Decimal::MAX);
        if turnover <= Decimal::ZERO {
            (Decimal::ZERO, Decimal::from(DAYS_OF_INVENTORY_SENTINEL))
        } else {
            (turnover, Decimal::from(DAYS_PER_YEAR) / turnover)
        }
    };

    StockStatusEntry {
        product_id: snapshot.product_id.clone(),
        month: snapshot.month,
        opening_stock: snapshot.opening_stock,
        closing_stock: snapshot.closing_stock,
        sales: snapshot.sales,
        average_stock,
        turnover,
        days_of_inventory,
        status: classify_stock_status(days_of_inventory),
    }
}

/// Sum snapshots that share a product and month.
///
/// Imports and the in-memory analytics both go through this, so a batch
/// with duplicate rows yields the same figures on either path. Sorted by
/// product, then month.
pub fn combine_snapshots<'a, I>(snapshots: I) -> Vec<InventorySnapshot>
where
    I: IntoIterator<Item = &'a InventorySnapshot>,
{
    let mut combined: BTreeMap<(ProductId, ReportingMonth), InventorySnapshot> = BTreeMap::new();

    for snapshot in snapshots {
        combined
            .entry((snapshot.product_id.clone(), snapshot.month))
            .and_modify(|total| {
                total.opening_stock = total.opening_stock.saturating_add(snapshot.opening_stock);
                total.closing_stock = total.closing_stock.saturating_add(snapshot.closing_stock);
                total.sales = total.sales.saturating_add(snapshot.sales);
            })
            .or_insert_with(|| snapshot.clone());
    }

    combined.into_values().collect()
}

/// Stock status per product for one month.
///
/// Snapshots for the same product and month are summed before
/// classification. `None` classifies every month present. Sorted by
/// product, then month.
pub fn stock_status(
    snapshots: &[InventorySnapshot],
    month: Option<ReportingMonth>,
) -> Vec<StockStatusEntry> {
    let in_scope = snapshots
        .iter()
        .filter(|s| month.map_or(true, |m| s.month == m));

    combine_snapshots(in_scope).iter().map(classify_snapshot).collect()
}
