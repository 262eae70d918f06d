//! Production needs: demand versus stock on hand

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::models::{classify_priority, DemandRecord, InventorySnapshot, ProductId, ProductionGap};
use crate::types::ReportingMonth;

/// Total forecast demand per product, optionally for one month
pub fn demand_by_product(
    records: &[DemandRecord],
    month: Option<ReportingMonth>,
) -> HashMap<ProductId, Decimal> {
    records
        .iter()
        .filter(|record| month.map_or(true, |m| record.month == m))
        .fold(HashMap::new(), |mut demand, record| {
            let total = demand.entry(record.product_id.clone()).or_insert(Decimal::ZERO);
            *total = total.saturating_add(record.demand_quantity);
            demand
        })
}

/// Sum demand records that share a product and month. Sorted by product,
/// then month.
pub fn combine_demand<'a, I>(records: I) -> Vec<DemandRecord>
where
    I: IntoIterator<Item = &'a DemandRecord>,
{
    let mut combined: BTreeMap<(ProductId, ReportingMonth), DemandRecord> = BTreeMap::new();

    for record in records {
        combined
            .entry((record.product_id.clone(), record.month))
            .and_modify(|total| {
                total.demand_quantity = total.demand_quantity.saturating_add(record.demand_quantity)
            })
            .or_insert_with(|| record.clone());
    }

    combined.into_values().collect()
}

/// Closing stock per product.
///
/// With a month, each product's stock is the closing stock of its latest
/// snapshot at or before that month; without one, of its latest snapshot.
/// Several snapshots for the same product and month are summed.
pub fn stock_by_product(
    snapshots: &[InventorySnapshot],
    month: Option<ReportingMonth>,
) -> HashMap<ProductId, Decimal> {
    let mut latest: HashMap<ProductId, (ReportingMonth, Decimal)> = HashMap::new();

    for snapshot in snapshots
        .iter()
        .filter(|s| month.map_or(true, |m| s.month <= m))
    {
        match latest.get_mut(&snapshot.product_id) {
            Some((seen, stock)) if *seen == snapshot.month => {
                *stock = stock.saturating_add(snapshot.closing_stock)
            }
            Some((seen, stock)) if *seen < snapshot.month => {
                *seen = snapshot.month;
                *stock = snapshot.closing_stock;
            }
            Some(_) => {}
            None => {
                latest.insert(
                    snapshot.product_id.clone(),
                    (snapshot.month, snapshot.closing_stock),
                );
            }
        }
    }

    latest
        .into_iter()
        .map(|(product, (_, stock))| (product, stock))
        .collect()
}

/// Gap for one product
pub fn production_gap(product_id: ProductId, demand: Decimal, stock: Decimal) -> ProductionGap {
    // Negative stock adjustments never push the gap past the whole demand
    let on_hand = stock.max(Decimal::ZERO);
    let (production_needed, gap_percentage) = if demand > Decimal::ZERO {
        let needed = (demand - on_hand).max(Decimal::ZERO);
        (needed, needed / demand * Decimal::ONE_HUNDRED)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    ProductionGap {
        product_id,
        demand,
        current_stock: stock,
        production_needed,
        gap_percentage,
        priority: classify_priority(gap_percentage),
    }
}

/// Production gap for every product with a demand entry.
///
/// Products with zero gap are kept (priority low). Products missing from
/// `stock` have no stock. Output order is unspecified.
pub fn calculate_production_needs(
    demand: &HashMap<ProductId, Decimal>,
    stock: &HashMap<ProductId, Decimal>,
) -> Vec<ProductionGap> {
    demand
        .iter()
        .map(|(product, demand)| {
            let stock = stock.get(product).copied().unwrap_or(Decimal::ZERO);
            production_gap(product.clone(), *demand, stock)
        })
        .collect()
}

/// Sort gaps for display: largest gap first, then by product
pub fn sort_by_gap(gaps: &mut [ProductionGap]) {
    gaps.sort_by(|a, b| {
        b.gap_percentage
            .cmp(&a.gap_percentage)
            .then_with(|| b.production_needed.cmp(&a.production_needed))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
}
