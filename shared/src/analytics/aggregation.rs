//! Group-by aggregation of order records

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    Channel, DemandRecord, Dimension, GroupKey, InventorySnapshot, OrderRecord, ProductAggregate,
    Totals,
};
use crate::types::ReportingMonth;

/// A record that carries a quantity and a value to sum
pub trait Measured {
    fn quantity(&self) -> Decimal;

    fn value(&self) -> Decimal {
        Decimal::ZERO
    }
}

impl Measured for OrderRecord {
    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn value(&self) -> Decimal {
        self.value
    }
}

impl Measured for InventorySnapshot {
    fn quantity(&self) -> Decimal {
        self.sales
    }
}

impl Measured for DemandRecord {
    fn quantity(&self) -> Decimal {
        self.demand_quantity
    }
}

/// Sum quantity, value and count per key.
///
/// Left fold in input order. Keys without records never appear; empty
/// input gives an empty map.
pub fn aggregate<T, K, F>(records: &[T], key_fn: F) -> HashMap<K, Totals>
where
    T: Measured,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    records.iter().fold(HashMap::new(), |mut groups, record| {
        groups
            .entry(key_fn(record))
            .or_insert_with(Totals::default)
            .add(record.quantity(), record.value());
        groups
    })
}

/// Grouping key of an order for a dimension
pub fn group_key(order: &OrderRecord, dimension: Dimension) -> GroupKey {
    match dimension {
        Dimension::Product => GroupKey::Product(order.product_id.clone()),
        Dimension::ProductVariant => GroupKey::ProductVariant(order.product_key()),
        Dimension::Customer => GroupKey::Customer(order.customer.clone()),
        Dimension::Country => GroupKey::Country(order.country.clone()),
        Dimension::Month => GroupKey::Month(order.month()),
        Dimension::Channel => GroupKey::Channel(order.channel),
    }
}

/// Aggregate orders by a dimension
pub fn aggregate_orders(orders: &[OrderRecord], dimension: Dimension) -> HashMap<GroupKey, Totals> {
    aggregate(orders, |order| group_key(order, dimension))
}

/// Aggregates ranked by value (descending), ties broken by key.
///
/// Month groupings are returned in calendar order instead, which is what a
/// trend chart needs.
pub fn ranked(groups: HashMap<GroupKey, Totals>) -> Vec<ProductAggregate> {
    let mut aggregates: Vec<ProductAggregate> = groups
        .into_iter()
        .map(|(key, totals)| ProductAggregate::new(key, totals))
        .collect();

    aggregates.sort_by(|a, b| match (&a.key, &b.key) {
        (GroupKey::Month(left), GroupKey::Month(right)) => left.cmp(right),
        _ => b
            .total_value
            .cmp(&a.total_value)
            .then_with(|| a.key.cmp(&b.key)),
    });
    aggregates
}

/// Top `limit` groups of a dimension
pub fn top_n(orders: &[OrderRecord], dimension: Dimension, limit: usize) -> Vec<ProductAggregate> {
    let mut aggregates = ranked(aggregate_orders(orders, dimension));
    aggregates.truncate(limit);
    aggregates
}

/// Orders falling in one month, or every order when `month` is `None`
pub fn orders_in_month(orders: &[OrderRecord], month: Option<ReportingMonth>) -> Vec<OrderRecord> {
    orders
        .iter()
        .filter(|order| month.map_or(true, |m| order.month() == m))
        .cloned()
        .collect()
}

/// Headline order figures for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub month: Option<ReportingMonth>,
    pub order_count: u64,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
    pub average_price: Decimal,
    pub export: Totals,
    pub local: Totals,
    /// Export share of total value, in percent
    pub export_share: Decimal,
    pub customer_count: usize,
    pub product_count: usize,
    pub country_count: usize,
}

/// Summarize a set of orders (already scoped to the wanted month)
pub fn summarize_orders(orders: &[OrderRecord], month: Option<ReportingMonth>) -> OrderSummary {
    let by_channel = aggregate_orders(orders, Dimension::Channel);
    let export = by_channel
        .get(&GroupKey::Channel(Channel::Export))
        .copied()
        .unwrap_or_default();
    let local = by_channel
        .get(&GroupKey::Channel(Channel::Local))
        .copied()
        .unwrap_or_default();

    let total = export.merge(&local);

    let export_share = export
        .value
        .checked_div(total.value)
        .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO);

    let customers: BTreeSet<&str> = orders.iter().map(|o| o.customer.as_str()).collect();
    let products: BTreeSet<&str> = orders.iter().map(|o| o.product_id.as_str()).collect();
    let countries: BTreeSet<&str> = orders.iter().map(|o| o.country.as_str()).collect();

    OrderSummary {
        month,
        order_count: total.count,
        total_quantity: total.quantity,
        total_value: total.value,
        average_price: total.average_price(),
        export,
        local,
        export_share,
        customer_count: customers.len(),
        product_count: products.len(),
        country_count: countries.len(),
    }
}

/// One month of the export/local trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrendPoint {
    pub month: ReportingMonth,
    pub export: Totals,
    pub local: Totals,
}

/// Export and local totals per month, in calendar order
pub fn monthly_trend(orders: &[OrderRecord]) -> Vec<MonthlyTrendPoint> {
    let groups = aggregate(orders, |order| (order.month(), order.channel));

    let mut months: BTreeMap<ReportingMonth, MonthlyTrendPoint> = BTreeMap::new();
    for ((month, channel), totals) in groups {
        let point = months.entry(month).or_insert_with(|| MonthlyTrendPoint {
            month,
            export: Totals::default(),
            local: Totals::default(),
        });
        match channel {
            Channel::Export => point.export = totals,
            Channel::Local => point.local = totals,
        }
    }

    months.into_values().collect()
}
