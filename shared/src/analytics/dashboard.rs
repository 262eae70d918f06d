//! Combined dashboard metrics
//!
//! The dashboard shows one planning month for stock, production and sales,
//! while order figures follow the requested scope (all months allowed).

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::aggregation::{monthly_trend, orders_in_month, summarize_orders, top_n, MonthlyTrendPoint, OrderSummary};
use super::production::{calculate_production_needs, demand_by_product, stock_by_product};
use super::sales::generate_sales_recommendations;
use super::stock::stock_status;
use crate::models::{
    Dimension, ErpDataset, OrderRecord, Priority, ProductAggregate, ProductId, StockStatus,
    Urgency,
};
use crate::types::{MonthScope, ReportingMonth};

/// Number of entries in each "top" list
pub const TOP_LIMIT: usize = 5;

/// Demand and stock maps for one planning month
#[derive(Debug, Clone, Default)]
pub struct PlanningInputs {
    pub month: Option<ReportingMonth>,
    pub demand: HashMap<ProductId, Decimal>,
    pub stock: HashMap<ProductId, Decimal>,
}

/// Resolve the planning month and build the demand and stock maps for it.
///
/// `All` is treated as the latest month with demand or inventory data.
pub fn planning_inputs(dataset: &ErpDataset, scope: MonthScope) -> PlanningInputs {
    let month = scope.resolve_single(
        dataset
            .demand
            .iter()
            .map(|d| d.month)
            .chain(dataset.inventory.iter().map(|s| s.month)),
    );

    PlanningInputs {
        month,
        demand: demand_by_product(&dataset.demand, month),
        stock: stock_by_product(&dataset.inventory, month),
    }
}

/// Month an order report covers; `None` means every month
pub fn order_month(orders: &[OrderRecord], scope: MonthScope) -> Option<ReportingMonth> {
    scope.resolve(orders.iter().map(OrderRecord::month))
}

/// High / medium / low tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl LevelCounts {
    fn tally(&mut self, level: Level) {
        match level {
            Level::High => self.high += 1,
            Level::Medium => self.medium += 1,
            Level::Low => self.low += 1,
        }
    }
}

enum Level {
    High,
    Medium,
    Low,
}

impl From<Priority> for Level {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::High => Level::High,
            Priority::Medium => Level::Medium,
            Priority::Low => Level::Low,
        }
    }
}

impl From<Urgency> for Level {
    fn from(urgency: Urgency) -> Self {
        match urgency {
            Urgency::High => Level::High,
            Urgency::Medium => Level::Medium,
            Urgency::Low => Level::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockStatusCounts {
    pub low: usize,
    pub normal: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Month used for stock, production and sales figures
    pub planning_month: Option<ReportingMonth>,
    pub orders: OrderSummary,
    pub production_priorities: LevelCounts,
    pub total_production_needed: Decimal,
    pub sales_urgencies: LevelCounts,
    pub total_liquidation_needed: Decimal,
    pub stock_statuses: StockStatusCounts,
    pub top_customers: Vec<ProductAggregate>,
    pub top_countries: Vec<ProductAggregate>,
    pub top_products: Vec<ProductAggregate>,
    pub monthly_trend: Vec<MonthlyTrendPoint>,
}

/// Build every dashboard figure from one dataset
pub fn build_dashboard(dataset: &ErpDataset, scope: MonthScope) -> DashboardMetrics {
    let month = order_month(&dataset.orders, scope);
    let orders = orders_in_month(&dataset.orders, month);

    let planning = planning_inputs(dataset, scope);

    let gaps = calculate_production_needs(&planning.demand, &planning.stock);
    let mut production_priorities = LevelCounts::default();
    for gap in &gaps {
        production_priorities.tally(gap.priority.into());
    }

    let recommendations = generate_sales_recommendations(&planning.stock, &planning.demand);
    let mut sales_urgencies = LevelCounts::default();
    for rec in &recommendations {
        sales_urgencies.tally(rec.urgency.into());
    }

    let stock_month = scope.resolve_single(dataset.inventory.iter().map(|s| s.month));
    let mut stock_statuses = StockStatusCounts::default();
    for entry in stock_status(&dataset.inventory, stock_month) {
        match entry.status {
            StockStatus::Low => stock_statuses.low += 1,
            StockStatus::Normal => stock_statuses.normal += 1,
            StockStatus::High => stock_statuses.high += 1,
        }
    }

    DashboardMetrics {
        planning_month: planning.month,
        orders: summarize_orders(&orders, month),
        production_priorities,
        total_production_needed: gaps.iter().map(|g| g.production_needed).sum(),
        sales_urgencies,
        total_liquidation_needed: recommendations.iter().map(|r| r.liquidation_needed()).sum(),
        stock_statuses,
        top_customers: top_n(&orders, Dimension::Customer, TOP_LIMIT),
        top_countries: top_n(&orders, Dimension::Country, TOP_LIMIT),
        top_products: top_n(&orders, Dimension::Product, TOP_LIMIT),
        monthly_trend: monthly_trend(&dataset.orders),
    }
}
