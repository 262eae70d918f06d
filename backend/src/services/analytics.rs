//! Analytics service
//!
//! Loads raw records for each request and runs the shared analytics over
//! them. Nothing derived is stored.

use serde::Serialize;
use shared::{
    aggregate_orders, apply_scope, build_dashboard, calculate_production_needs,
    generate_sales_recommendations, order_month, orders_in_month, planning_inputs, ranked,
    sort_by_gap, sort_by_urgency, stock_status, summarize_orders, DashboardMetrics, Dimension,
    ErpDataset, InventorySnapshot, MonthScope, OrderRecord, OrderSummary, ProductAggregate,
    ProductionGap, RecommendationScope, ReportingMonth, SalesRecommendation, StockStatusEntry,
};

use crate::error::AppResult;
use crate::services::ErpDataService;

/// Rows of one analysis together with the month they cover
#[derive(Debug, Serialize)]
pub struct MonthlyReport<T> {
    /// `None` when every month is included
    pub month: Option<ReportingMonth>,
    pub items: Vec<T>,
}

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    data: ErpDataService,
}

impl AnalyticsService {
    pub fn new(data: ErpDataService) -> Self {
        Self { data }
    }

    /// Reporting months present in any record set, latest first
    pub async fn available_months(&self) -> AppResult<Vec<ReportingMonth>> {
        Ok(self.data.load().await?.available_months())
    }

    pub async fn order_summary(&self, scope: MonthScope) -> AppResult<OrderSummary> {
        let orders = self.data.load_orders().await?;
        Ok(order_summary(&orders, scope))
    }

    pub async fn orders_by(
        &self,
        dimension: Dimension,
        scope: MonthScope,
        limit: Option<usize>,
    ) -> AppResult<MonthlyReport<ProductAggregate>> {
        let orders = self.data.load_orders().await?;
        Ok(orders_by(&orders, dimension, scope, limit))
    }

    pub async fn stock_status(&self, scope: MonthScope) -> AppResult<MonthlyReport<StockStatusEntry>> {
        let inventory = self.data.load_inventory().await?;
        Ok(stock_report(&inventory, scope))
    }

    pub async fn production_needs(&self, scope: MonthScope) -> AppResult<MonthlyReport<ProductionGap>> {
        let dataset = self.planning_dataset().await?;
        Ok(production_report(&dataset, scope))
    }

    pub async fn sales_recommendations(
        &self,
        scope: MonthScope,
        recommendation_scope: RecommendationScope,
    ) -> AppResult<MonthlyReport<SalesRecommendation>> {
        let dataset = self.planning_dataset().await?;
        Ok(sales_report(&dataset, scope, recommendation_scope))
    }

    pub async fn dashboard(&self, scope: MonthScope) -> AppResult<DashboardMetrics> {
        let dataset = self.data.load().await?;
        Ok(build_dashboard(&dataset, scope))
    }

    /// Inventory and demand only; production and sales never read orders
    async fn planning_dataset(&self) -> AppResult<ErpDataset> {
        let (inventory, demand) =
            tokio::try_join!(self.data.load_inventory(), self.data.load_demand())?;

        Ok(ErpDataset {
            orders: Vec::new(),
            inventory,
            demand,
        })
    }
}

pub fn order_summary(orders: &[OrderRecord], scope: MonthScope) -> OrderSummary {
    let month = order_month(orders, scope);
    summarize_orders(&orders_in_month(orders, month), month)
}

pub fn orders_by(
    orders: &[OrderRecord],
    dimension: Dimension,
    scope: MonthScope,
    limit: Option<usize>,
) -> MonthlyReport<ProductAggregate> {
    let month = order_month(orders, scope);
    let mut items = ranked(aggregate_orders(&orders_in_month(orders, month), dimension));
    if let Some(limit) = limit {
        items.truncate(limit);
    }

    MonthlyReport { month, items }
}

pub fn stock_report(inventory: &[InventorySnapshot], scope: MonthScope) -> MonthlyReport<StockStatusEntry> {
    let month = scope.resolve_single(inventory.iter().map(|s| s.month));
    MonthlyReport {
        month,
        items: stock_status(inventory, month),
    }
}

pub fn production_report(dataset: &ErpDataset, scope: MonthScope) -> MonthlyReport<ProductionGap> {
    let inputs = planning_inputs(dataset, scope);
    let mut items = calculate_production_needs(&inputs.demand, &inputs.stock);
    sort_by_gap(&mut items);

    tracing::debug!(month = ?inputs.month, products = items.len(), "Calculated production needs");
    MonthlyReport {
        month: inputs.month,
        items,
    }
}

pub fn sales_report(
    dataset: &ErpDataset,
    scope: MonthScope,
    recommendation_scope: RecommendationScope,
) -> MonthlyReport<SalesRecommendation> {
    let inputs = planning_inputs(dataset, scope);
    let mut items = apply_scope(
        generate_sales_recommendations(&inputs.stock, &inputs.demand),
        recommendation_scope,
    );
    sort_by_urgency(&mut items);

    tracing::debug!(month = ?inputs.month, products = items.len(), "Generated sales recommendations");
    MonthlyReport {
        month: inputs.month,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::{Channel, DemandRecord, Priority, ProductId};

    fn month(s: &str) -> ReportingMonth {
        s.parse().unwrap()
    }

    fn order(customer: &str, value: i64, date: &str) -> OrderRecord {
        OrderRecord {
            product_id: ProductId::new("PSF-1.4D"),
            variant: None,
            customer: customer.to_string(),
            country: "Vietnam".to_string(),
            quantity: Decimal::from(20),
            value: Decimal::from(value),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            channel: Channel::Export,
        }
    }

    fn dataset() -> ErpDataset {
        ErpDataset {
            orders: Vec::new(),
            inventory: vec![
                InventorySnapshot {
                    product_id: ProductId::new("A"),
                    month: month("2024-03"),
                    opening_stock: Decimal::from(900),
                    closing_stock: Decimal::from(1000),
                    sales: Decimal::from(300),
                },
                InventorySnapshot {
                    product_id: ProductId::new("B"),
                    month: month("2024-03"),
                    opening_stock: Decimal::from(500),
                    closing_stock: Decimal::from(400),
                    sales: Decimal::from(100),
                },
            ],
            demand: vec![
                DemandRecord {
                    product_id: ProductId::new("A"),
                    month: month("2024-03"),
                    demand_quantity: Decimal::from(500),
                },
                DemandRecord {
                    product_id: ProductId::new("B"),
                    month: month("2024-03"),
                    demand_quantity: Decimal::from(1000),
                },
            ],
        }
    }

    #[test]
    fn test_orders_by_customer_with_limit() {
        let orders = vec![
            order("Acme", 100, "2024-03-01"),
            order("Beta", 300, "2024-03-02"),
            order("Gamma", 200, "2024-03-03"),
            order("Acme", 999, "2024-02-01"),
        ];

        let report = orders_by(&orders, Dimension::Customer, MonthScope::Latest, Some(2));

        assert_eq!(report.month, Some(month("2024-03")));
        let labels: Vec<&str> = report.items.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Beta", "Gamma"]);
    }

    #[test]
    fn test_order_summary_for_all_months() {
        let orders = vec![order("Acme", 100, "2024-03-01"), order("Acme", 50, "2024-01-01")];
        let summary = order_summary(&orders, MonthScope::All);
        assert_eq!(summary.month, None);
        assert_eq!(summary.total_value, Decimal::from(150));
    }

    #[test]
    fn test_production_report_sorted_by_gap() {
        let report = production_report(&dataset(), MonthScope::Latest);

        assert_eq!(report.month, Some(month("2024-03")));
        assert_eq!(report.items[0].product_id.as_str(), "B");
        assert_eq!(report.items[0].priority, Priority::High);
        assert_eq!(report.items[1].production_needed, Decimal::ZERO);
    }

    #[test]
    fn test_sales_report_excess_scope() {
        let all = sales_report(&dataset(), MonthScope::Latest, RecommendationScope::All);
        assert_eq!(all.items.len(), 2);

        let excess = sales_report(&dataset(), MonthScope::Latest, RecommendationScope::ExcessOnly);
        assert_eq!(excess.items.len(), 1);
        assert_eq!(excess.items[0].excess_stock, Decimal::from(400));
    }

    #[test]
    fn test_stock_report_treats_all_as_latest() {
        let report = stock_report(&dataset().inventory, MonthScope::All);
        assert_eq!(report.month, Some(month("2024-03")));
        assert_eq!(report.items.len(), 2);
    }

    #[test]
    fn test_empty_month_gives_empty_report() {
        let report = production_report(&dataset(), MonthScope::Month(month("2023-01")));
        assert!(report.items.is_empty());
    }
}
