//! Raw ERP record access
//!
//! Loads orders, inventory snapshots and demand forecasts from whichever
//! source is configured: the analytics database or the upstream ERP API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{
    normalize_demand, normalize_inventory, normalize_orders, Channel, DemandRecord, ErpDataset,
    InventorySnapshot, NormalizeOptions, Normalized, OrderRecord, ProductId, ReportingMonth,
};
use sqlx::PgPool;

use crate::config::DataSourceKind;
use crate::error::{AppError, AppResult};
use crate::external::{ErpApiClient, ErpResource};
use crate::AppState;

#[derive(Clone)]
enum Source {
    Database(PgPool),
    Api(ErpApiClient),
}

/// Record loader for one request
#[derive(Clone)]
pub struct ErpDataService {
    source: Source,
    options: NormalizeOptions,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    product_id: String,
    variant: Option<String>,
    customer: String,
    country: String,
    quantity: Decimal,
    value: Decimal,
    order_date: NaiveDate,
}

impl OrderRow {
    fn into_record(self, channel: Channel) -> OrderRecord {
        OrderRecord {
            product_id: ProductId::new(self.product_id),
            variant: self.variant,
            customer: self.customer,
            country: self.country,
            quantity: self.quantity,
            value: self.value,
            date: self.order_date,
            channel,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    product_id: String,
    month: NaiveDate,
    opening_stock: Decimal,
    closing_stock: Decimal,
    sales: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct DemandRow {
    product_id: String,
    month: NaiveDate,
    demand_quantity: Decimal,
}

impl ErpDataService {
    /// Pick the configured source
    pub fn new(state: &AppState) -> AppResult<Self> {
        let source = match state.config.data_source {
            DataSourceKind::Database => Source::Database(state.db.clone()),
            DataSourceKind::ErpApi => Source::Api(state.erp_client.clone().ok_or_else(|| {
                AppError::Configuration("data_source is erp_api but no ERP client is set".to_string())
            })?),
        };

        Ok(Self {
            source,
            options: state.config.analytics.normalize_options(),
        })
    }

    /// Everything at once
    pub async fn load(&self) -> AppResult<ErpDataset> {
        let (orders, inventory, demand) =
            tokio::try_join!(self.load_orders(), self.load_inventory(), self.load_demand())?;

        tracing::debug!(
            orders = orders.len(),
            inventory = inventory.len(),
            demand = demand.len(),
            "Loaded ERP dataset"
        );

        Ok(ErpDataset {
            orders,
            inventory,
            demand,
        })
    }

    /// Export and local orders
    pub async fn load_orders(&self) -> AppResult<Vec<OrderRecord>> {
        match &self.source {
            Source::Database(db) => {
                let mut orders = Self::order_rows(db, "export_orders", Channel::Export).await?;
                orders.extend(Self::order_rows(db, "local_orders", Channel::Local).await?);
                Ok(orders)
            }
            Source::Api(client) => {
                let (export, local) = tokio::try_join!(
                    client.fetch_rows(ErpResource::ExportOrders),
                    client.fetch_rows(ErpResource::LocalOrders)
                )?;

                let mut orders = self.accept(
                    "export orders",
                    normalize_orders(&export, Some(Channel::Export), self.options),
                );
                orders.extend(self.accept(
                    "local orders",
                    normalize_orders(&local, Some(Channel::Local), self.options),
                ));
                Ok(orders)
            }
        }
    }

    pub async fn load_inventory(&self) -> AppResult<Vec<InventorySnapshot>> {
        match &self.source {
            Source::Database(db) => {
                let rows = sqlx::query_as::<_, InventoryRow>(
                    r#"
                    SELECT product_id, month, opening_stock, closing_stock, sales
                    FROM inventory_snapshots
                    ORDER BY month, product_id
                    "#,
                )
                .fetch_all(db)
                .await?;

                Ok(rows
                    .into_iter()
                    .map(|row| InventorySnapshot {
                        product_id: ProductId::new(row.product_id),
                        month: ReportingMonth::from_date(row.month),
                        opening_stock: row.opening_stock,
                        closing_stock: row.closing_stock,
                        sales: row.sales,
                    })
                    .collect())
            }
            Source::Api(client) => {
                let rows = client.fetch_rows(ErpResource::Inventory).await?;
                Ok(self.accept("inventory", normalize_inventory(&rows, self.options)))
            }
        }
    }

    pub async fn load_demand(&self) -> AppResult<Vec<DemandRecord>> {
        match &self.source {
            Source::Database(db) => {
                let rows = sqlx::query_as::<_, DemandRow>(
                    r#"
                    SELECT product_id, month, demand_quantity
                    FROM demand_forecasts
                    ORDER BY month, product_id
                    "#,
                )
                .fetch_all(db)
                .await?;

                Ok(rows
                    .into_iter()
                    .map(|row| DemandRecord {
                        product_id: ProductId::new(row.product_id),
                        month: ReportingMonth::from_date(row.month),
                        demand_quantity: row.demand_quantity,
                    })
                    .collect())
            }
            Source::Api(client) => {
                let rows = client.fetch_rows(ErpResource::Demand).await?;
                Ok(self.accept("demand", normalize_demand(&rows, self.options)))
            }
        }
    }

    async fn order_rows(db: &PgPool, table: &str, channel: Channel) -> AppResult<Vec<OrderRecord>> {
        let query = format!(
            r#"
            SELECT product_id, variant, customer, country, quantity, value, order_date
            FROM {}
            ORDER BY order_date, id
            "#,
            table
        );

        let rows = sqlx::query_as::<_, OrderRow>(&query).fetch_all(db).await?;
        Ok(rows.into_iter().map(|row| row.into_record(channel)).collect())
    }

    /// Keep normalized records; report what was coerced or rejected
    fn accept<T>(&self, what: &str, normalized: Normalized<T>) -> Vec<T> {
        if !normalized.warnings.is_empty() {
            tracing::warn!(
                source = what,
                coerced = normalized.warnings.len(),
                "ERP rows had fields coerced to zero"
            );
        }
        for issue in &normalized.rejected {
            tracing::warn!(source = what, row = issue.row, "Rejected ERP row: {}", issue.message);
        }
        normalized.records
    }
}
