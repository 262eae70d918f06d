//! CSV import of orders, inventory snapshots and demand forecasts

use std::str::FromStr;

use serde::Serialize;
use shared::{
    combine_demand, combine_snapshots, normalize_demand, normalize_inventory, normalize_orders,
    Channel, DemandRecord, InventorySnapshot, NormalizeOptions, Normalized, RawRow, RowIssue,
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppResult;

/// Record set an import writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Orders,
    Inventory,
    Demand,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Orders => "orders",
            ImportKind::Inventory => "inventory",
            ImportKind::Demand => "demand",
        }
    }
}

impl FromStr for ImportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orders" => Ok(ImportKind::Orders),
            "inventory" => Ok(ImportKind::Inventory),
            "demand" => Ok(ImportKind::Demand),
            other => Err(format!("unknown import kind '{}'", other)),
        }
    }
}

/// Outcome of one import
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub batch_id: Uuid,
    pub kind: ImportKind,
    pub total_rows: usize,
    pub accepted: usize,
    pub rejected: Vec<RowIssue>,
    pub warnings: Vec<RowIssue>,
}

/// Read CSV text into raw rows keyed by header.
///
/// Short rows are padded with empty fields; surrounding whitespace is
/// trimmed.
pub fn parse_csv(text: &str) -> AppResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.to_string(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Import service
#[derive(Clone)]
pub struct ImportService {
    db: PgPool,
    options: NormalizeOptions,
}

impl ImportService {
    pub fn new(db: PgPool, options: NormalizeOptions) -> Self {
        Self { db, options }
    }

    /// Normalize and store a CSV upload.
    ///
    /// Accepted rows are written in one transaction; rejected rows and
    /// coerced fields come back in the report.
    ///
    /// Inventory and demand rows sharing a product and month are summed
    /// within the upload, as the analytics do for API data. The summed row
    /// then replaces whatever an earlier upload stored for that month.
    pub async fn import_csv(
        &self,
        kind: ImportKind,
        text: &str,
        channel: Option<Channel>,
        user_id: Uuid,
    ) -> AppResult<ImportReport> {
        let rows = parse_csv(text)?;
        let mut tx = self.db.begin().await?;

        let (accepted, rejected, warnings) = match kind {
            ImportKind::Orders => {
                let normalized = normalize_orders(&rows, channel, self.options);
                Self::insert_orders(&mut tx, &normalized).await?;
                split(normalized)
            }
            ImportKind::Inventory => {
                let normalized = normalize_inventory(&rows, self.options);
                Self::insert_inventory(&mut tx, &combine_snapshots(&normalized.records)).await?;
                split(normalized)
            }
            ImportKind::Demand => {
                let normalized = normalize_demand(&rows, self.options);
                Self::insert_demand(&mut tx, &combine_demand(&normalized.records)).await?;
                split(normalized)
            }
        };

        let batch_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO import_batches (kind, total_rows, accepted_rows, rejected_rows, warning_count, imported_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(kind.as_str())
        .bind(rows.len() as i32)
        .bind(accepted as i32)
        .bind(rejected.len() as i32)
        .bind(warnings.len() as i32)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            %batch_id,
            kind = kind.as_str(),
            total = rows.len(),
            accepted,
            rejected = rejected.len(),
            warnings = warnings.len(),
            "Import completed"
        );

        Ok(ImportReport {
            batch_id,
            kind,
            total_rows: rows.len(),
            accepted,
            rejected,
            warnings,
        })
    }

    async fn insert_orders(
        tx: &mut Transaction<'_, Postgres>,
        normalized: &Normalized<shared::OrderRecord>,
    ) -> AppResult<()> {
        for order in &normalized.records {
            let table = match order.channel {
                Channel::Export => "export_orders",
                Channel::Local => "local_orders",
            };
            let query = format!(
                r#"
                INSERT INTO {} (product_id, variant, customer, country, quantity, value, order_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
                table
            );

            sqlx::query(&query)
                .bind(order.product_id.as_str())
                .bind(&order.variant)
                .bind(&order.customer)
                .bind(&order.country)
                .bind(order.quantity)
                .bind(order.value)
                .bind(order.date)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    async fn insert_inventory(
        tx: &mut Transaction<'_, Postgres>,
        snapshots: &[InventorySnapshot],
    ) -> AppResult<()> {
        for snapshot in snapshots {
            sqlx::query(
                r#"
                INSERT INTO inventory_snapshots (product_id, month, opening_stock, closing_stock, sales)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (product_id, month) DO UPDATE
                SET opening_stock = EXCLUDED.opening_stock,
                    closing_stock = EXCLUDED.closing_stock,
                    sales = EXCLUDED.sales,
                    updated_at = NOW()
                "#,
            )
            .bind(snapshot.product_id.as_str())
            .bind(snapshot.month.first_day())
            .bind(snapshot.opening_stock)
            .bind(snapshot.closing_stock)
            .bind(snapshot.sales)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn insert_demand(
        tx: &mut Transaction<'_, Postgres>,
        records: &[DemandRecord],
    ) -> AppResult<()> {
        for record in records {
            sqlx::query(
                r#"
                INSERT INTO demand_forecasts (product_id, month, demand_quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (product_id, month) DO UPDATE
                SET demand_quantity = EXCLUDED.demand_quantity,
                    updated_at = NOW()
                "#,
            )
            .bind(record.product_id.as_str())
            .bind(record.month.first_day())
            .bind(record.demand_quantity)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

fn split<T>(normalized: Normalized<T>) -> (usize, Vec<RowIssue>, Vec<RowIssue>) {
    (normalized.accepted(), normalized.rejected, normalized.warnings)
}
