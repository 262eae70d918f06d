//! Product identifiers and grouping keys

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Channel;
use crate::types::ReportingMonth;

/// ERP product code
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Product code plus an optional variant (e.g. yarn denier).
///
/// Kept as two fields so "AB" + "12" never collides with "A" + "B12".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductKey {
    pub product_id: ProductId,
    pub variant: Option<String>,
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{} / {}", self.product_id, variant),
            None => write!(f, "{}", self.product_id),
        }
    }
}

/// Dimension an order aggregate is grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Product,
    ProductVariant,
    Customer,
    Country,
    Month,
    Channel,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Product => "product",
            Dimension::ProductVariant => "product_variant",
            Dimension::Customer => "customer",
            Dimension::Country => "country",
            Dimension::Month => "month",
            Dimension::Channel => "channel",
        }
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Dimension::Product),
            "product_variant" | "variant" => Ok(Dimension::ProductVariant),
            "customer" => Ok(Dimension::Customer),
            "country" => Ok(Dimension::Country),
            "month" => Ok(Dimension::Month),
            "channel" => Ok(Dimension::Channel),
            other => Err(format!("unknown grouping dimension '{}'", other)),
        }
    }
}

/// Typed grouping key; one variant per [`Dimension`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "dimension", content = "value", rename_all = "snake_case")]
pub enum GroupKey {
    Product(ProductId),
    ProductVariant(ProductKey),
    Customer(String),
    Country(String),
    Month(ReportingMonth),
    Channel(Channel),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Product(id) => write!(f, "{}", id),
            GroupKey::ProductVariant(key) => write!(f, "{}", key),
            GroupKey::Customer(name) => write!(f, "{}", name),
            GroupKey::Country(name) => write!(f, "{}", name),
            GroupKey::Month(month) => write!(f, "{}", month),
            GroupKey::Channel(channel) => write!(f, "{}", channel.as_str()),
        }
    }
}

/// Running totals for one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub quantity: Decimal,
    pub value: Decimal,
    pub count: u64,
}

impl Totals {
    /// Add one order. Sums saturate at the `Decimal` range.
    pub fn add(&mut self, quantity: Decimal, value: Decimal) {
        self.quantity = self.quantity.saturating_add(quantity);
        self.value = self.value.saturating_add(value);
        self.count += 1;
    }

    /// Combine two groups' totals
    pub fn merge(&self, other: &Totals) -> Totals {
        Totals {
            quantity: self.quantity.saturating_add(other.quantity),
            value: self.value.saturating_add(other.value),
            count: self.count + other.count,
        }
    }

    /// Value per unit of quantity, zero when nothing was shipped
    pub fn average_price(&self) -> Decimal {
        self.value
            .checked_div(self.quantity)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Aggregated order metrics for one key of a grouping dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAggregate {
    pub key: GroupKey,
    pub label: String,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
    pub count: u64,
    pub average_price: Decimal,
}

impl ProductAggregate {
    pub fn new(key: GroupKey, totals: Totals) -> Self {
        Self {
            label: key.to_string(),
            key,
            total_quantity: totals.quantity,
            total_value: totals.value,
            count: totals.count,
            average_price: totals.average_price(),
        }
    }
}
