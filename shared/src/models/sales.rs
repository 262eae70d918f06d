//! Sales recommendation models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// Safety buffer held on top of demand (20%)
pub const SAFETY_STOCK_RATIO: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Excess above this share of stock is urgent (50%)
pub const HIGH_URGENCY_RATIO: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Excess above this share of stock needs attention (20%)
pub const MEDIUM_URGENCY_RATIO: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Stock above demand times this factor calls for a price cut
pub const PRICE_DECREASE_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Stock below demand times this factor supports a price rise
pub const PRICE_INCREASE_FACTOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// How urgently excess stock should be moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Low => write!(f, "Low"),
            Urgency::Medium => write!(f, "Medium"),
            Urgency::High => write!(f, "High"),
        }
    }
}

/// Suggested price movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRecommendation {
    Decrease,
    Maintain,
    Increase,
}

impl std::fmt::Display for PriceRecommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceRecommendation::Decrease => write!(f, "Decrease"),
            PriceRecommendation::Maintain => write!(f, "Maintain"),
            PriceRecommendation::Increase => write!(f, "Increase"),
        }
    }
}

/// What the sales team should do with a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// Stock exceeds demand plus safety buffer
    Liquidate,
    /// Stock sits between demand and demand plus safety buffer
    Hold,
    /// Stock does not cover demand
    Replenish,
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendedAction::Liquidate => write!(f, "Liquidate excess stock"),
            RecommendedAction::Hold => write!(f, "Hold current stock"),
            RecommendedAction::Replenish => write!(f, "Replenish stock"),
        }
    }
}

/// Classify urgency from the excess share of stock (>50% high, >20% medium)
pub fn classify_urgency(excess_stock: Decimal, stock: Decimal) -> Urgency {
    if excess_stock > stock * HIGH_URGENCY_RATIO {
        Urgency::High
    } else if excess_stock > stock * MEDIUM_URGENCY_RATIO {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

/// Recommend a price move from stock cover (>1.5x decrease, <0.8x increase)
pub fn recommend_price(stock: Decimal, demand: Decimal) -> PriceRecommendation {
    if stock > demand.saturating_mul(PRICE_DECREASE_FACTOR) {
        PriceRecommendation::Decrease
    } else if stock < demand.saturating_mul(PRICE_INCREASE_FACTOR) {
        PriceRecommendation::Increase
    } else {
        PriceRecommendation::Maintain
    }
}

/// Which recommendations a caller wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationScope {
    /// Every product, including those without excess stock
    #[default]
    All,
    /// Only products with excess stock to liquidate
    ExcessOnly,
}

impl std::str::FromStr for RecommendationScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(RecommendationScope::All),
            "excess" | "excess_only" => Ok(RecommendationScope::ExcessOnly),
            other => Err(format!("unknown recommendation scope '{}'", other)),
        }
    }
}

/// Sales and liquidation recommendation for a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecommendation {
    pub product_id: ProductId,
    pub current_stock: Decimal,
    pub demand: Decimal,
    pub safety_stock: Decimal,
    pub recommended_sales: Decimal,
    /// Stock beyond demand plus safety buffer; equals the liquidation needed
    pub excess_stock: Decimal,
    pub recommended_action: RecommendedAction,
    pub urgency: Urgency,
    pub price_recommendation: PriceRecommendation,
}

impl SalesRecommendation {
    pub fn liquidation_needed(&self) -> Decimal {
        self.excess_stock
    }
}
