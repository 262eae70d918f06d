//! Sales recommendation tests
//!
//! - Excess stock is never negative
//! - Recommended sales plus excess equals stock on hand
//! - Urgency and price thresholds

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    apply_scope, classify_urgency, generate_sales_recommendations, recommend_price,
    sales_recommendation, sort_by_urgency, PriceRecommendation, ProductId, RecommendationScope,
    RecommendedAction, Urgency,
};
use std::collections::HashMap;
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn quantities(entries: &[(&str, &str)]) -> HashMap<ProductId, Decimal> {
    entries
        .iter()
        .map(|(product, quantity)| (ProductId::new(*product), dec(quantity)))
        .collect()
}

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|n| Decimal::new(n, 3))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_overstocked_product() {
        let rec = sales_recommendation(ProductId::new("PSF-01"), dec("1000"), dec("500"));

        assert_eq!(rec.safety_stock, dec("100"));
        assert_eq!(rec.recommended_sales, dec("600"));
        assert_eq!(rec.excess_stock, dec("400"));
        assert_eq!(rec.recommended_action, RecommendedAction::Liquidate);
        assert_eq!(rec.urgency, Urgency::Medium);
        assert_eq!(rec.price_recommendation, PriceRecommendation::Decrease);
    }

    #[test]
    fn test_short_stock() {
        let rec = sales_recommendation(ProductId::new("PSF-01"), dec("300"), dec("500"));

        assert_eq!(rec.recommended_sales, dec("300"));
        assert_eq!(rec.excess_stock, Decimal::ZERO);
        assert_eq!(rec.recommended_action, RecommendedAction::Replenish);
        assert_eq!(rec.urgency, Urgency::Low);
        assert_eq!(rec.price_recommendation, PriceRecommendation::Increase);
    }

    #[test]
    fn test_stock_within_safety_margin() {
        let rec = sales_recommendation(ProductId::new("PSF-01"), dec("550"), dec("500"));

        assert_eq!(rec.excess_stock, Decimal::ZERO);
        assert_eq!(rec.recommended_action, RecommendedAction::Hold);
        assert_eq!(rec.price_recommendation, PriceRecommendation::Maintain);
    }

    #[test]
    fn test_stock_without_demand_is_all_excess() {
        let rec = sales_recommendation(ProductId::new("PSF-09"), dec("80"), Decimal::ZERO);

        assert_eq!(rec.excess_stock, dec("80"));
        assert_eq!(rec.recommended_sales, Decimal::ZERO);
        assert_eq!(rec.urgency, Urgency::High);
    }

    #[test]
    fn test_urgency_boundaries() {
        assert_eq!(classify_urgency(dec("50"), dec("100")), Urgency::Medium);
        assert_eq!(classify_urgency(dec("50.1"), dec("100")), Urgency::High);
        assert_eq!(classify_urgency(dec("20"), dec("100")), Urgency::Low);
        assert_eq!(classify_urgency(dec("20.1"), dec("100")), Urgency::Medium);
    }

    #[test]
    fn test_price_boundaries() {
        assert_eq!(recommend_price(dec("150"), dec("100")), PriceRecommendation::Maintain);
        assert_eq!(recommend_price(dec("150.1"), dec("100")), PriceRecommendation::Decrease);
        assert_eq!(recommend_price(dec("80"), dec("100")), PriceRecommendation::Maintain);
        assert_eq!(recommend_price(dec("79.9"), dec("100")), PriceRecommendation::Increase);
    }

    #[test]
    fn test_excess_scope_and_urgency_order() {
        let stock = quantities(&[("A", "100"), ("B", "1000"), ("C", "130")]);
        let demand = quantities(&[("A", "100"), ("B", "100"), ("C", "100"), ("D", "50")]);

        let all = generate_sales_recommendations(&stock, &demand);
        assert_eq!(all.len(), 4);

        let mut excess = apply_scope(all, RecommendationScope::ExcessOnly);
        sort_by_urgency(&mut excess);

        let products: Vec<&str> = excess.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(products, vec!["B", "C"]);
        assert_eq!(excess[0].urgency, Urgency::High);
        assert_eq!(excess[1].excess_stock, dec("10"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Excess is never negative and never exceeds stock
    #[test]
    fn prop_excess_non_negative(stock in quantity_strategy(), demand in quantity_strategy()) {
        let rec = sales_recommendation(ProductId::new("P1"), stock, demand);

        prop_assert!(rec.excess_stock >= Decimal::ZERO);
        prop_assert!(rec.excess_stock <= stock);
    }

    /// What is sold plus what is left over is what is on hand
    #[test]
    fn prop_sales_and_excess_partition_stock(
        stock in quantity_strategy(),
        demand in quantity_strategy(),
    ) {
        let rec = sales_recommendation(ProductId::new("P1"), stock, demand);
        prop_assert_eq!(rec.recommended_sales + rec.excess_stock, stock);
    }

    /// Liquidation is recommended exactly when there is excess
    #[test]
    fn prop_liquidate_iff_excess(stock in quantity_strategy(), demand in quantity_strategy()) {
        let rec = sales_recommendation(ProductId::new("P1"), stock, demand);
        prop_assert_eq!(
            rec.recommended_action == RecommendedAction::Liquidate,
            rec.excess_stock > Decimal::ZERO
        );
    }

    /// Nothing to liquidate is never urgent, even with stock below zero
    #[test]
    fn prop_urgency_needs_excess(
        stock in (-1_000_000i64..1_000_000i64).prop_map(Decimal::from),
        demand in quantity_strategy(),
    ) {
        let rec = sales_recommendation(ProductId::new("P1"), stock, demand);
        if rec.excess_stock.is_zero() {
            prop_assert_eq!(rec.urgency, Urgency::Low);
        }
        prop_assert!(rec.recommended_sales >= Decimal::ZERO);
    }

    /// Recomputing from the same inputs gives the same answer
    #[test]
    fn prop_recommendation_idempotent(stock in quantity_strategy(), demand in quantity_strategy()) {
        let first = sales_recommendation(ProductId::new("P1"), stock, demand);
        let second = sales_recommendation(ProductId::new("P1"), stock, demand);
        prop_assert_eq!(first, second);
    }
}
