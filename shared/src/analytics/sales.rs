//! Sales and liquidation recommendations

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;

use crate::models::{
    classify_urgency, recommend_price, ProductId, RecommendationScope, RecommendedAction,
    SalesRecommendation, SAFETY_STOCK_RATIO,
};

/// Recommendation for one product.
///
/// Negative stock (booked adjustments) counts as an empty shelf for every
/// rule; `current_stock` still reports the figure as given.
pub fn sales_recommendation(product_id: ProductId, stock: Decimal, demand: Decimal) -> SalesRecommendation {
    let on_hand = stock.max(Decimal::ZERO);
    let safety_stock = demand.saturating_mul(SAFETY_STOCK_RATIO);
    let covered = demand.saturating_add(safety_stock);
    let recommended_sales = on_hand.min(covered);
    let excess_stock = on_hand.saturating_sub(covered).max(Decimal::ZERO);

    let recommended_action = if excess_stock > Decimal::ZERO {
        RecommendedAction::Liquidate
    } else if on_hand < demand {
        RecommendedAction::Replenish
    } else {
        RecommendedAction::Hold
    };

    SalesRecommendation {
        product_id,
        current_stock: stock,
        demand,
        safety_stock,
        recommended_sales,
        excess_stock,
        recommended_action,
        urgency: classify_urgency(excess_stock, on_hand),
        price_recommendation: recommend_price(on_hand, demand),
    }
}

/// Recommendations for every product that has stock or demand.
///
/// Products without excess are included; filter with [`apply_scope`].
/// Missing entries on either side count as zero. Sorted by product.
pub fn generate_sales_recommendations(
    stock: &HashMap<ProductId, Decimal>,
    demand: &HashMap<ProductId, Decimal>,
) -> Vec<SalesRecommendation> {
    let products: BTreeSet<&ProductId> = stock.keys().chain(demand.keys()).collect();

    products
        .into_iter()
        .map(|product| {
            let stock = stock.get(product).copied().unwrap_or(Decimal::ZERO);
            let demand = demand.get(product).copied().unwrap_or(Decimal::ZERO);
            sales_recommendation(product.clone(), stock, demand)
        })
        .collect()
}

/// Filter recommendations to the caller's scope
pub fn apply_scope(
    recommendations: Vec<SalesRecommendation>,
    scope: RecommendationScope,
) -> Vec<SalesRecommendation> {
    match scope {
        RecommendationScope::All => recommendations,
        RecommendationScope::ExcessOnly => recommendations
            .into_iter()
            .filter(|r| r.excess_stock > Decimal::ZERO)
            .collect(),
    }
}

/// Sort for display: most urgent first, then by excess
pub fn sort_by_urgency(recommendations: &mut [SalesRecommendation]) {
    recommendations.sort_by(|a, b| {
        b.urgency
            .cmp(&a.urgency)
            .then_with(|| b.excess_stock.cmp(&a.excess_stock))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
}
