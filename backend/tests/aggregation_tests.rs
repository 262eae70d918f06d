//! Order aggregation tests
//!
//! - Totals are preserved by every grouping dimension
//! - Ranking and month scoping of order aggregates

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    aggregate_orders, monthly_trend, orders_in_month, ranked, summarize_orders, top_n, Channel,
    Dimension, GroupKey, OrderRecord, ProductId, ReportingMonth,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn order(
    product: &str,
    customer: &str,
    quantity: &str,
    value: &str,
    date: &str,
    channel: Channel,
) -> OrderRecord {
    OrderRecord {
        product_id: ProductId::new(product),
        variant: None,
        customer: customer.to_string(),
        country: match channel {
            Channel::Export => "Turkey".to_string(),
            Channel::Local => "India".to_string(),
        },
        quantity: dec(quantity),
        value: dec(value),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        channel,
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn channel_strategy() -> impl Strategy<Value = Channel> {
    prop_oneof![Just(Channel::Export), Just(Channel::Local)]
}

fn dimension_strategy() -> impl Strategy<Value = Dimension> {
    prop_oneof![
        Just(Dimension::Product),
        Just(Dimension::ProductVariant),
        Just(Dimension::Customer),
        Just(Dimension::Country),
        Just(Dimension::Month),
        Just(Dimension::Channel),
    ]
}

fn order_strategy() -> impl Strategy<Value = OrderRecord> {
    (
        "P[0-9]{1,2}",
        proptest::option::of("[A-D]"),
        "C[0-9]",
        "(Turkey|India|Egypt)",
        0i64..100_000,
        0i64..10_000_000,
        1u32..=12,
        1u32..=28,
        channel_strategy(),
    )
        .prop_map(
            |(product, variant, customer, country, quantity, value, month, day, channel)| {
                OrderRecord {
                    product_id: ProductId::new(product),
                    variant,
                    customer,
                    country,
                    quantity: Decimal::new(quantity, 2),
                    value: Decimal::new(value, 2),
                    date: NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
                    channel,
                }
            },
        )
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn sample_orders() -> Vec<OrderRecord> {
        vec![
            order("PSF-01", "Acme", "10", "15000", "2024-04-03", Channel::Export),
            order("PSF-01", "Acme", "5", "7500", "2024-05-10", Channel::Export),
            order("PSF-02", "Borel", "20", "18000", "2024-05-12", Channel::Local),
            order("PSF-03", "Cato", "2", "4000", "2024-05-20", Channel::Local),
        ]
    }

    #[test]
    fn test_group_by_product() {
        let groups = aggregate_orders(&sample_orders(), Dimension::Product);

        let psf01 = groups[&GroupKey::Product(ProductId::new("PSF-01"))];
        assert_eq!(psf01.quantity, dec("15"));
        assert_eq!(psf01.value, dec("22500"));
        assert_eq!(psf01.count, 2);
        assert_eq!(psf01.average_price(), dec("1500"));
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_ranking_by_value() {
        let aggregates = ranked(aggregate_orders(&sample_orders(), Dimension::Customer));
        let labels: Vec<&str> = aggregates.iter().map(|a| a.label.as_str()).collect();

        assert_eq!(labels, vec!["Acme", "Borel", "Cato"]);
    }

    #[test]
    fn test_month_grouping_is_calendar_ordered() {
        let aggregates = ranked(aggregate_orders(&sample_orders(), Dimension::Month));
        let labels: Vec<&str> = aggregates.iter().map(|a| a.label.as_str()).collect();

        assert_eq!(labels, vec!["2024-04", "2024-05"]);
    }

    #[test]
    fn test_top_n_truncates() {
        let top = top_n(&sample_orders(), Dimension::Product, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].key, GroupKey::Product(ProductId::new("PSF-01")));
    }

    #[test]
    fn test_summary_for_one_month() {
        let may = ReportingMonth::new(2024, 5).unwrap();
        let orders = orders_in_month(&sample_orders(), Some(may));
        let summary = summarize_orders(&orders, Some(may));

        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.total_quantity, dec("27"));
        assert_eq!(summary.total_value, dec("29500"));
        assert_eq!(summary.export.value, dec("7500"));
        assert_eq!(summary.local.value, dec("22000"));
        assert_eq!(summary.customer_count, 3);
        assert_eq!(summary.product_count, 3);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = summarize_orders(&[], None);
        assert_eq!(summary.order_count, 0);
        assert_eq!(summary.average_price, Decimal::ZERO);
        assert_eq!(summary.export_share, Decimal::ZERO);
    }

    #[test]
    fn test_monthly_trend_splits_channels() {
        let trend = monthly_trend(&sample_orders());
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].export.quantity, dec("10"));
        assert_eq!(trend[0].local.count, 0);
        assert_eq!(trend[1].local.quantity, dec("22"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Summing every group gives back the overall totals, whatever the dimension
    #[test]
    fn prop_grouping_preserves_totals(
        orders in proptest::collection::vec(order_strategy(), 0..60),
        dimension in dimension_strategy(),
    ) {
        let groups = aggregate_orders(&orders, dimension);

        let quantity: Decimal = groups.values().map(|t| t.quantity).sum();
        let value: Decimal = groups.values().map(|t| t.value).sum();
        let count: u64 = groups.values().map(|t| t.count).sum();

        prop_assert_eq!(quantity, orders.iter().map(|o| o.quantity).sum::<Decimal>());
        prop_assert_eq!(value, orders.iter().map(|o| o.value).sum::<Decimal>());
        prop_assert_eq!(count, orders.len() as u64);
    }

    /// No group is ever empty
    #[test]
    fn prop_groups_are_non_empty(
        orders in proptest::collection::vec(order_strategy(), 0..60),
        dimension in dimension_strategy(),
    ) {
        let groups = aggregate_orders(&orders, dimension);
        prop_assert!(groups.values().all(|t| t.count > 0));
        prop_assert!(groups.len() <= orders.len());
    }

    /// Export and local totals add up to the summary total
    #[test]
    fn prop_channel_split_adds_up(orders in proptest::collection::vec(order_strategy(), 0..60)) {
        let summary = summarize_orders(&orders, None);

        prop_assert_eq!(summary.export.value + summary.local.value, summary.total_value);
        prop_assert_eq!(summary.export.count + summary.local.count, summary.order_count);
        prop_assert!(summary.export_share >= Decimal::ZERO);
        prop_assert!(summary.export_share <= Decimal::ONE_HUNDRED);
    }
}
