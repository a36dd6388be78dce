//! Statistics aggregator - reduces inventory records to dashboard totals

use std::collections::BTreeMap;

use crate::entities::{DashboardStats, InventoryRecord};

/// Summarize a record list in a single pass
pub fn aggregate(records: &[InventoryRecord]) -> DashboardStats {
    let mut stats = DashboardStats {
        total_items: records.len(),
        ..DashboardStats::default()
    };
    let mut stock_by_location: BTreeMap<String, f64> = BTreeMap::new();

    for record in records {
        stats.total_stock += record.stock;
        stats.total_order_amount += record.order_amount;
        if record.is_below_par {
            stats.items_below_par += 1;
        }
        *stock_by_location.entry(record.location.clone()).or_insert(0.0) += record.stock;
    }

    stats.locations = stock_by_location.keys().cloned().collect();
    stats.stock_by_location = stock_by_location;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(location: &str, name: &str, stock: f64, par: f64, order: f64) -> InventoryRecord {
        InventoryRecord::new(location, location, name).with_quantities(stock, par, order)
    }

    #[test]
    fn test_empty_input() {
        let stats = aggregate(&[]);
        assert_eq!(stats, DashboardStats::default());
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.total_stock, 0.0);
        assert_eq!(stats.items_below_par, 0);
        assert_eq!(stats.total_order_amount, 0.0);
        assert!(stats.locations.is_empty());
        assert!(stats.stock_by_location.is_empty());
    }

    #[test]
    fn test_totals_and_locations() {
        let records = vec![
            record("Trailer", "Widget", 5.0, 10.0, 5.0),
            record("Garage", "Rake", 2.0, 1.0, 0.0),
            record("Trailer", "Gadget", 1.5, 1.0, 2.0),
            record("Attic", "Box", 0.0, 3.0, 3.0),
        ];
        let stats = aggregate(&records);

        assert_eq!(stats.total_items, 4);
        assert_eq!(stats.total_stock, 8.5);
        assert_eq!(stats.items_below_par, 2);
        assert_eq!(stats.total_order_amount, 10.0);
        assert_eq!(stats.locations, vec!["Attic", "Garage", "Trailer"]);
        assert_eq!(stats.stock_at("Trailer"), 6.5);
        assert_eq!(stats.stock_at("Garage"), 2.0);
        assert_eq!(stats.stock_at("Attic"), 0.0);
        assert_eq!(stats.stock_at("Cellar"), 0.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let stats = aggregate(&[record("Trailer", "Widget", 5.0, 10.0, 5.0)]);
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["totalItems"], 1);
        assert_eq!(json["itemsBelowPar"], 1);
        assert_eq!(json["totalOrderAmount"], 5.0);
        assert_eq!(json["stockByLocation"]["Trailer"], 5.0);
        assert_eq!(json["locations"][0], "Trailer");
    }

    fn records_strategy() -> impl Strategy<Value = Vec<InventoryRecord>> {
        let location = prop::sample::select(vec!["Trailer", "Garage", "Attic", "Unknown", "Van"]);
        prop::collection::vec((location, 0u32..100, 0u32..100, 0u32..20), 0..40).prop_map(|items| {
            items
                .into_iter()
                .map(|(loc, stock, par, order)| {
                    record(loc, "Item", f64::from(stock), f64::from(par), f64::from(order))
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: totals match the records they were computed from.
        #[test]
        fn totals_match_records(records in records_strategy()) {
            let stats = aggregate(&records);
            prop_assert_eq!(stats.total_items, records.len());
            prop_assert_eq!(stats.total_stock, records.iter().map(|r| r.stock).sum::<f64>());
            prop_assert_eq!(
                stats.items_below_par,
                records.iter().filter(|r| r.is_below_par).count()
            );
            prop_assert_eq!(
                stats.total_order_amount,
                records.iter().map(|r| r.order_amount).sum::<f64>()
            );
        }

        /// Property: locations are sorted, unique, and exactly the record locations.
        #[test]
        fn locations_are_sorted_distinct(records in records_strategy()) {
            let stats = aggregate(&records);
            prop_assert!(stats.locations.windows(2).all(|w| w[0] < w[1]));

            let mut expected: Vec<String> = records.iter().map(|r| r.location.clone()).collect();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(&stats.locations, &expected);
            prop_assert_eq!(
                stats.stock_by_location.keys().cloned().collect::<Vec<_>>(),
                expected
            );
        }
    }
}
