//! Stock status aggregation across locations.
//!
//! Everything here is a pure function of the entries passed in. Callers
//! recompute on every read; nothing is cached.

use serde::{Deserialize, Serialize};

use fieldstock_core::ItemId;

use crate::entry::StockLocationItem;
use crate::item::InventoryItem;
use crate::policy::StockPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
    OverStock,
}

/// Classify a quantity against an effective minimum.
///
/// - `0` → out of stock
/// - `0 < q <= min` → low stock
/// - `q > factor × min` → over stock
/// - otherwise in stock
pub fn classify(quantity: i64, effective_minimum: i64, policy: &StockPolicy) -> StockStatus {
    if quantity <= 0 {
        return StockStatus::OutOfStock;
    }
    if quantity <= effective_minimum {
        return StockStatus::LowStock;
    }
    if quantity > effective_minimum.saturating_mul(policy.over_stock_factor) {
        return StockStatus::OverStock;
    }
    StockStatus::InStock
}

/// Item-level view across every location holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    pub item_id: ItemId,
    pub total_quantity: i64,
    /// `total_quantity × unit_price`, in the smallest currency unit.
    pub total_value: i64,
    pub location_count: usize,
    pub effective_minimum: i64,
    pub status: StockStatus,
}

/// Aggregate the entries of `item`. Entries for other items are ignored.
pub fn summarize<'a>(
    item: &InventoryItem,
    entries: impl IntoIterator<Item = &'a StockLocationItem>,
    policy: &StockPolicy,
) -> StockSummary {
    let mut total_quantity: i64 = 0;
    let mut location_count = 0usize;
    let mut effective_minimum: Option<i64> = None;

    for entry in entries.into_iter().filter(|e| e.item_id() == item.id) {
        total_quantity = total_quantity.saturating_add(entry.quantity());
        location_count += 1;
        effective_minimum = Some(match effective_minimum {
            Some(m) => m.max(entry.minimum_stock_level()),
            None => entry.minimum_stock_level(),
        });
    }

    let effective_minimum = effective_minimum.unwrap_or(policy.status_default_minimum);

    StockSummary {
        item_id: item.id,
        total_quantity,
        total_value: total_quantity.saturating_mul(item.unit_price),
        location_count,
        effective_minimum,
        status: classify(total_quantity, effective_minimum, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fieldstock_core::{Location, VehicleId, WarehouseId};

    fn entry(
        item: &InventoryItem,
        location: Location,
        quantity: i64,
        min: i64,
    ) -> StockLocationItem {
        StockLocationItem::new(item.id, location, quantity, min, None, Utc::now()).unwrap()
    }

    #[test]
    fn totals_span_all_locations() {
        let item = InventoryItem::new(ItemId::new(), "Capacitor", 450, 5);
        let entries = vec![
            entry(&item, Location::Warehouse(WarehouseId::new()), 10, 5),
            entry(&item, Location::Vehicle(VehicleId::new()), 3, 2),
        ];

        let summary = summarize(&item, &entries, &StockPolicy::default());

        assert_eq!(summary.total_quantity, 13);
        assert_eq!(summary.total_value, 13 * 450);
        assert_eq!(summary.location_count, 2);
        assert_eq!(summary.effective_minimum, 5);
        assert_eq!(summary.status, StockStatus::InStock);
    }

    #[test]
    fn other_items_are_ignored() {
        let item = InventoryItem::new(ItemId::new(), "Fuse", 100, 1);
        let other = InventoryItem::new(ItemId::new(), "Relay", 100, 1);
        let entries = vec![entry(&other, Location::Warehouse(WarehouseId::new()), 50, 1)];

        let summary = summarize(&item, &entries, &StockPolicy::default());

        assert_eq!(summary.location_count, 0);
        assert_eq!(summary.status, StockStatus::OutOfStock);
    }

    #[test]
    fn no_entries_uses_default_minimum() {
        let item = InventoryItem::new(ItemId::new(), "Fuse", 100, 1);
        let summary = summarize(&item, std::iter::empty(), &StockPolicy::default());
        assert_eq!(summary.effective_minimum, 5);
        assert_eq!(summary.total_quantity, 0);
        assert_eq!(summary.status, StockStatus::OutOfStock);
    }

    #[test]
    fn boundaries() {
        let p = StockPolicy::default();
        assert_eq!(classify(0, 5, &p), StockStatus::OutOfStock);
        assert_eq!(classify(5, 5, &p), StockStatus::LowStock);
        assert_eq!(classify(6, 5, &p), StockStatus::InStock);
        assert_eq!(classify(15, 5, &p), StockStatus::InStock);
        assert_eq!(classify(16, 5, &p), StockStatus::OverStock);
        // A zero minimum makes any stock "over".
        assert_eq!(classify(1, 0, &p), StockStatus::OverStock);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: the four classes partition (Q, M) exactly as specified.
            #[test]
            fn classification_matches_thresholds(q in 0i64..10_000, m in 0i64..2_000) {
                let status = classify(q, m, &StockPolicy::default());
                prop_assert_eq!(status == StockStatus::OutOfStock, q == 0);
                prop_assert_eq!(status == StockStatus::LowStock, q > 0 && q <= m);
                prop_assert_eq!(status == StockStatus::OverStock, q > 0 && q > m && q > 3 * m);
                prop_assert_eq!(status == StockStatus::InStock, q > m && q <= 3 * m && q > 0);
            }

            /// Property: summary totals equal the plain sums over the item's entries.
            #[test]
            fn summary_totals_are_sums(
                quantities in proptest::collection::vec((0i64..500, 0i64..50), 0..12)
            ) {
                let item = InventoryItem::new(ItemId::new(), "Part", 37, 3);
                let entries: Vec<_> = quantities
                    .iter()
                    .map(|(q, m)| entry(&item, Location::Warehouse(WarehouseId::new()), *q, *m))
                    .collect();

                let summary = summarize(&item, &entries, &StockPolicy::default());
                let expected: i64 = quantities.iter().map(|(q, _)| *q).sum();

                prop_assert_eq!(summary.total_quantity, expected);
                prop_assert_eq!(summary.total_value, expected * 37);
                prop_assert_eq!(summary.location_count, entries.len());
            }
        }
    }
}
