//! Replenishment scanning.
//!
//! Two threshold rules, one per location kind:
//! - warehouse entry: `quantity <= item.reorder_point`
//! - vehicle entry: `quantity <= entry.minimum_stock_level`
//!
//! Results are recomputed from the entries on every call; there is no cached
//! "needs replenishment" state to go stale.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldstock_core::{ItemId, Location, VehicleId};

use crate::entry::StockLocationItem;
use crate::item::{Catalog, InventoryItem};
use crate::policy::StockPolicy;

/// Threshold that applies to `entry`, given its catalog item.
pub fn threshold_for(entry: &StockLocationItem, item: &InventoryItem) -> i64 {
    match entry.location() {
        Location::Warehouse(_) => item.reorder_point,
        Location::Vehicle(_) => entry.minimum_stock_level(),
    }
}

pub fn is_deficient(entry: &StockLocationItem, item: &InventoryItem) -> bool {
    entry.quantity() <= threshold_for(entry, item)
}

/// Units to order so a warehouse holding `on_hand` gets back to
/// `multiplier × reorder_point`; always at least one.
pub fn recommended_order_quantity(item: &InventoryItem, on_hand: i64, policy: &StockPolicy) -> i64 {
    policy
        .reorder_multiplier
        .saturating_mul(item.reorder_point)
        .saturating_sub(on_hand)
        .max(1)
}

/// Units needed to refill a deficient entry.
///
/// Warehouses use the reorder recommendation; vehicles refill to their
/// maximum level when one is set, otherwise to `multiplier × minimum`.
pub fn deficiency_quantity(
    entry: &StockLocationItem,
    item: &InventoryItem,
    policy: &StockPolicy,
) -> i64 {
    match entry.location() {
        Location::Warehouse(_) => recommended_order_quantity(item, entry.quantity(), policy),
        Location::Vehicle(_) => {
            let target = entry.maximum_stock_level().unwrap_or_else(|| {
                policy
                    .reorder_multiplier
                    .saturating_mul(entry.minimum_stock_level())
            });
            target.saturating_sub(entry.quantity()).max(1)
        }
    }
}

/// Deficient items partitioned by where they are short.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentReport {
    /// Items short in at least one warehouse, each listed once, in ledger order.
    pub warehouse: Vec<InventoryItem>,
    /// Items short per vehicle.
    pub vehicles: BTreeMap<VehicleId, Vec<InventoryItem>>,
}

impl ReplenishmentReport {
    pub fn is_empty(&self) -> bool {
        self.warehouse.is_empty() && self.vehicles.is_empty()
    }

    pub fn vehicle(&self, vehicle_id: &VehicleId) -> &[InventoryItem] {
        self.vehicles
            .get(vehicle_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn warehouse_item_ids(&self) -> Vec<ItemId> {
        self.warehouse.iter().map(|i| i.id).collect()
    }
}

/// Walk every entry once and collect deficiencies.
///
/// Entries whose item is missing from the catalog are skipped (logged).
pub fn scan<'a, C>(
    entries: impl IntoIterator<Item = &'a StockLocationItem>,
    catalog: &C,
) -> ReplenishmentReport
where
    C: Catalog + ?Sized,
{
    let mut items: HashMap<ItemId, Option<InventoryItem>> = HashMap::new();
    let mut report = ReplenishmentReport::default();
    let mut warehouse_seen: HashSet<ItemId> = HashSet::new();
    let mut vehicle_seen: HashSet<(VehicleId, ItemId)> = HashSet::new();

    for entry in entries {
        let item = items
            .entry(entry.item_id())
            .or_insert_with(|| catalog.item(&entry.item_id()));
        let Some(item) = item.as_ref() else {
            tracing::warn!(
                item_id = %entry.item_id(),
                entry_id = %entry.id_typed(),
                "ledger entry references an item missing from the catalog; skipped"
            );
            continue;
        };

        if !is_deficient(entry, item) {
            continue;
        }

        match entry.location() {
            Location::Warehouse(_) => {
                if warehouse_seen.insert(item.id) {
                    report.warehouse.push(item.clone());
                }
            }
            Location::Vehicle(vehicle_id) => {
                if vehicle_seen.insert((vehicle_id, item.id)) {
                    report
                        .vehicles
                        .entry(vehicle_id)
                        .or_default()
                        .push(item.clone());
                }
            }
        }
    }

    report
}

/// One deficient location, as handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentAlert {
    pub item_id: ItemId,
    pub location: Location,
    pub quantity_on_hand: i64,
    pub threshold: i64,
    pub deficiency_quantity: i64,
    pub detected_at: DateTime<Utc>,
}

/// Per-item check run right after a usage or transfer touches `item`.
pub fn check_item<'a>(
    item: &InventoryItem,
    entries: impl IntoIterator<Item = &'a StockLocationItem>,
    policy: &StockPolicy,
    now: DateTime<Utc>,
) -> Vec<ReplenishmentAlert> {
    entries
        .into_iter()
        .filter(|e| e.item_id() == item.id && is_deficient(e, item))
        .map(|e| ReplenishmentAlert {
            item_id: item.id,
            location: e.location(),
            quantity_on_hand: e.quantity(),
            threshold: threshold_for(e, item),
            deficiency_quantity: deficiency_quantity(e, item, policy),
            detected_at: now,
        })
        .collect()
}
