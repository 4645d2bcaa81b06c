//! Draft purchase order generation from warehouse deficiencies.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use fieldstock_core::{DomainResult, ItemId, PurchaseOrderId};
use fieldstock_inventory::{
    InventoryItem, StockLocationItem, StockPolicy, deficiency_quantity, is_deficient,
    recommended_order_quantity,
};

use crate::order::{PurchaseOrder, SupplierKey};

/// Order number format: `{prefix}-{yyyymmdd}-{8 hex chars}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNumbering {
    pub prefix: String,
}

impl Default for OrderNumbering {
    fn default() -> Self {
        Self {
            prefix: "PO".to_string(),
        }
    }
}

impl OrderNumbering {
    pub fn number_for(&self, id: PurchaseOrderId, now: DateTime<Utc>) -> String {
        // UUIDv7 leads with the timestamp; the tail is the random part.
        let simple = id.as_uuid().simple().to_string();
        let tail = &simple[simple.len() - 8..];
        format!(
            "{}-{}-{}",
            self.prefix,
            now.format("%Y%m%d"),
            tail.to_ascii_uppercase()
        )
    }
}

/// Batch warehouse deficiencies into one draft order per supplier.
///
/// Each item gets one line at its catalog price. The quantity is the sum of
/// what every deficient warehouse entry for the item needs, so a single low
/// warehouse orders the same amount its replenishment alert reports even when
/// another warehouse is well stocked. An item with no deficient warehouse
/// entry in `entries` falls back to `max(1, multiplier × reorder_point −
/// on_hand)` over its warehouse total. Vehicle stock is never counted.
///
/// Items repeated in `deficient` are ordered once. Orders come back sorted by
/// supplier, unknown supplier last; no input means no orders. A line that
/// cannot be priced (negative price, overflowing total) fails the whole batch.
pub fn generate<'a>(
    deficient: &[InventoryItem],
    entries: impl IntoIterator<Item = &'a StockLocationItem>,
    policy: &StockPolicy,
    numbering: &OrderNumbering,
    now: DateTime<Utc>,
) -> DomainResult<Vec<PurchaseOrder>> {
    if deficient.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_id: HashMap<ItemId, &InventoryItem> = HashMap::new();
    let mut groups: BTreeMap<SupplierKey, Vec<&InventoryItem>> = BTreeMap::new();
    for item in deficient {
        if by_id.insert(item.id, item).is_none() {
            groups
                .entry(SupplierKey::from(item.supplier_id))
                .or_default()
                .push(item);
        }
    }

    let mut on_hand: HashMap<ItemId, i64> = HashMap::new();
    let mut shortfall: HashMap<ItemId, i64> = HashMap::new();
    for entry in entries {
        if !entry.location().is_warehouse() {
            continue;
        }
        let Some(item) = by_id.get(&entry.item_id()) else {
            continue;
        };
        let total = on_hand.entry(item.id).or_insert(0);
        *total = total.saturating_add(entry.quantity());
        if is_deficient(entry, item) {
            let needed = shortfall.entry(item.id).or_insert(0);
            *needed = needed.saturating_add(deficiency_quantity(entry, item, policy));
        }
    }

    let mut orders = Vec::with_capacity(groups.len());
    for (supplier, items) in groups {
        let id = PurchaseOrderId::new();
        let mut order = PurchaseOrder::draft(id, numbering.number_for(id, now), supplier, now);

        for item in items {
            let quantity = match shortfall.get(&item.id) {
                Some(&needed) => needed,
                None => {
                    let stocked = on_hand.get(&item.id).copied().unwrap_or(0);
                    recommended_order_quantity(item, stocked, policy)
                }
            };
            order.add_line(item.id, quantity, item.unit_price)?;
        }

        orders.push(order);
    }

    tracing::debug!(
        items = by_id.len(),
        orders = orders.len(),
        "purchase orders generated"
    );
    Ok(orders)
}
