use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use fieldstock_core::{EntryId, ItemId, Location, PurchaseOrderId, TransferId, Versioned};
use fieldstock_inventory::{PendingTransfer, StockLocationItem, UsageRecord};
use fieldstock_purchasing::PurchaseOrder;

use super::r#trait::{Change, ChangeSet, LedgerStore, StoreError};

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<EntryId, StockLocationItem>,
    /// Unique (item, location) index.
    by_location: HashMap<(ItemId, Location), EntryId>,
    usage: Vec<UsageRecord>,
    transfers: BTreeMap<TransferId, PendingTransfer>,
    orders: BTreeMap<PurchaseOrderId, PurchaseOrder>,
}

impl State {
    fn check(&self, change: &Change) -> Result<(), StoreError> {
        match change {
            Change::PutEntry { entry, expected } => {
                let current = self.entries.get(&entry.id_typed());
                if !expected.matches(current.map(|e| e.version())) {
                    return Err(StoreError::Concurrency(format!(
                        "entry {}: expected {expected:?}, found {:?}",
                        entry.id_typed(),
                        current.map(|e| e.version())
                    )));
                }
                if let Some(current) = current {
                    if current.item_id() != entry.item_id()
                        || current.location() != entry.location()
                    {
                        return Err(StoreError::Conflict(format!(
                            "entry {} cannot change item or location",
                            entry.id_typed()
                        )));
                    }
                }
                let key = (entry.item_id(), entry.location());
                if let Some(owner) = self.by_location.get(&key) {
                    if *owner != entry.id_typed() {
                        return Err(StoreError::Conflict(format!(
                            "item {} already has entry {owner} at {}",
                            entry.item_id(),
                            entry.location()
                        )));
                    }
                }
                Ok(())
            }
            Change::DeleteEntry { id, expected } => {
                let current = self.entries.get(id).map(|e| e.version());
                if current.is_none() || !expected.matches(current) {
                    return Err(StoreError::Concurrency(format!(
                        "entry {id}: expected {expected:?}, found {current:?}"
                    )));
                }
                Ok(())
            }
            Change::AppendUsage(_) => Ok(()),
            Change::PutTransfer { transfer, expected } => {
                let current = self.transfers.get(&transfer.id_typed()).map(|t| t.version());
                if !expected.matches(current) {
                    return Err(StoreError::Concurrency(format!(
                        "transfer {}: expected {expected:?}, found {current:?}",
                        transfer.id_typed()
                    )));
                }
                Ok(())
            }
            Change::InsertPurchaseOrder(order) => {
                if self.orders.contains_key(&order.id_typed()) {
                    return Err(StoreError::Conflict(format!(
                        "purchase order {} already exists",
                        order.id_typed()
                    )));
                }
                Ok(())
            }
        }
    }

    fn apply(&mut self, change: Change) {
        match change {
            Change::PutEntry { entry, .. } => {
                self.by_location
                    .insert((entry.item_id(), entry.location()), entry.id_typed());
                self.entries.insert(entry.id_typed(), entry);
            }
            Change::DeleteEntry { id, .. } => {
                if let Some(removed) = self.entries.remove(&id) {
                    self.by_location
                        .remove(&(removed.item_id(), removed.location()));
                }
            }
            Change::AppendUsage(record) => self.usage.push(record),
            Change::PutTransfer { transfer, .. } => {
                self.transfers.insert(transfer.id_typed(), transfer);
            }
            Change::InsertPurchaseOrder(order) => {
                self.orders.insert(order.id_typed(), order);
            }
        }
    }
}

/// In-memory transactional ledger store.
///
/// A single `RwLock` makes each commit atomic and serializes writers; readers
/// share the lock and get cloned snapshots.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> Result<T, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(f(&state))
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn entry(&self, id: &EntryId) -> Result<Option<StockLocationItem>, StoreError> {
        self.read(|s| s.entries.get(id).cloned())
    }

    fn find_entry(
        &self,
        item_id: &ItemId,
        location: &Location,
    ) -> Result<Option<StockLocationItem>, StoreError> {
        self.read(|s| {
            s.by_location
                .get(&(*item_id, *location))
                .and_then(|id| s.entries.get(id))
                .cloned()
        })
    }

    fn entries(&self) -> Result<Vec<StockLocationItem>, StoreError> {
        self.read(|s| s.entries.values().cloned().collect())
    }

    fn entries_for_item(&self, item_id: &ItemId) -> Result<Vec<StockLocationItem>, StoreError> {
        self.read(|s| {
            s.entries
                .values()
                .filter(|e| e.item_id() == *item_id)
                .cloned()
                .collect()
        })
    }

    fn entries_at(&self, location: &Location) -> Result<Vec<StockLocationItem>, StoreError> {
        self.read(|s| {
            s.entries
                .values()
                .filter(|e| e.location() == *location)
                .cloned()
                .collect()
        })
    }

    fn usage_records(&self, item_id: &ItemId) -> Result<Vec<UsageRecord>, StoreError> {
        self.read(|s| {
            s.usage
                .iter()
                .filter(|r| r.item_id == *item_id)
                .cloned()
                .collect()
        })
    }

    fn pending_transfer(&self, id: &TransferId) -> Result<Option<PendingTransfer>, StoreError> {
        self.read(|s| s.transfers.get(id).cloned())
    }

    fn pending_transfers(&self) -> Result<Vec<PendingTransfer>, StoreError> {
        self.read(|s| s.transfers.values().cloned().collect())
    }

    fn purchase_orders(&self) -> Result<Vec<PurchaseOrder>, StoreError> {
        self.read(|s| s.orders.values().cloned().collect())
    }

    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        // Validate everything first; nothing is written unless all checks pass.
        for change in changes.changes() {
            state.check(change)?;
        }

        for change in changes.into_changes() {
            state.apply(change);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fieldstock_core::{VehicleId, WarehouseId};
    use fieldstock_inventory::{UsageMetadata, record_usage};

    fn entry(quantity: i64) -> StockLocationItem {
        StockLocationItem::new(
            ItemId::new(),
            Location::Warehouse(WarehouseId::new()),
            quantity,
            1,
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn insert_then_find_by_location() {
        let store = InMemoryLedgerStore::new();
        let e = entry(5);
        store.commit(ChangeSet::new().insert_entry(e.clone())).unwrap();

        assert_eq!(store.find_entry(&e.item_id(), &e.location()).unwrap(), Some(e.clone()));
        assert_eq!(store.entry(&e.id_typed()).unwrap(), Some(e.clone()));
        assert_eq!(store.entries_for_item(&e.item_id()).unwrap().len(), 1);
        assert!(store.entries_at(&Location::Vehicle(VehicleId::new())).unwrap().is_empty());
    }

    #[test]
    fn second_entry_for_same_item_and_location_conflicts() {
        let store = InMemoryLedgerStore::new();
        let e = entry(5);
        store.commit(ChangeSet::new().insert_entry(e.clone())).unwrap();

        let twin =
            StockLocationItem::new(e.item_id(), e.location(), 1, 0, None, Utc::now()).unwrap();
        let err = store.commit(ChangeSet::new().insert_entry(twin)).unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn stale_write_is_rejected() {
        let store = InMemoryLedgerStore::new();
        let e = entry(10);
        store.commit(ChangeSet::new().insert_entry(e.clone())).unwrap();

        let (first, _) = record_usage(&e, 2, UsageMetadata::default(), Utc::now()).unwrap();
        let (second, _) = record_usage(&e, 3, UsageMetadata::default(), Utc::now()).unwrap();

        store.commit(ChangeSet::new().update_entry(first, &e)).unwrap();
        let err = store.commit(ChangeSet::new().update_entry(second, &e)).unwrap_err();

        assert!(matches!(err, StoreError::Concurrency(_)));
        assert_eq!(store.entry(&e.id_typed()).unwrap().unwrap().quantity(), 8);
    }

    #[test]
    fn failed_commit_writes_nothing() {
        let store = InMemoryLedgerStore::new();
        let e = entry(10);
        store.commit(ChangeSet::new().insert_entry(e.clone())).unwrap();

        let (next, record) = record_usage(&e, 4, UsageMetadata::default(), Utc::now()).unwrap();
        let doomed = ChangeSet::new()
            .append_usage(record)
            .update_entry(next.clone(), &next); // wrong expected version

        assert!(store.commit(doomed).is_err());
        assert!(store.usage_records(&e.item_id()).unwrap().is_empty());
        assert_eq!(store.entry(&e.id_typed()).unwrap().unwrap().quantity(), 10);
    }

    #[test]
    fn delete_frees_the_location_slot() {
        let store = InMemoryLedgerStore::new();
        let e = entry(0);
        store.commit(ChangeSet::new().insert_entry(e.clone())).unwrap();
        store.commit(ChangeSet::new().delete_entry(&e)).unwrap();

        assert!(store.entries().unwrap().is_empty());
        let again =
            StockLocationItem::new(e.item_id(), e.location(), 3, 0, None, Utc::now()).unwrap();
        store.commit(ChangeSet::new().insert_entry(again)).unwrap();
    }
}
