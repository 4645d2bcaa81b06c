use std::sync::Arc;

use thiserror::Error;

use fieldstock_core::{EntryId, ExpectedVersion, ItemId, Location, TransferId, Versioned};
use fieldstock_inventory::{PendingTransfer, StockLocationItem, UsageRecord};
use fieldstock_purchasing::PurchaseOrder;

/// Ledger persistence error.
///
/// These are **infrastructure errors** as opposed to domain errors: the
/// request was valid but the store could not commit it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A write was computed from a stale version of its record.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// A write would break a uniqueness rule (e.g. two entries for one item/location).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend could not be reached or failed mid-commit.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One write inside a `ChangeSet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    PutEntry {
        entry: StockLocationItem,
        expected: ExpectedVersion,
    },
    DeleteEntry {
        id: EntryId,
        expected: ExpectedVersion,
    },
    AppendUsage(UsageRecord),
    PutTransfer {
        transfer: PendingTransfer,
        expected: ExpectedVersion,
    },
    InsertPurchaseOrder(PurchaseOrder),
}

/// Writes committed together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry that must not exist yet.
    pub fn insert_entry(mut self, entry: StockLocationItem) -> Self {
        self.changes.push(Change::PutEntry {
            entry,
            expected: ExpectedVersion::Absent,
        });
        self
    }

    /// Replace an entry last read at `previous` (the version before the mutation).
    pub fn update_entry(mut self, entry: StockLocationItem, previous: &StockLocationItem) -> Self {
        self.changes.push(Change::PutEntry {
            entry,
            expected: ExpectedVersion::Exact(previous.version()),
        });
        self
    }

    pub fn delete_entry(mut self, entry: &StockLocationItem) -> Self {
        self.changes.push(Change::DeleteEntry {
            id: entry.id_typed(),
            expected: ExpectedVersion::Exact(entry.version()),
        });
        self
    }

    pub fn append_usage(mut self, record: UsageRecord) -> Self {
        self.changes.push(Change::AppendUsage(record));
        self
    }

    pub fn insert_transfer(mut self, transfer: PendingTransfer) -> Self {
        self.changes.push(Change::PutTransfer {
            transfer,
            expected: ExpectedVersion::Absent,
        });
        self
    }

    pub fn update_transfer(
        mut self,
        transfer: PendingTransfer,
        previous: &PendingTransfer,
    ) -> Self {
        self.changes.push(Change::PutTransfer {
            transfer,
            expected: ExpectedVersion::Exact(previous.version()),
        });
        self
    }

    pub fn insert_purchase_order(mut self, order: PurchaseOrder) -> Self {
        self.changes.push(Change::InsertPurchaseOrder(order));
        self
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Transactional persistence for the ledger and its records.
///
/// ## Commit Semantics
///
/// `commit()` must be all-or-nothing: every expectation in the change set is
/// checked before anything is written, and a failure leaves the store exactly
/// at its previous committed state. That is what lets callers compute the next
/// state on copies and never roll back in memory.
///
/// ## Write Serialization
///
/// Entry and transfer writes carry the version they were computed from. Two
/// writers racing on the same record both pass domain validation, but only the
/// first commit matches; the second gets `StoreError::Concurrency`.
///
/// ## Reads
///
/// Reads return snapshots. Listing order is stable (by id, which is
/// time-ordered) so repeated scans of an unchanged ledger agree.
pub trait LedgerStore: Send + Sync {
    fn entry(&self, id: &EntryId) -> Result<Option<StockLocationItem>, StoreError>;

    fn find_entry(
        &self,
        item_id: &ItemId,
        location: &Location,
    ) -> Result<Option<StockLocationItem>, StoreError>;

    fn entries(&self) -> Result<Vec<StockLocationItem>, StoreError>;

    fn entries_for_item(&self, item_id: &ItemId) -> Result<Vec<StockLocationItem>, StoreError>;

    fn entries_at(&self, location: &Location) -> Result<Vec<StockLocationItem>, StoreError>;

    /// Usage history of one item, oldest first.
    fn usage_records(&self, item_id: &ItemId) -> Result<Vec<UsageRecord>, StoreError>;

    fn pending_transfer(&self, id: &TransferId) -> Result<Option<PendingTransfer>, StoreError>;

    fn pending_transfers(&self) -> Result<Vec<PendingTransfer>, StoreError>;

    fn purchase_orders(&self) -> Result<Vec<PurchaseOrder>, StoreError>;

    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn entry(&self, id: &EntryId) -> Result<Option<StockLocationItem>, StoreError> {
        (**self).entry(id)
    }

    fn find_entry(
        &self,
        item_id: &ItemId,
        location: &Location,
    ) -> Result<Option<StockLocationItem>, StoreError> {
        (**self).find_entry(item_id, location)
    }

    fn entries(&self) -> Result<Vec<StockLocationItem>, StoreError> {
        (**self).entries()
    }

    fn entries_for_item(&self, item_id: &ItemId) -> Result<Vec<StockLocationItem>, StoreError> {
        (**self).entries_for_item(item_id)
    }

    fn entries_at(&self, location: &Location) -> Result<Vec<StockLocationItem>, StoreError> {
        (**self).entries_at(location)
    }

    fn usage_records(&self, item_id: &ItemId) -> Result<Vec<UsageRecord>, StoreError> {
        (**self).usage_records(item_id)
    }

    fn pending_transfer(&self, id: &TransferId) -> Result<Option<PendingTransfer>, StoreError> {
        (**self).pending_transfer(id)
    }

    fn pending_transfers(&self) -> Result<Vec<PendingTransfer>, StoreError> {
        (**self).pending_transfers()
    }

    fn purchase_orders(&self) -> Result<Vec<PurchaseOrder>, StoreError> {
        (**self).purchase_orders()
    }

    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        (**self).commit(changes)
    }
}
