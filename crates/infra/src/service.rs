//! Ledger operations (application-level orchestration).
//!
//! Every mutating operation follows the same pipeline:
//!
//! ```text
//! validate input
//!   ↓
//! load current records (snapshot)
//!   ↓
//! decide next records (pure domain functions, inputs untouched)
//!   ↓
//! commit one ChangeSet (all-or-nothing, optimistic version checks)
//!   ↓
//! publish StockEvent(s) + per-item replenishment check
//! ```
//!
//! Nothing is written when validation or decision fails, and because the
//! domain functions work on copies, a failed commit leaves nothing to roll
//! back. The service keeps no mutable state of its own; concurrent callers
//! are serialized per record by the store.

use std::collections::BTreeMap;

use chrono::Utc;
use thiserror::Error;

use fieldstock_core::{
    DomainError, EntryId, ItemId, Location, TransferId, UserId, VehicleId,
};
use fieldstock_events::{Event, EventBus};
use fieldstock_inventory::{
    Catalog, EntryRemoved, EntryStocked, InventoryItem, PendingTransfer, PurchaseOrdersDrafted,
    QuantityAdjusted, ReplenishmentAlert, ReplenishmentReport, StockEvent, StockLocationItem,
    StockPolicy, StockSummary, StockTransferred, TransferOutcome, TransferRequest,
    TransferRequested, TransferResolved, TransferStatus, UsageMetadata, UsageRecord, check_item,
    ensure_positive, plan_transfer, record_usage, scan, summarize,
};
use fieldstock_purchasing::{OrderNumbering, PurchaseOrder, generate};

use crate::config::EngineConfig;
use crate::ledger_store::{ChangeSet, LedgerStore, StoreError};

#[derive(Debug, Error)]
pub enum StockServiceError {
    /// Rejected before any write.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store refused or failed the commit; nothing was written.
    #[error("persistence failure: {0}")]
    Store(#[from] StoreError),
}

impl StockServiceError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            StockServiceError::Domain(err) => Some(err),
            StockServiceError::Store(_) => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, StockServiceError>;

/// Input for stocking an item at a new location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub item_id: ItemId,
    pub location: Location,
    pub quantity: i64,
    pub minimum_stock_level: i64,
    pub maximum_stock_level: Option<i64>,
}

/// Stock ledger service.
///
/// - `S`: ledger persistence
/// - `C`: read-only catalog
/// - `B`: bus receiving `StockEvent`s after each commit (replenishment alerts
///   included; notification dispatch subscribes here)
#[derive(Debug)]
pub struct StockService<S, C, B> {
    store: S,
    catalog: C,
    bus: B,
    policy: StockPolicy,
    numbering: OrderNumbering,
}

impl<S, C, B> StockService<S, C, B> {
    pub fn new(store: S, catalog: C, bus: B) -> Self {
        Self::with_config(store, catalog, bus, &EngineConfig::default())
    }

    pub fn with_config(store: S, catalog: C, bus: B, config: &EngineConfig) -> Self {
        Self {
            store,
            catalog,
            bus,
            policy: config.policy.clone(),
            numbering: config.numbering(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn policy(&self) -> &StockPolicy {
        &self.policy
    }

    pub fn into_parts(self) -> (S, C, B) {
        (self.store, self.catalog, self.bus)
    }
}

impl<S, C, B> StockService<S, C, B>
where
    S: LedgerStore,
    C: Catalog,
    B: EventBus<StockEvent>,
{
    fn item(&self, item_id: &ItemId) -> ServiceResult<InventoryItem> {
        self.catalog
            .item(item_id)
            .ok_or_else(|| DomainError::not_found(format!("item {item_id}")).into())
    }

    fn entry(&self, entry_id: &EntryId) -> ServiceResult<StockLocationItem> {
        self.store
            .entry(entry_id)?
            .ok_or_else(|| DomainError::not_found(format!("ledger entry {entry_id}")).into())
    }

    fn located_entry(
        &self,
        item_id: ItemId,
        location: Location,
    ) -> ServiceResult<StockLocationItem> {
        self.store
            .find_entry(&item_id, &location)?
            .ok_or_else(|| DomainError::no_entry(item_id, location).into())
    }

    fn publish(&self, event: StockEvent) {
        let event_type = event.event_type();
        let routing_key = event.routing_key();
        if let Err(err) = self.bus.publish(event) {
            // The ledger is already committed; subscribers can recompute from the store.
            tracing::warn!(
                event_type,
                routing_key = %routing_key,
                error = ?err,
                "failed to publish stock event"
            );
        }
    }

    /// Post-commit replenishment check. Failures here never undo the commit
    /// that triggered it.
    fn notify_deficiencies(&self, item_id: ItemId) {
        if let Err(err) = self.check_item(&item_id) {
            tracing::warn!(item_id = %item_id, error = %err, "replenishment check failed");
        }
    }

    // ---------------------------------------------------------------------
    // Ledger maintenance
    // ---------------------------------------------------------------------

    /// Stock an item at a location for the first time.
    pub fn stock_item(&self, new: NewEntry) -> ServiceResult<StockLocationItem> {
        self.item(&new.item_id)?;
        if self.store.find_entry(&new.item_id, &new.location)?.is_some() {
            return Err(DomainError::DuplicateEntry {
                item_id: new.item_id,
                location: new.location,
            }
            .into());
        }

        let now = Utc::now();
        let entry = StockLocationItem::new(
            new.item_id,
            new.location,
            new.quantity,
            new.minimum_stock_level,
            new.maximum_stock_level,
            now,
        )?;

        self.store
            .commit(ChangeSet::new().insert_entry(entry.clone()))?;

        tracing::info!(
            item_id = %entry.item_id(),
            location = %entry.location(),
            quantity = entry.quantity(),
            "item stocked at new location"
        );
        self.publish(StockEvent::EntryStocked(EntryStocked {
            entry_id: entry.id_typed(),
            item_id: entry.item_id(),
            location: entry.location(),
            quantity: entry.quantity(),
            occurred_at: now,
        }));
        self.notify_deficiencies(entry.item_id());

        Ok(entry)
    }

    /// Replenishment fulfillment: add received units at a location, creating
    /// the entry when the item was not stocked there yet.
    pub fn restock(
        &self,
        item_id: ItemId,
        location: Location,
        quantity: i64,
    ) -> ServiceResult<StockLocationItem> {
        ensure_positive(quantity)?;
        self.item(&item_id)?;

        let now = Utc::now();
        let (next, changes, event) = match self.store.find_entry(&item_id, &location)? {
            Some(current) => {
                let mut next = current.clone();
                next.deposit(quantity, now)?;
                let event = StockEvent::QuantityAdjusted(QuantityAdjusted {
                    entry_id: next.id_typed(),
                    item_id,
                    location,
                    previous: current.quantity(),
                    quantity: next.quantity(),
                    reason: Some("restock".to_string()),
                    occurred_at: now,
                });
                let changes = ChangeSet::new().update_entry(next.clone(), &current);
                (next, changes, event)
            }
            None => {
                let mut next = StockLocationItem::empty_at(item_id, location, &self.policy, now);
                next.deposit(quantity, now)?;
                let event = StockEvent::EntryStocked(EntryStocked {
                    entry_id: next.id_typed(),
                    item_id,
                    location,
                    quantity: next.quantity(),
                    occurred_at: now,
                });
                let changes = ChangeSet::new().insert_entry(next.clone());
                (next, changes, event)
            }
        };

        self.store.commit(changes)?;

        tracing::info!(
            item_id = %item_id,
            location = %location,
            quantity,
            on_hand = next.quantity(),
            "restocked"
        );
        self.publish(event);

        Ok(next)
    }

    /// Manual count correction to an absolute quantity.
    pub fn adjust_quantity(
        &self,
        entry_id: &EntryId,
        quantity: i64,
        reason: Option<String>,
    ) -> ServiceResult<StockLocationItem> {
        let current = self.entry(entry_id)?;
        let now = Utc::now();
        let mut next = current.clone();
        next.set_quantity(quantity, now)?;

        self.store
            .commit(ChangeSet::new().update_entry(next.clone(), &current))?;

        tracing::info!(
            entry_id = %entry_id,
            previous = current.quantity(),
            quantity,
            "quantity adjusted"
        );
        self.publish(StockEvent::QuantityAdjusted(QuantityAdjusted {
            entry_id: *entry_id,
            item_id: next.item_id(),
            location: next.location(),
            previous: current.quantity(),
            quantity,
            reason,
            occurred_at: now,
        }));
        self.notify_deficiencies(next.item_id());

        Ok(next)
    }

    pub fn set_stock_levels(
        &self,
        entry_id: &EntryId,
        minimum_stock_level: i64,
        maximum_stock_level: Option<i64>,
    ) -> ServiceResult<StockLocationItem> {
        let current = self.entry(entry_id)?;
        let mut next = current.clone();
        next.set_stock_levels(minimum_stock_level, maximum_stock_level, Utc::now())?;

        self.store
            .commit(ChangeSet::new().update_entry(next.clone(), &current))?;

        tracing::info!(
            entry_id = %entry_id,
            minimum_stock_level,
            maximum_stock_level = ?maximum_stock_level,
            "stock levels updated"
        );
        self.notify_deficiencies(next.item_id());

        Ok(next)
    }

    /// Explicit operator removal. Entries are never removed implicitly.
    pub fn remove_entry(&self, entry_id: &EntryId) -> ServiceResult<StockLocationItem> {
        let current = self.entry(entry_id)?;
        self.store.commit(ChangeSet::new().delete_entry(&current))?;

        tracing::info!(
            entry_id = %entry_id,
            item_id = %current.item_id(),
            location = %current.location(),
            quantity = current.quantity(),
            "ledger entry removed"
        );
        self.publish(StockEvent::EntryRemoved(EntryRemoved {
            entry_id: *entry_id,
            item_id: current.item_id(),
            location: current.location(),
            occurred_at: Utc::now(),
        }));

        Ok(current)
    }

    /// Cascade for a deleted warehouse or vehicle: removes every entry at the
    /// location in one commit.
    pub fn remove_location(&self, location: &Location) -> ServiceResult<Vec<StockLocationItem>> {
        let entries = self.store.entries_at(location)?;
        if entries.is_empty() {
            return Ok(entries);
        }

        let changes = entries
            .iter()
            .fold(ChangeSet::new(), |changes, entry| changes.delete_entry(entry));
        self.store.commit(changes)?;

        tracing::info!(location = %location, removed = entries.len(), "location cleared");
        let now = Utc::now();
        for entry in &entries {
            self.publish(StockEvent::EntryRemoved(EntryRemoved {
                entry_id: entry.id_typed(),
                item_id: entry.item_id(),
                location: *location,
                occurred_at: now,
            }));
        }

        Ok(entries)
    }

    // ---------------------------------------------------------------------
    // Usage
    // ---------------------------------------------------------------------

    /// Record consumption of `quantity` units of `item_id` at `location`.
    ///
    /// The decrement and the usage record are committed together.
    pub fn record_usage(
        &self,
        item_id: ItemId,
        quantity: i64,
        location: Location,
        metadata: UsageMetadata,
    ) -> ServiceResult<UsageRecord> {
        ensure_positive(quantity)?;
        let current = self.located_entry(item_id, location)?;

        let (next, record) = record_usage(&current, quantity, metadata, Utc::now())?;

        self.store.commit(
            ChangeSet::new()
                .update_entry(next.clone(), &current)
                .append_usage(record.clone()),
        )?;

        tracing::info!(
            item_id = %item_id,
            location = %location,
            quantity,
            remaining = next.quantity(),
            "usage recorded"
        );
        self.publish(StockEvent::UsageRecorded(record.clone()));
        self.notify_deficiencies(item_id);

        Ok(record)
    }

    pub fn usage_history(&self, item_id: &ItemId) -> ServiceResult<Vec<UsageRecord>> {
        Ok(self.store.usage_records(item_id)?)
    }

    // ---------------------------------------------------------------------
    // Transfers
    // ---------------------------------------------------------------------

    fn plan(
        &self,
        item_id: ItemId,
        quantity: i64,
        from: Location,
        to: Location,
    ) -> ServiceResult<(TransferOutcome, ChangeSet)> {
        ensure_positive(quantity)?;
        let source = self.located_entry(item_id, from)?;
        let destination = self.store.find_entry(&item_id, &to)?;

        let outcome = plan_transfer(
            &source,
            destination.as_ref(),
            to,
            quantity,
            &self.policy,
            Utc::now(),
        )?;

        let changes = ChangeSet::new().update_entry(outcome.source.clone(), &source);
        let changes = match &destination {
            Some(previous) => changes.update_entry(outcome.destination.clone(), previous),
            None => changes.insert_entry(outcome.destination.clone()),
        };

        Ok((outcome, changes))
    }

    fn transferred(&self, outcome: &TransferOutcome, transfer_id: Option<TransferId>) {
        tracing::info!(
            item_id = %outcome.source.item_id(),
            from = %outcome.source.location(),
            to = %outcome.destination.location(),
            quantity = outcome.quantity,
            destination_created = outcome.destination_created,
            "stock transferred"
        );
        self.publish(StockEvent::StockTransferred(StockTransferred {
            item_id: outcome.source.item_id(),
            from: outcome.source.location(),
            to: outcome.destination.location(),
            quantity: outcome.quantity,
            transfer_id,
            occurred_at: outcome.destination.updated_at(),
        }));
        self.notify_deficiencies(outcome.source.item_id());
    }

    /// Immediate transfer between any two locations.
    pub fn transfer(
        &self,
        item_id: ItemId,
        quantity: i64,
        from: Location,
        to: Location,
    ) -> ServiceResult<TransferOutcome> {
        let (outcome, changes) = self.plan(item_id, quantity, from, to)?;
        self.store.commit(changes)?;
        self.transferred(&outcome, None);
        Ok(outcome)
    }

    /// Phase one of a warehouse → vehicle transfer. Validates against the
    /// current warehouse stock but does not touch the ledger.
    pub fn request_transfer(&self, request: TransferRequest) -> ServiceResult<PendingTransfer> {
        ensure_positive(request.quantity)?;
        let source = self.located_entry(request.item_id, Location::Warehouse(request.source))?;
        if source.quantity() < request.quantity {
            return Err(DomainError::insufficient(request.quantity, source.quantity()).into());
        }

        let now = Utc::now();
        let pending = PendingTransfer::request(request, now)?;
        self.store
            .commit(ChangeSet::new().insert_transfer(pending.clone()))?;

        tracing::info!(
            transfer_id = %pending.id_typed(),
            item_id = %pending.item_id(),
            vehicle_id = %pending.destination(),
            quantity = pending.quantity(),
            "transfer requested"
        );
        self.publish(StockEvent::TransferRequested(TransferRequested {
            transfer_id: pending.id_typed(),
            item_id: pending.item_id(),
            destination: pending.destination(),
            assigned_to: pending.assigned_to(),
            quantity: pending.quantity(),
            occurred_at: now,
        }));

        Ok(pending)
    }

    fn pending(&self, transfer_id: &TransferId) -> ServiceResult<PendingTransfer> {
        self.store
            .pending_transfer(transfer_id)?
            .ok_or_else(|| DomainError::not_found(format!("transfer {transfer_id}")).into())
    }

    /// A resolution failed after loading the transfer. If another caller
    /// resolved it in the meantime, that is the answer; otherwise the
    /// error stands.
    fn resolution_conflict(
        &self,
        transfer_id: &TransferId,
        err: StockServiceError,
    ) -> StockServiceError {
        match self.store.pending_transfer(transfer_id) {
            Ok(Some(current)) if current.status().is_terminal() => {
                DomainError::DuplicateTransferResolution {
                    transfer_id: *transfer_id,
                    status: current.status().to_string(),
                }
                .into()
            }
            _ => err,
        }
    }

    fn resolved(&self, transfer: &PendingTransfer) {
        tracing::info!(
            transfer_id = %transfer.id_typed(),
            status = %transfer.status(),
            "transfer resolved"
        );
        self.publish(StockEvent::TransferResolved(TransferResolved {
            transfer_id: transfer.id_typed(),
            status: transfer.status(),
            occurred_at: transfer.resolved_at().unwrap_or_else(Utc::now),
        }));
    }

    /// Phase two: apply the move and mark the transfer accepted, atomically.
    pub fn accept_transfer(
        &self,
        transfer_id: &TransferId,
        accepted_by: UserId,
    ) -> ServiceResult<(PendingTransfer, TransferOutcome)> {
        let pending = self.pending(transfer_id)?;
        let accepted = pending.accept(accepted_by, Utc::now())?;

        let outcome = self
            .plan(
                pending.item_id(),
                pending.quantity(),
                pending.source_location(),
                pending.destination_location(),
            )
            .and_then(|(outcome, changes)| {
                self.store
                    .commit(changes.update_transfer(accepted.clone(), &pending))?;
                Ok(outcome)
            })
            .map_err(|err| self.resolution_conflict(transfer_id, err))?;

        self.resolved(&accepted);
        self.transferred(&outcome, Some(*transfer_id));

        Ok((accepted, outcome))
    }

    pub fn reject_transfer(
        &self,
        transfer_id: &TransferId,
        rejected_by: UserId,
    ) -> ServiceResult<PendingTransfer> {
        let pending = self.pending(transfer_id)?;
        let rejected = pending.reject(rejected_by, Utc::now())?;

        self.store
            .commit(ChangeSet::new().update_transfer(rejected.clone(), &pending))
            .map_err(|err| self.resolution_conflict(transfer_id, err.into()))?;

        self.resolved(&rejected);
        Ok(rejected)
    }

    /// Transfers still waiting on a vehicle's technician.
    pub fn pending_transfers_for(
        &self,
        vehicle_id: &VehicleId,
    ) -> ServiceResult<Vec<PendingTransfer>> {
        Ok(self
            .store
            .pending_transfers()?
            .into_iter()
            .filter(|t| t.status() == TransferStatus::Pending && t.destination() == *vehicle_id)
            .collect())
    }

    // ---------------------------------------------------------------------
    // Status + replenishment (read-only, recomputed per call)
    // ---------------------------------------------------------------------

    pub fn entries_for_item(&self, item_id: &ItemId) -> ServiceResult<Vec<StockLocationItem>> {
        Ok(self.store.entries_for_item(item_id)?)
    }

    pub fn summary(&self, item_id: &ItemId) -> ServiceResult<StockSummary> {
        let item = self.item(item_id)?;
        let entries = self.store.entries_for_item(item_id)?;
        Ok(summarize(&item, &entries, &self.policy))
    }

    /// Summaries for every catalog item, from one ledger snapshot.
    pub fn summaries(&self) -> ServiceResult<Vec<StockSummary>> {
        let mut by_item: BTreeMap<ItemId, Vec<StockLocationItem>> = BTreeMap::new();
        for entry in self.store.entries()? {
            by_item.entry(entry.item_id()).or_default().push(entry);
        }

        Ok(self
            .catalog
            .items()
            .iter()
            .map(|item| {
                let entries = by_item.get(&item.id).map(Vec::as_slice).unwrap_or(&[]);
                summarize(item, entries, &self.policy)
            })
            .collect())
    }

    /// Full ledger scan.
    pub fn scan(&self) -> ServiceResult<ReplenishmentReport> {
        let entries = self.store.entries()?;
        Ok(scan(&entries, &self.catalog))
    }

    /// Per-item check; publishes one `ReplenishmentNeeded` per deficient location.
    pub fn check_item(&self, item_id: &ItemId) -> ServiceResult<Vec<ReplenishmentAlert>> {
        let item = match self.catalog.item(item_id) {
            Some(item) => item,
            None => {
                tracing::warn!(
                    item_id = %item_id,
                    "replenishment check skipped; item not in catalog"
                );
                return Ok(Vec::new());
            }
        };
        let entries = self.store.entries_for_item(item_id)?;
        let alerts = check_item(&item, &entries, &self.policy, Utc::now());

        for alert in &alerts {
            tracing::info!(
                item_id = %alert.item_id,
                location = %alert.location,
                on_hand = alert.quantity_on_hand,
                threshold = alert.threshold,
                deficiency = alert.deficiency_quantity,
                "replenishment needed"
            );
            self.publish(StockEvent::ReplenishmentNeeded(alert.clone()));
        }

        Ok(alerts)
    }

    /// Periodic sweep: the per-item check over every catalog item.
    pub fn sweep(&self) -> ServiceResult<Vec<ReplenishmentAlert>> {
        let mut alerts = Vec::new();
        for item in self.catalog.items() {
            alerts.extend(self.check_item(&item.id)?);
        }
        Ok(alerts)
    }

    /// Scan, batch warehouse deficiencies per supplier and persist the drafts
    /// in one commit. A line that cannot be priced fails the call before
    /// anything is stored.
    pub fn draft_purchase_orders(&self) -> ServiceResult<Vec<PurchaseOrder>> {
        let entries = self.store.entries()?;
        let report = scan(&entries, &self.catalog);
        let now = Utc::now();
        let orders = generate(
            &report.warehouse,
            &entries,
            &self.policy,
            &self.numbering,
            now,
        )?;

        if orders.is_empty() {
            tracing::debug!("no warehouse deficiencies; no purchase orders drafted");
            return Ok(orders);
        }

        let changes = orders
            .iter()
            .cloned()
            .fold(ChangeSet::new(), |changes, order| changes.insert_purchase_order(order));
        self.store.commit(changes)?;

        tracing::info!(
            orders = orders.len(),
            lines = orders.iter().map(|o| o.lines().len()).sum::<usize>(),
            "purchase orders drafted"
        );
        self.publish(StockEvent::PurchaseOrdersDrafted(PurchaseOrdersDrafted {
            order_ids: orders.iter().map(|o| o.id_typed()).collect(),
            occurred_at: now,
        }));

        Ok(orders)
    }
}
