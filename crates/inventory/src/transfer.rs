//! Transfers between locations, immediate or two-phase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldstock_core::{
    DomainError, DomainResult, Entity, ItemId, Location, TransferId, UserId, VehicleId, Versioned,
    WarehouseId,
};

use crate::entry::{StockLocationItem, ensure_positive};
use crate::policy::StockPolicy;

/// Result of a planned transfer: both sides after the move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub quantity: i64,
    pub source: StockLocationItem,
    pub destination: StockLocationItem,
    /// The destination entry did not exist before this transfer.
    pub destination_created: bool,
}

/// Decide a move of `quantity` units from `source` to `destination_location`.
///
/// `destination` is the existing entry for `(source.item_id, destination_location)`,
/// if any; when absent a fresh entry is created from `policy`. Inputs are not
/// modified. The sum of both quantities is the same before and after.
pub fn plan_transfer(
    source: &StockLocationItem,
    destination: Option<&StockLocationItem>,
    destination_location: Location,
    quantity: i64,
    policy: &StockPolicy,
    now: DateTime<Utc>,
) -> DomainResult<TransferOutcome> {
    ensure_positive(quantity)?;

    if destination_location == source.location() {
        return Err(DomainError::validation(
            "transfer source and destination are the same location",
        ));
    }

    if let Some(dest) = destination {
        if dest.item_id() != source.item_id() {
            return Err(DomainError::validation("destination entry holds a different item"));
        }
        if dest.location() != destination_location {
            return Err(DomainError::validation(
                "destination entry is not at the destination location",
            ));
        }
    }

    if source.quantity() < quantity {
        return Err(DomainError::insufficient(quantity, source.quantity()));
    }

    let mut next_source = source.clone();
    next_source.withdraw(quantity, now)?;

    let (mut next_destination, destination_created) = match destination {
        Some(dest) => (dest.clone(), false),
        None => (
            StockLocationItem::empty_at(source.item_id(), destination_location, policy, now),
            true,
        ),
    };
    next_destination.deposit(quantity, now)?;

    Ok(TransferOutcome {
        quantity,
        source: next_source,
        destination: next_destination,
        destination_created,
    })
}

/// Pending transfer lifecycle. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl TransferStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransferStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Accepted => "accepted",
            TransferStatus::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manager request to move warehouse stock onto a technician's vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub item_id: ItemId,
    pub quantity: i64,
    pub source: WarehouseId,
    pub destination: VehicleId,
    pub requested_by: UserId,
    pub assigned_to: UserId,
    pub note: Option<String>,
}

/// A transfer awaiting the receiving technician.
///
/// No ledger change happens until acceptance. Resolution is one-shot: a second
/// `accept`/`reject` fails with `DuplicateTransferResolution`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransfer {
    id: TransferId,
    item_id: ItemId,
    quantity: i64,
    source: WarehouseId,
    destination: VehicleId,
    requested_by: UserId,
    assigned_to: UserId,
    status: TransferStatus,
    note: Option<String>,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    resolved_by: Option<UserId>,
    version: u64,
}

impl PendingTransfer {
    pub fn request(request: TransferRequest, now: DateTime<Utc>) -> DomainResult<Self> {
        ensure_positive(request.quantity)?;

        Ok(Self {
            id: TransferId::new(),
            item_id: request.item_id,
            quantity: request.quantity,
            source: request.source,
            destination: request.destination,
            requested_by: request.requested_by,
            assigned_to: request.assigned_to,
            status: TransferStatus::Pending,
            note: request.note,
            created_at: now,
            resolved_at: None,
            resolved_by: None,
            version: 1,
        })
    }

    pub fn id_typed(&self) -> TransferId {
        self.id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn source(&self) -> WarehouseId {
        self.source
    }

    pub fn destination(&self) -> VehicleId {
        self.destination
    }

    pub fn source_location(&self) -> Location {
        Location::Warehouse(self.source)
    }

    pub fn destination_location(&self) -> Location {
        Location::Vehicle(self.destination)
    }

    pub fn requested_by(&self) -> UserId {
        self.requested_by
    }

    pub fn assigned_to(&self) -> UserId {
        self.assigned_to
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    pub fn resolved_by(&self) -> Option<UserId> {
        self.resolved_by
    }

    fn ensure_pending(&self) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::DuplicateTransferResolution {
                transfer_id: self.id,
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    fn resolve(
        &self,
        status: TransferStatus,
        by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        self.ensure_pending()?;
        let mut next = self.clone();
        next.status = status;
        next.resolved_at = Some(now);
        next.resolved_by = Some(by);
        next.version += 1;
        Ok(next)
    }

    /// Next state after acceptance. The caller applies the ledger move in the
    /// same commit.
    pub fn accept(&self, by: UserId, now: DateTime<Utc>) -> DomainResult<Self> {
        self.resolve(TransferStatus::Accepted, by, now)
    }

    pub fn reject(&self, by: UserId, now: DateTime<Utc>) -> DomainResult<Self> {
        self.resolve(TransferStatus::Rejected, by, now)
    }
}

impl Entity for PendingTransfer {
    type Id = TransferId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Versioned for PendingTransfer {
    fn version(&self) -> u64 {
        self.version
    }
}
