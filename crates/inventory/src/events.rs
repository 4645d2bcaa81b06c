//! Ledger change signals, published after each successful commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldstock_core::{EntryId, ItemId, Location, PurchaseOrderId, TransferId, UserId, VehicleId};
use fieldstock_events::Event;

use crate::replenishment::ReplenishmentAlert;
use crate::transfer::TransferStatus;
use crate::usage::UsageRecord;

/// Event: EntryStocked (a new ledger entry exists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStocked {
    pub entry_id: EntryId,
    pub item_id: ItemId,
    pub location: Location,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockTransferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTransferred {
    pub item_id: ItemId,
    pub from: Location,
    pub to: Location,
    pub quantity: i64,
    pub transfer_id: Option<TransferId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TransferRequested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequested {
    pub transfer_id: TransferId,
    pub item_id: ItemId,
    pub destination: VehicleId,
    pub assigned_to: UserId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TransferResolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResolved {
    pub transfer_id: TransferId,
    pub status: TransferStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityAdjusted (manual count correction or restock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityAdjusted {
    pub entry_id: EntryId,
    pub item_id: ItemId,
    pub location: Location,
    pub previous: i64,
    pub quantity: i64,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: EntryRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRemoved {
    pub entry_id: EntryId,
    pub item_id: ItemId,
    pub location: Location,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PurchaseOrdersDrafted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrdersDrafted {
    pub order_ids: Vec<PurchaseOrderId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockEvent {
    EntryStocked(EntryStocked),
    UsageRecorded(UsageRecord),
    StockTransferred(StockTransferred),
    TransferRequested(TransferRequested),
    TransferResolved(TransferResolved),
    QuantityAdjusted(QuantityAdjusted),
    EntryRemoved(EntryRemoved),
    ReplenishmentNeeded(ReplenishmentAlert),
    PurchaseOrdersDrafted(PurchaseOrdersDrafted),
}

impl StockEvent {
    /// The alert carried by a `ReplenishmentNeeded` event.
    pub fn as_alert(&self) -> Option<&ReplenishmentAlert> {
        match self {
            StockEvent::ReplenishmentNeeded(alert) => Some(alert),
            _ => None,
        }
    }
}

impl Event for StockEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StockEvent::EntryStocked(_) => "inventory.entry.stocked",
            StockEvent::UsageRecorded(_) => "inventory.usage.recorded",
            StockEvent::StockTransferred(_) => "inventory.stock.transferred",
            StockEvent::TransferRequested(_) => "inventory.transfer.requested",
            StockEvent::TransferResolved(_) => "inventory.transfer.resolved",
            StockEvent::QuantityAdjusted(_) => "inventory.entry.quantity_adjusted",
            StockEvent::EntryRemoved(_) => "inventory.entry.removed",
            StockEvent::ReplenishmentNeeded(_) => "inventory.replenishment.needed",
            StockEvent::PurchaseOrdersDrafted(_) => "purchasing.orders.drafted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StockEvent::EntryStocked(e) => e.occurred_at,
            StockEvent::UsageRecorded(e) => e.recorded_at,
            StockEvent::StockTransferred(e) => e.occurred_at,
            StockEvent::TransferRequested(e) => e.occurred_at,
            StockEvent::TransferResolved(e) => e.occurred_at,
            StockEvent::QuantityAdjusted(e) => e.occurred_at,
            StockEvent::EntryRemoved(e) => e.occurred_at,
            StockEvent::ReplenishmentNeeded(e) => e.detected_at,
            StockEvent::PurchaseOrdersDrafted(e) => e.occurred_at,
        }
    }

    /// Ledger events route by item; transfer resolutions by transfer.
    fn routing_key(&self) -> String {
        match self {
            StockEvent::EntryStocked(e) => e.item_id.to_string(),
            StockEvent::UsageRecorded(e) => e.item_id.to_string(),
            StockEvent::StockTransferred(e) => e.item_id.to_string(),
            StockEvent::TransferRequested(e) => e.item_id.to_string(),
            StockEvent::TransferResolved(e) => e.transfer_id.to_string(),
            StockEvent::QuantityAdjusted(e) => e.item_id.to_string(),
            StockEvent::EntryRemoved(e) => e.item_id.to_string(),
            StockEvent::ReplenishmentNeeded(e) => e.item_id.to_string(),
            StockEvent::PurchaseOrdersDrafted(_) => "purchasing".to_string(),
        }
    }
}
