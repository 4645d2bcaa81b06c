//! Usage recording: consumption of stock at one location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldstock_core::{
    DomainResult, Entity, ItemId, JobId, Location, UsageRecordId, UserId, VehicleId,
};

use crate::entry::{StockLocationItem, ensure_positive};

/// Optional context attached to a usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub technician_id: Option<UserId>,
    pub vehicle_id: Option<VehicleId>,
    pub job_id: Option<JobId>,
    pub note: Option<String>,
}

/// Immutable, append-only record of consumed stock.
///
/// Usage records feed reporting; the current balance lives on the ledger
/// entry itself and is never recomputed from usage history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: UsageRecordId,
    pub item_id: ItemId,
    pub location: Location,
    pub quantity: i64,
    pub recorded_at: DateTime<Utc>,
    pub technician_id: Option<UserId>,
    pub vehicle_id: Option<VehicleId>,
    pub job_id: Option<JobId>,
    pub note: Option<String>,
}

impl Entity for UsageRecord {
    type Id = UsageRecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Decide a usage against `entry`.
///
/// Returns the updated entry and the record to append; the caller commits both
/// together or neither. `entry` itself is left untouched, so a rejected usage
/// or a failed commit has nothing to roll back.
pub fn record_usage(
    entry: &StockLocationItem,
    quantity: i64,
    metadata: UsageMetadata,
    now: DateTime<Utc>,
) -> DomainResult<(StockLocationItem, UsageRecord)> {
    ensure_positive(quantity)?;

    let mut updated = entry.clone();
    updated.withdraw(quantity, now)?;

    let record = UsageRecord {
        id: UsageRecordId::new(),
        item_id: entry.item_id(),
        location: entry.location(),
        quantity,
        recorded_at: now,
        technician_id: metadata.technician_id,
        // Usage from a vehicle's stock is attributed to that vehicle by default.
        vehicle_id: metadata.vehicle_id.or(entry.vehicle_id()),
        job_id: metadata.job_id,
        note: metadata.note,
    };

    Ok((updated, record))
}
