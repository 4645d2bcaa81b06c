//! Ledger entries: "N units of item I are at location L".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldstock_core::{
    DomainError, DomainResult, Entity, EntryId, ItemId, Location, LocationRecord, Versioned,
    VehicleId, WarehouseId,
};

use crate::policy::StockPolicy;
use crate::status::{StockStatus, classify};

/// Reject zero and negative request quantities.
pub fn ensure_positive(quantity: i64) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::InvalidQuantity(quantity));
    }
    Ok(())
}

fn validate_levels(minimum: i64, maximum: Option<i64>) -> DomainResult<()> {
    if minimum < 0 {
        return Err(DomainError::validation("minimum stock level cannot be negative"));
    }
    if let Some(max) = maximum {
        if max < minimum {
            return Err(DomainError::validation(format!(
                "maximum stock level {max} is below minimum {minimum}"
            )));
        }
    }
    Ok(())
}

/// A `StockLocationItem`: the quantity of one catalog item at one location.
///
/// Invariants:
/// - `quantity >= 0`
/// - `minimum_stock_level >= 0`, and `maximum_stock_level >= minimum_stock_level` when set
/// - `version` grows by one per accepted mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLocationItem {
    id: EntryId,
    item_id: ItemId,
    location: Location,
    quantity: i64,
    minimum_stock_level: i64,
    maximum_stock_level: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl StockLocationItem {
    /// Stock an item at a location for the first time.
    pub fn new(
        item_id: ItemId,
        location: Location,
        quantity: i64,
        minimum_stock_level: i64,
        maximum_stock_level: Option<i64>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity < 0 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        validate_levels(minimum_stock_level, maximum_stock_level)?;

        Ok(Self {
            id: EntryId::new(),
            item_id,
            location,
            quantity,
            minimum_stock_level,
            maximum_stock_level,
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    /// Empty entry created implicitly (transfer destination, restock target).
    pub fn empty_at(
        item_id: ItemId,
        location: Location,
        policy: &StockPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            item_id,
            location,
            quantity: 0,
            minimum_stock_level: policy.default_min_stock_level.max(0),
            maximum_stock_level: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn id_typed(&self) -> EntryId {
        self.id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn warehouse_id(&self) -> Option<WarehouseId> {
        self.location.warehouse_id()
    }

    pub fn vehicle_id(&self) -> Option<VehicleId> {
        self.location.vehicle_id()
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn minimum_stock_level(&self) -> i64 {
        self.minimum_stock_level
    }

    pub fn maximum_stock_level(&self) -> Option<i64> {
        self.maximum_stock_level
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Per-location status: the entry's own minimum, and its maximum as the
    /// over-stock bound when one is configured.
    pub fn status(&self, policy: &StockPolicy) -> StockStatus {
        match self.maximum_stock_level {
            Some(max) if self.quantity > max => StockStatus::OverStock,
            Some(_) if self.quantity > self.minimum_stock_level => StockStatus::InStock,
            _ => classify(self.quantity, self.minimum_stock_level, policy),
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }

    /// Remove `quantity` units. Never clamps: asking for more than is on hand fails.
    pub fn withdraw(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_positive(quantity)?;
        if self.quantity < quantity {
            return Err(DomainError::insufficient(quantity, self.quantity));
        }
        self.quantity -= quantity;
        self.touch(now);
        Ok(())
    }

    pub fn deposit(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_positive(quantity)?;
        self.quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("quantity overflow"))?;
        self.touch(now);
        Ok(())
    }

    /// Manual count correction to an absolute value.
    pub fn set_quantity(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        self.quantity = quantity;
        self.touch(now);
        Ok(())
    }

    pub fn set_stock_levels(
        &mut self,
        minimum_stock_level: i64,
        maximum_stock_level: Option<i64>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        validate_levels(minimum_stock_level, maximum_stock_level)?;
        self.minimum_stock_level = minimum_stock_level;
        self.maximum_stock_level = maximum_stock_level;
        self.touch(now);
        Ok(())
    }
}

impl Entity for StockLocationItem {
    type Id = EntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Versioned for StockLocationItem {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Flat, storage-shaped form of a ledger entry (one nullable column per
/// location kind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRow {
    pub id: EntryId,
    pub item_id: ItemId,
    pub warehouse_id: Option<WarehouseId>,
    pub vehicle_id: Option<VehicleId>,
    pub quantity: i64,
    pub minimum_stock_level: i64,
    pub maximum_stock_level: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl TryFrom<EntryRow> for StockLocationItem {
    type Error = DomainError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let location = Location::try_from(LocationRecord {
            warehouse_id: row.warehouse_id,
            vehicle_id: row.vehicle_id,
        })?;
        if row.quantity < 0 {
            return Err(DomainError::InvalidQuantity(row.quantity));
        }
        validate_levels(row.minimum_stock_level, row.maximum_stock_level)?;

        Ok(Self {
            id: row.id,
            item_id: row.item_id,
            location,
            quantity: row.quantity,
            minimum_stock_level: row.minimum_stock_level,
            maximum_stock_level: row.maximum_stock_level,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        })
    }
}

impl From<&StockLocationItem> for EntryRow {
    fn from(entry: &StockLocationItem) -> Self {
        let record = LocationRecord::from(entry.location);
        Self {
            id: entry.id,
            item_id: entry.item_id,
            warehouse_id: record.warehouse_id,
            vehicle_id: record.vehicle_id,
            quantity: entry.quantity,
            minimum_stock_level: entry.minimum_stock_level,
            maximum_stock_level: entry.maximum_stock_level,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            version: entry.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warehouse_entry(quantity: i64, min: i64) -> StockLocationItem {
        StockLocationItem::new(
            ItemId::new(),
            Location::Warehouse(WarehouseId::new()),
            quantity,
            min,
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn withdraw_more_than_on_hand_fails_without_change() {
        let mut entry = warehouse_entry(10, 5);
        let before = entry.clone();

        let err = entry.withdraw(15, Utc::now()).unwrap_err();

        assert_eq!(err, DomainError::insufficient(15, 10));
        assert_eq!(entry, before);
    }

    #[test]
    fn withdraw_rejects_non_positive_quantities() {
        let mut entry = warehouse_entry(10, 5);
        assert_eq!(entry.withdraw(0, Utc::now()), Err(DomainError::InvalidQuantity(0)));
        assert_eq!(entry.withdraw(-2, Utc::now()), Err(DomainError::InvalidQuantity(-2)));
        assert_eq!(entry.quantity(), 10);
        assert_eq!(entry.version(), 1);
    }

    #[test]
    fn withdraw_to_zero_keeps_the_entry() {
        let mut entry = warehouse_entry(4, 1);
        entry.withdraw(4, Utc::now()).unwrap();
        assert_eq!(entry.quantity(), 0);
        assert_eq!(entry.version(), 2);
    }

    #[test]
    fn mutations_bump_version_and_timestamp() {
        let mut entry = warehouse_entry(2, 1);
        let later = entry.updated_at() + chrono::Duration::seconds(30);
        entry.deposit(3, later).unwrap();
        assert_eq!(entry.quantity(), 5);
        assert_eq!(entry.updated_at(), later);
        assert_eq!(entry.created_at() + chrono::Duration::seconds(30), later);
        assert_eq!(entry.version(), 2);
    }

    #[test]
    fn construction_rejects_bad_levels() {
        let err = StockLocationItem::new(
            ItemId::new(),
            Location::Vehicle(VehicleId::new()),
            1,
            5,
            Some(3),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = StockLocationItem::new(
            ItemId::new(),
            Location::Vehicle(VehicleId::new()),
            -1,
            0,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::InvalidQuantity(-1));
    }

    #[test]
    fn set_quantity_rejects_negative() {
        let mut entry = warehouse_entry(3, 1);
        assert_eq!(entry.set_quantity(-1, Utc::now()), Err(DomainError::InvalidQuantity(-1)));
        entry.set_quantity(0, Utc::now()).unwrap();
        assert_eq!(entry.quantity(), 0);
    }

    #[test]
    fn row_with_both_locations_is_rejected() {
        let entry = warehouse_entry(3, 1);
        let mut row = EntryRow::from(&entry);
        row.vehicle_id = Some(VehicleId::new());

        let err = StockLocationItem::try_from(row).unwrap_err();
        assert!(matches!(err, DomainError::InvalidLocationAssignment(_)));
    }

    #[test]
    fn row_conversion_preserves_entry() {
        let entry = warehouse_entry(3, 1);
        let back = StockLocationItem::try_from(EntryRow::from(&entry)).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn entry_status_uses_maximum_as_over_stock_bound() {
        let policy = StockPolicy::default();
        let mut entry = StockLocationItem::new(
            ItemId::new(),
            Location::Vehicle(VehicleId::new()),
            9,
            2,
            Some(8),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(entry.status(&policy), StockStatus::OverStock);

        entry.set_quantity(7, Utc::now()).unwrap();
        assert_eq!(entry.status(&policy), StockStatus::InStock);

        entry.set_quantity(2, Utc::now()).unwrap();
        assert_eq!(entry.status(&policy), StockStatus::LowStock);

        entry.set_quantity(0, Utc::now()).unwrap();
        assert_eq!(entry.status(&policy), StockStatus::OutOfStock);
    }
}
