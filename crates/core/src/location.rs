//! Stock locations: every ledger entry lives at exactly one warehouse or vehicle.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::{VehicleId, WarehouseId};

/// Physical location holding stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Location {
    Warehouse(WarehouseId),
    Vehicle(VehicleId),
}

/// Discriminator without the id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Warehouse,
    Vehicle,
}

impl Location {
    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Warehouse(_) => LocationKind::Warehouse,
            Location::Vehicle(_) => LocationKind::Vehicle,
        }
    }

    pub fn is_warehouse(&self) -> bool {
        matches!(self, Location::Warehouse(_))
    }

    pub fn warehouse_id(&self) -> Option<WarehouseId> {
        match self {
            Location::Warehouse(id) => Some(*id),
            Location::Vehicle(_) => None,
        }
    }

    pub fn vehicle_id(&self) -> Option<VehicleId> {
        match self {
            Location::Vehicle(id) => Some(*id),
            Location::Warehouse(_) => None,
        }
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Location::Warehouse(id) => write!(f, "warehouse {id}"),
            Location::Vehicle(id) => write!(f, "vehicle {id}"),
        }
    }
}

impl From<WarehouseId> for Location {
    fn from(value: WarehouseId) -> Self {
        Location::Warehouse(value)
    }
}

impl From<VehicleId> for Location {
    fn from(value: VehicleId) -> Self {
        Location::Vehicle(value)
    }
}

/// Row-shaped location reference with one nullable column per kind.
///
/// Storage layers that persist locations as two columns convert through this
/// type; exactly one side must be set.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub warehouse_id: Option<WarehouseId>,
    pub vehicle_id: Option<VehicleId>,
}

impl TryFrom<LocationRecord> for Location {
    type Error = DomainError;

    fn try_from(value: LocationRecord) -> Result<Self, Self::Error> {
        match (value.warehouse_id, value.vehicle_id) {
            (Some(w), None) => Ok(Location::Warehouse(w)),
            (None, Some(v)) => Ok(Location::Vehicle(v)),
            (Some(_), Some(_)) => Err(DomainError::InvalidLocationAssignment(
                "both warehouse and vehicle are set".to_string(),
            )),
            (None, None) => Err(DomainError::InvalidLocationAssignment(
                "neither warehouse nor vehicle is set".to_string(),
            )),
        }
    }
}

impl From<Location> for LocationRecord {
    fn from(value: Location) -> Self {
        Self {
            warehouse_id: value.warehouse_id(),
            vehicle_id: value.vehicle_id(),
        }
    }
}
