//! `fieldstock-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the ledger,
//! replenishment and purchasing crates (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod location;

pub use entity::{Entity, ExpectedVersion, Versioned};
pub use error::{DomainError, DomainResult};
pub use id::{
    EntryId, ItemId, JobId, PurchaseOrderId, SupplierId, TransferId, UsageRecordId, UserId,
    VehicleId, WarehouseId,
};
pub use location::{Location, LocationKind, LocationRecord};
