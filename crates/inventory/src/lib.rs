//! Stock-location ledger domain.
//!
//! Per-location balances, status aggregation, usage, transfers and
//! replenishment scanning, implemented purely as deterministic domain logic
//! (no IO, no storage). Operations take the current records and return the
//! next ones; the infrastructure layer commits them.

pub mod entry;
pub mod events;
pub mod item;
pub mod policy;
pub mod replenishment;
pub mod status;
pub mod transfer;
pub mod usage;

pub use entry::{EntryRow, StockLocationItem, ensure_positive};
pub use events::{
    EntryRemoved, EntryStocked, PurchaseOrdersDrafted, QuantityAdjusted, StockEvent,
    StockTransferred, TransferRequested, TransferResolved,
};
pub use item::{Catalog, CatalogError, InMemoryCatalog, InventoryItem};
pub use policy::StockPolicy;
pub use replenishment::{
    ReplenishmentAlert, ReplenishmentReport, check_item, deficiency_quantity, is_deficient,
    recommended_order_quantity, scan, threshold_for,
};
pub use status::{StockStatus, StockSummary, classify, summarize};
pub use transfer::{
    PendingTransfer, TransferOutcome, TransferRequest, TransferStatus, plan_transfer,
};
pub use usage::{UsageMetadata, UsageRecord, record_usage};
