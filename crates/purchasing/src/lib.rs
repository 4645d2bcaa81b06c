//! Purchasing domain module: draft purchase orders for replenishment.
//!
//! Deterministic domain logic only (no IO, no storage). Submission and
//! receiving belong to the downstream procurement workflow.

pub mod generator;
pub mod order;

pub use generator::{OrderNumbering, generate};
pub use order::{LineItem, PurchaseOrder, PurchaseOrderStatus, SupplierKey};
