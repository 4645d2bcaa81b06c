//! Transactional ledger persistence boundary.
//!
//! The trait makes no storage assumptions; the in-memory implementation backs
//! tests and single-process deployments.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
pub use r#trait::{Change, ChangeSet, LedgerStore, StoreError};
