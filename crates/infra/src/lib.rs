//! Infrastructure layer: ledger persistence, configuration and the stock
//! service that wires domain logic to storage and the event bus.

pub mod config;
pub mod ledger_store;
pub mod service;


pub use config::{ConfigError, EngineConfig};
pub use ledger_store::{Change, ChangeSet, InMemoryLedgerStore, LedgerStore, StoreError};
pub use service::{NewEntry, ServiceResult, StockService, StockServiceError};
