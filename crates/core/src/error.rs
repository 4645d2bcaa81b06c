//! Domain error model.

use thiserror::Error;

use crate::id::{ItemId, TransferId};
use crate::location::Location;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures. Every variant is
/// detected before any ledger write is attempted; storage failures belong to
/// the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A non-positive quantity was supplied to usage, transfer or restock.
    #[error("invalid quantity: {0} (must be positive)")]
    InvalidQuantity(i64),

    /// The requested quantity exceeds what the source entry holds.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// No ledger entry exists for the item at the location.
    #[error("item {item_id} is not stocked at {location}")]
    NoSuchLocationEntry { item_id: ItemId, location: Location },

    /// A location reference named both or neither of warehouse and vehicle.
    #[error("invalid location assignment: {0}")]
    InvalidLocationAssignment(String),

    /// A pending transfer that already reached a terminal state was resolved again.
    #[error("transfer {transfer_id} is already {status}")]
    DuplicateTransferResolution { transfer_id: TransferId, status: String },

    /// The item already has a ledger entry at the location.
    #[error("item {item_id} is already stocked at {location}")]
    DuplicateEntry { item_id: ItemId, location: Location },

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn insufficient(requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn no_entry(item_id: ItemId, location: Location) -> Self {
        Self::NoSuchLocationEntry { item_id, location }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
