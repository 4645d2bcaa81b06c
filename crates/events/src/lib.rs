//! Event publishing/subscription mechanics for ledger change signals.
//!
//! Domain crates define their own event enums; this crate only knows how to
//! describe an event and fan it out to subscribers.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
