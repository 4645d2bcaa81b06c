use chrono::{DateTime, Utc};

/// A change signal describing something that has already been committed.
///
/// Subscribers treat events as notifications, not as the record of truth:
/// anything an event carries can be re-read from the store it came from.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable dotted name (e.g. "inventory.usage.recorded").
    fn event_type(&self) -> &'static str;

    /// Payload schema version.
    fn version(&self) -> u32;

    /// Business time of the change.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Key subscribers group or filter on. Events about the same record share
    /// a key, so per-key ordering is the publish order.
    fn routing_key(&self) -> String;
}
