//! Tunable thresholds shared by status classification, transfers and reordering.

use serde::{Deserialize, Serialize};

/// Ledger policy knobs.
///
/// Deserializable so a host application can load it from its own config
/// source; missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockPolicy {
    /// Effective minimum used for status when an item has no ledger entries.
    pub status_default_minimum: i64,
    /// `total > factor × effective_min` classifies as over stock.
    pub over_stock_factor: i64,
    /// Reorders target `multiplier × reorder_point`.
    pub reorder_multiplier: i64,
    /// Minimum stock level given to entries created implicitly (transfer
    /// destinations, restocks of a new location).
    pub default_min_stock_level: i64,
}

impl Default for StockPolicy {
    fn default() -> Self {
        Self {
            status_default_minimum: 5,
            over_stock_factor: 3,
            reorder_multiplier: 2,
            default_min_stock_level: 0,
        }
    }
}
