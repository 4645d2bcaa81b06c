//! Engine configuration: policy defaults overlaid with environment variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fieldstock_inventory::StockPolicy;
use fieldstock_purchasing::OrderNumbering;

pub const ENV_STATUS_DEFAULT_MINIMUM: &str = "FIELDSTOCK_STATUS_DEFAULT_MINIMUM";
pub const ENV_OVER_STOCK_FACTOR: &str = "FIELDSTOCK_OVER_STOCK_FACTOR";
pub const ENV_REORDER_MULTIPLIER: &str = "FIELDSTOCK_REORDER_MULTIPLIER";
pub const ENV_DEFAULT_MIN_STOCK_LEVEL: &str = "FIELDSTOCK_DEFAULT_MIN_STOCK_LEVEL";
pub const ENV_PO_NUMBER_PREFIX: &str = "FIELDSTOCK_PO_NUMBER_PREFIX";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: cannot parse '{value}' as an integer")]
    NotAnInteger { key: &'static str, value: String },

    #[error("{key}: {reason}")]
    OutOfRange { key: &'static str, reason: &'static str },

    #[error("invalid config document: {0}")]
    Document(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub policy: StockPolicy,
    pub po_number_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: StockPolicy::default(),
            po_number_prefix: OrderNumbering::default().prefix,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `FIELDSTOCK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(document).map_err(|e| ConfigError::Document(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with whatever `lookup` returns per variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = int_var(&lookup, ENV_STATUS_DEFAULT_MINIMUM)? {
            config.policy.status_default_minimum = v;
        }
        if let Some(v) = int_var(&lookup, ENV_OVER_STOCK_FACTOR)? {
            config.policy.over_stock_factor = v;
        }
        if let Some(v) = int_var(&lookup, ENV_REORDER_MULTIPLIER)? {
            config.policy.reorder_multiplier = v;
        }
        if let Some(v) = int_var(&lookup, ENV_DEFAULT_MIN_STOCK_LEVEL)? {
            config.policy.default_min_stock_level = v;
        }
        if let Some(prefix) = lookup(ENV_PO_NUMBER_PREFIX) {
            let prefix = prefix.trim();
            if prefix.is_empty() {
                tracing::warn!(
                    key = ENV_PO_NUMBER_PREFIX,
                    "blank order number prefix; keeping default"
                );
            } else {
                config.po_number_prefix = prefix.to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.status_default_minimum < 0 {
            return Err(ConfigError::OutOfRange {
                key: ENV_STATUS_DEFAULT_MINIMUM,
                reason: "must not be negative",
            });
        }
        if self.policy.over_stock_factor < 1 {
            return Err(ConfigError::OutOfRange {
                key: ENV_OVER_STOCK_FACTOR,
                reason: "must be at least 1",
            });
        }
        if self.policy.reorder_multiplier < 1 {
            return Err(ConfigError::OutOfRange {
                key: ENV_REORDER_MULTIPLIER,
                reason: "must be at least 1",
            });
        }
        if self.policy.default_min_stock_level < 0 {
            return Err(ConfigError::OutOfRange {
                key: ENV_DEFAULT_MIN_STOCK_LEVEL,
                reason: "must not be negative",
            });
        }
        Ok(())
    }

    pub fn numbering(&self) -> OrderNumbering {
        OrderNumbering {
            prefix: self.po_number_prefix.clone(),
        }
    }
}

fn int_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<i64>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ConfigError::NotAnInteger { key, value: raw }),
    }
}
