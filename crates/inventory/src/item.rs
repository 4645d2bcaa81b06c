//! Catalog items and the read-only catalog boundary.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fieldstock_core::{Entity, ItemId, SupplierId};

/// Catalog definition of a stockable part.
///
/// Owned by catalog management; the ledger only reads it. Prices are in the
/// smallest currency unit (e.g. cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub part_number: Option<String>,
    pub category: Option<String>,
    pub unit_price: i64,
    pub supplier_id: Option<SupplierId>,
    /// System-wide quantity at or below which a warehouse reorders.
    pub reorder_point: i64,
    pub active: bool,
}

impl InventoryItem {
    pub fn new(id: ItemId, name: impl Into<String>, unit_price: i64, reorder_point: i64) -> Self {
        Self {
            id,
            name: name.into(),
            part_number: None,
            category: None,
            unit_price,
            supplier_id: None,
            reorder_point,
            active: true,
        }
    }

    pub fn with_supplier(mut self, supplier_id: SupplierId) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }

    pub fn with_part_number(mut self, part_number: impl Into<String>) -> Self {
        self.part_number = Some(part_number.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Read-only catalog provider.
pub trait Catalog: Send + Sync {
    fn item(&self, id: &ItemId) -> Option<InventoryItem>;

    fn items(&self) -> Vec<InventoryItem>;
}

impl<C> Catalog for Arc<C>
where
    C: Catalog + ?Sized,
{
    fn item(&self, id: &ItemId) -> Option<InventoryItem> {
        (**self).item(id)
    }

    fn items(&self) -> Vec<InventoryItem> {
        (**self).items()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A writer panicked while holding the catalog lock.
    #[error("catalog lock poisoned")]
    Poisoned,
}

/// In-memory catalog for tests and embedded use.
///
/// Reads through [`Catalog`] cannot report failure; a poisoned lock is logged
/// and reads as an empty catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<HashMap<ItemId, InventoryItem>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let map = items.into_iter().map(|item| (item.id, item)).collect();
        Self {
            inner: RwLock::new(map),
        }
    }

    /// Insert or replace an item (price and reorder point edits land here).
    pub fn upsert(&self, item: InventoryItem) -> Result<(), CatalogError> {
        let mut map = self.inner.write().map_err(|_| CatalogError::Poisoned)?;
        map.insert(item.id, item);
        Ok(())
    }

    pub fn remove(&self, id: &ItemId) -> Result<Option<InventoryItem>, CatalogError> {
        let mut map = self.inner.write().map_err(|_| CatalogError::Poisoned)?;
        Ok(map.remove(id))
    }
}

impl Catalog for InMemoryCatalog {
    fn item(&self, id: &ItemId) -> Option<InventoryItem> {
        match self.inner.read() {
            Ok(map) => map.get(id).cloned(),
            Err(_) => {
                tracing::warn!(item_id = %id, "catalog lock poisoned; item lookup failed");
                None
            }
        }
    }

    fn items(&self) -> Vec<InventoryItem> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => {
                tracing::warn!("catalog lock poisoned; listing no items");
                return vec![];
            }
        };
        let mut items: Vec<_> = map.values().cloned().collect();
        items.sort_by_key(|i| i.id);
        items
    }
}
