use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldstock_core::{DomainError, DomainResult, Entity, ItemId, PurchaseOrderId, SupplierId};

/// Supplier grouping key. Items without a supplier reference are batched
/// under `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum SupplierKey {
    Known(SupplierId),
    Unknown,
}

impl From<Option<SupplierId>> for SupplierKey {
    fn from(value: Option<SupplierId>) -> Self {
        match value {
            Some(id) => SupplierKey::Known(id),
            None => SupplierKey::Unknown,
        }
    }
}

impl SupplierKey {
    pub fn supplier_id(&self) -> Option<SupplierId> {
        match self {
            SupplierKey::Known(id) => Some(*id),
            SupplierKey::Unknown => None,
        }
    }
}

/// Purchase order status lifecycle.
///
/// Orders are generated as `Draft`; the remaining states are set by the
/// procurement workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    Draft,
    Submitted,
    Received,
    Cancelled,
}

/// Purchase order line item. Prices are in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_no: u32,
    pub item_id: ItemId,
    pub quantity: i64,
    pub unit_price: i64,
    /// Always `quantity × unit_price`.
    pub line_total: i64,
}

/// Procurement batch for one supplier.
///
/// `subtotal` and `total` are derived from the lines on every change and are
/// never set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    order_number: String,
    supplier: SupplierKey,
    status: PurchaseOrderStatus,
    lines: Vec<LineItem>,
    subtotal: i64,
    total: i64,
    created_at: DateTime<Utc>,
}

impl PurchaseOrder {
    pub fn draft(
        id: PurchaseOrderId,
        order_number: impl Into<String>,
        supplier: SupplierKey,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            order_number: order_number.into(),
            supplier,
            status: PurchaseOrderStatus::Draft,
            lines: Vec::new(),
            subtotal: 0,
            total: 0,
            created_at: now,
        }
    }

    pub fn id_typed(&self) -> PurchaseOrderId {
        self.id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn supplier(&self) -> SupplierKey {
        self.supplier
    }

    pub fn status(&self) -> PurchaseOrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn subtotal(&self) -> i64 {
        self.subtotal
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append a line (draft orders only).
    pub fn add_line(
        &mut self,
        item_id: ItemId,
        quantity: i64,
        unit_price: i64,
    ) -> DomainResult<&LineItem> {
        if self.status != PurchaseOrderStatus::Draft {
            return Err(DomainError::validation(
                "cannot modify purchase order once it left draft",
            ));
        }
        if quantity <= 0 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        if unit_price < 0 {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        let line_total = quantity
            .checked_mul(unit_price)
            .ok_or_else(|| DomainError::validation("line total overflow"))?;
        let subtotal = self
            .subtotal
            .checked_add(line_total)
            .ok_or_else(|| DomainError::validation("order total overflow"))?;

        let line_no = (self.lines.len() as u32) + 1;
        self.lines.push(LineItem {
            line_no,
            item_id,
            quantity,
            unit_price,
            line_total,
        });
        self.subtotal = subtotal;
        // No tax or freight at draft time.
        self.total = subtotal;

        Ok(&self.lines[self.lines.len() - 1])
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
