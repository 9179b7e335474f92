//! # Record Types
//!
//! The three record shapes stored by Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Record Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   StockItem     │   │   Depletion     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (key)       │   │  item_id (key)  │   │  product_id ┐   │       │
//! │  │  name           │   │  quantity       │   │  stock_item │key│       │
//! │  │  category       │   │  sub_unit_count │   │  _id        ┘   │       │
//! │  │  price          │   │  unit_name      │   │  depletion_     │       │
//! │  │  description    │   │  total_units    │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Depletion is a pure association: "selling one unit of product P       │
//! │  consumes depletion_quantity sub-units of stock item S".               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Serde uses camelCase field names so JSON and CSV files produced by the
//! legacy system (`itemId`, `subUnitCount`, `totalUnits`, ...) import
//! unchanged.

use serde::{Deserialize, Serialize};

// =============================================================================
// Product
// =============================================================================

/// A sellable catalog entry.
///
/// `id` is caller-generated and immutable once assigned. Deleting a product
/// cascades nothing: depletion rows referencing it must be cleaned up
/// separately by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique record key.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-form category label.
    #[serde(default)]
    pub category: String,

    /// Unit price. Non-negative; plain floating point by design.
    #[serde(default)]
    pub price: f64,

    /// Optional long description.
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// Stock Item
// =============================================================================

/// A unit of raw inventory, tracked in sub-units.
///
/// ## Invariants (after reconciliation)
/// - `sub_unit_count >= 1`
/// - `total_units >= 0` (clamped at zero on depletion)
/// - `|quantity * sub_unit_count - total_units| <= 1e-4`
/// - `unit_name` non-empty
///
/// `total_units` is the authoritative inventory figure; `quantity` is the
/// derived main-unit equivalent kept for display and back-compat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    /// Unique record key.
    pub item_id: String,

    /// Display description (e.g. "Arabica beans").
    pub description: String,

    /// Derived main-unit count: `total_units / sub_unit_count`.
    pub quantity: f64,

    /// Sub-units per main unit. Always >= 1.
    pub sub_unit_count: f64,

    /// Label for one sub-unit (e.g. "gram", "bottle").
    pub unit_name: String,

    /// Authoritative inventory in sub-units.
    pub total_units: f64,
}

impl StockItem {
    /// Canonical sub-unit inventory accessor.
    ///
    /// Every consumer of stock levels goes through this method (and
    /// [`RawStockItem::total_sub_units`] for unreconciled rows) rather than
    /// reading fields and re-deriving ad hoc.
    #[inline]
    pub fn total_sub_units(&self) -> f64 {
        self.total_units
    }

    /// Consumes `sub_units` of inventory, clamping at zero, and keeps the
    /// derived `quantity` in sync.
    pub fn deplete(&mut self, sub_units: f64) {
        self.total_units = (self.total_units - sub_units).max(0.0);
        self.quantity = self.total_units / self.sub_unit_count;
    }
}

// =============================================================================
// Raw Stock Item
// =============================================================================

/// A stock item row as it may exist in storage *before* reconciliation.
///
/// Legacy records predate the unit/sub-unit split: any of the numeric fields
/// and the unit label may be missing. [`crate::reconcile::reconcile`] turns a
/// raw row into a normalized [`StockItem`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RawStockItem {
    pub item_id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub quantity: Option<f64>,

    #[serde(default)]
    pub sub_unit_count: Option<f64>,

    #[serde(default)]
    pub unit_name: Option<String>,

    #[serde(default)]
    pub total_units: Option<f64>,
}

impl RawStockItem {
    /// Sub-unit inventory with the legacy fallback: when `total_units` is
    /// absent it is derived as `quantity * sub_unit_count`.
    pub fn total_sub_units(&self) -> f64 {
        match crate::units::finite(self.total_units) {
            Some(total) => total,
            None => {
                let quantity = crate::units::finite(self.quantity).unwrap_or(0.0);
                let per_unit = match crate::units::finite(self.sub_unit_count) {
                    Some(count) if count >= 1.0 => count,
                    _ => 1.0,
                };
                quantity * per_unit
            }
        }
    }
}

impl From<StockItem> for RawStockItem {
    fn from(item: StockItem) -> Self {
        RawStockItem {
            item_id: item.item_id,
            description: item.description,
            quantity: Some(item.quantity),
            sub_unit_count: Some(item.sub_unit_count),
            unit_name: Some(item.unit_name),
            total_units: Some(item.total_units),
        }
    }
}

// =============================================================================
// Depletion
// =============================================================================

/// A depletion mapping: selling one unit of `product_id` consumes
/// `depletion_quantity` sub-units of `stock_item_id`.
///
/// Keyed by the `(product_id, stock_item_id)` pair; at most one mapping per
/// pair. Dangling references are tolerated in storage and make the product
/// unsellable rather than raising.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Depletion {
    pub product_id: String,
    pub stock_item_id: String,

    /// Sub-units consumed per one unit of product sold. Always > 0 for a
    /// valid mapping.
    pub depletion_quantity: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================
