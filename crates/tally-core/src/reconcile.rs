//! # Stock Reconciliation
//!
//! Normalizes a stock item's three numeric fields into a consistent state.
//!
//! ## Why This Exists
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  The Unit / Sub-Unit Split                              │
//! │                                                                         │
//! │  Early records tracked stock with a single `quantity` field.           │
//! │  The sub-unit split added:                                             │
//! │                                                                         │
//! │    sub_unit_count   sub-units per main unit          (e.g. 1000)       │
//! │    unit_name        sub-unit label                   (e.g. "gram")     │
//! │    total_units      authoritative stock in sub-units (e.g. 2500)       │
//! │    quantity         derived = total_units / sub_unit_count  (2.5)      │
//! │                                                                         │
//! │  Rows written before the split miss some or all of the new fields.     │
//! │  reconcile() repairs any row into the full shape; the engine's         │
//! │  reconcile_all pass persists only rows that actually changed.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reconciliation only repairs, never rejects: there is no error path.

use crate::types::{RawStockItem, StockItem};
use crate::units::{finite, quantities_match};

/// Repairs a raw stock row into a normalized [`StockItem`].
///
/// Returns the normalized item plus a flag telling whether any field had to
/// change (the caller persists only when it did).
///
/// ## Repair Steps
/// 1. `sub_unit_count` missing, NaN, or `< 1` → `1`
/// 2. `unit_name` missing or empty → `"unit"`
/// 3. `total_units` missing or NaN → `(quantity or 0) * sub_unit_count`
/// 4. `quantity` missing, NaN, or out of sync with
///    `total_units / sub_unit_count` by more than the shared tolerance →
///    recomputed
///
/// Idempotent: reconciling an already-normalized row reports no change.
pub fn reconcile(raw: &RawStockItem) -> (StockItem, bool) {
    let mut changed = false;

    let sub_unit_count = match finite(raw.sub_unit_count) {
        Some(count) if count >= 1.0 => count,
        _ => {
            changed = true;
            1.0
        }
    };

    let unit_name = match raw.unit_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            changed = true;
            "unit".to_string()
        }
    };

    let total_units = match finite(raw.total_units) {
        Some(total) => total,
        None => {
            changed = true;
            finite(raw.quantity).unwrap_or(0.0) * sub_unit_count
        }
    };

    let correct_quantity = total_units / sub_unit_count;
    let quantity = match finite(raw.quantity) {
        Some(q) if quantities_match(q, correct_quantity) => q,
        _ => {
            changed = true;
            correct_quantity
        }
    };

    let item = StockItem {
        item_id: raw.item_id.clone(),
        description: raw.description.clone(),
        quantity,
        sub_unit_count,
        unit_name,
        total_units,
    };

    (item, changed)
}

// =============================================================================
// Unit Tests
// =============================================================================
