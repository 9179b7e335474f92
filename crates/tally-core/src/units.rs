//! Shared numeric helpers.
//!
//! Inventory arithmetic in Tally POS is plain floating point. These helpers
//! centralize the tolerance comparison, the floor-division that turns
//! sub-units into sellable counts, and the lenient parsing used by imports.

/// Tolerance for comparing derived quantities against stored ones.
///
/// `quantity` and `total_units / sub_unit_count` are considered in sync when
/// they differ by no more than this.
pub const QUANTITY_TOLERANCE: f64 = 1e-4;

/// Whether two quantity figures agree within [`QUANTITY_TOLERANCE`].
#[inline]
pub fn quantities_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= QUANTITY_TOLERANCE
}

/// Filters an optional numeric field down to a finite value.
///
/// Missing and NaN are both treated as "not there": SQLite NULLs, absent
/// JSON fields, and poisoned arithmetic all collapse to `None`.
#[inline]
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// How many whole sales fit in `total` sub-units at `per_sale` sub-units
/// each. Returns 0 for exhausted stock and for any degenerate input
/// (non-positive rate, non-finite total).
pub fn floor_units(total: f64, per_sale: f64) -> i64 {
    if !total.is_finite() || !(per_sale > 0.0) {
        return 0;
    }
    let count = (total / per_sale).floor();
    if count.is_finite() && count > 0.0 {
        count as i64
    } else {
        0
    }
}

/// Lenient numeric parsing for imported fields: unparsable or non-finite
/// input defaults to 0.
pub fn parse_number_or_zero(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
