//! # Sellability Math
//!
//! How many units of a product can be sold without driving any linked stock
//! item negative.
//!
//! ## The Bottleneck Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product "Flat White"                                                   │
//! │                                                                         │
//! │  mapping → beans  (total 10 g,  18 g per sale)  floor(10/18) = 0       │
//! │  mapping → milk   (total 2000 ml, 160 ml/sale)  floor(2000/160) = 12   │
//! │                                                                         │
//! │  max sellable = min(0, 12) = 0   ← the binding constraint              │
//! │                                                                         │
//! │  No mappings at all        → 0  (unlinked products are informational)  │
//! │  Any mapping missing stock → 0  (one broken link blocks the product)   │
//! │  Any non-positive rate     → 0                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The functions here are pure: the engine fetches a product's mappings and
//! the stock items they point at, then hands the pairs over.

use serde::Serialize;

use crate::types::{Depletion, StockItem};
use crate::units::floor_units;

/// A depletion mapping joined with the stock item it points at, or `None`
/// when the reference dangles.
pub type StockLink = (Depletion, Option<StockItem>);

/// Maximum units sellable across all of a product's depletion mappings.
///
/// Returns 0 for an empty mapping set, for any dangling stock reference,
/// and for any mapping with a non-positive consumption rate; otherwise the
/// minimum over mappings of `floor(total_sub_units / depletion_quantity)`.
pub fn max_sellable(links: &[StockLink]) -> i64 {
    if links.is_empty() {
        return 0;
    }

    let mut sellable = i64::MAX;
    for (depletion, stock) in links {
        let stock = match stock {
            Some(stock) => stock,
            None => return 0,
        };
        if depletion.depletion_quantity <= 0.0 {
            return 0;
        }
        let possible = floor_units(stock.total_sub_units(), depletion.depletion_quantity);
        sellable = sellable.min(possible);
    }

    sellable
}

/// Per-mapping availability breakdown for one product.
///
/// This is the "In stock: N (uses X grams per sale, Y grams available)"
/// line rendered next to each product, plus a `missing` flag for dangling
/// references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAvailability {
    pub stock_item_id: String,

    /// Stock item description; empty when the reference dangles.
    pub description: String,

    /// Sub-unit label; empty when the reference dangles.
    pub unit_name: String,

    /// Sub-units consumed per sale.
    pub per_sale: f64,

    /// Sub-units currently on hand.
    pub units_available: f64,

    /// Whole sales this mapping alone would allow.
    pub sellable: i64,

    /// True when the mapping points at a stock item that no longer exists.
    pub missing: bool,
}

/// Expands a product's stock links into display rows.
pub fn availability(links: &[StockLink]) -> Vec<StockAvailability> {
    links
        .iter()
        .map(|(depletion, stock)| match stock {
            Some(stock) => StockAvailability {
                stock_item_id: depletion.stock_item_id.clone(),
                description: stock.description.clone(),
                unit_name: stock.unit_name.clone(),
                per_sale: depletion.depletion_quantity,
                units_available: stock.total_sub_units(),
                sellable: floor_units(stock.total_sub_units(), depletion.depletion_quantity),
                missing: false,
            },
            None => StockAvailability {
                stock_item_id: depletion.stock_item_id.clone(),
                description: String::new(),
                unit_name: String::new(),
                per_sale: depletion.depletion_quantity,
                units_available: 0.0,
                sellable: 0,
                missing: true,
            },
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(item_id: &str, total_units: f64) -> StockItem {
        StockItem {
            item_id: item_id.into(),
            description: format!("Stock {}", item_id),
            quantity: total_units,
            sub_unit_count: 1.0,
            unit_name: "unit".into(),
            total_units,
        }
    }

    fn link(stock_item_id: &str, rate: f64, stock_item: Option<StockItem>) -> StockLink {
        (
            Depletion {
                product_id: "p1".into(),
                stock_item_id: stock_item_id.into(),
                depletion_quantity: rate,
            },
            stock_item,
        )
    }

    #[test]
    fn test_no_mappings_means_zero() {
        assert_eq!(max_sellable(&[]), 0);
    }

    #[test]
    fn test_missing_stock_item_blocks_product() {
        let links = vec![
            link("a", 3.0, Some(stock("a", 30.0))),
            link("gone", 1.0, None),
        ];
        assert_eq!(max_sellable(&links), 0);
    }

    #[test]
    fn test_non_positive_rate_blocks_product() {
        let links = vec![link("a", 0.0, Some(stock("a", 30.0)))];
        assert_eq!(max_sellable(&links), 0);

        let links = vec![link("a", -2.0, Some(stock("a", 30.0)))];
        assert_eq!(max_sellable(&links), 0);
    }

    #[test]
    fn test_minimum_across_mappings_is_the_bottleneck() {
        // floor(10/3) = 3, floor(20/4) = 5 → 3
        let links = vec![
            link("a", 3.0, Some(stock("a", 10.0))),
            link("b", 4.0, Some(stock("b", 20.0))),
        ];
        assert_eq!(max_sellable(&links), 3);
    }

    #[test]
    fn test_single_mapping_floor() {
        let links = vec![link("a", 18.0, Some(stock("a", 100.0)))];
        assert_eq!(max_sellable(&links), 5);

        let links = vec![link("a", 18.0, Some(stock("a", 17.9)))];
        assert_eq!(max_sellable(&links), 0);
    }

    #[test]
    fn test_availability_rows() {
        let links = vec![
            link("a", 3.0, Some(stock("a", 10.0))),
            link("gone", 2.0, None),
        ];
        let rows = availability(&links);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].stock_item_id, "a");
        assert_eq!(rows[0].sellable, 3);
        assert_eq!(rows[0].units_available, 10.0);
        assert!(!rows[0].missing);

        assert_eq!(rows[1].stock_item_id, "gone");
        assert!(rows[1].missing);
        assert_eq!(rows[1].sellable, 0);
    }
}
