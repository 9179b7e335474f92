//! # Depletion Engine
//!
//! Read-only sellability lookups: fetches a product's depletion mappings and
//! the stock items they point at, then delegates to the pure math in
//! `tally_core::sellable`.

use tracing::debug;

use crate::error::EngineResult;
use tally_core::sellable::{self, StockAvailability, StockLink};
use tally_core::reconcile;
use tally_db::Database;

/// Computes how many units of a product can be sold without driving any
/// linked stock item negative.
///
/// Side-effect free: nothing is written, not even repairs; rows are
/// normalized in memory only.
#[derive(Debug, Clone)]
pub struct DepletionEngine {
    db: Database,
}

impl DepletionEngine {
    /// Creates a new DepletionEngine over the given database.
    pub fn new(db: Database) -> Self {
        DepletionEngine { db }
    }

    /// Fetches a product's mappings joined with their stock items.
    ///
    /// Stock rows are reconciled in memory so the legacy
    /// quantity-times-sub-unit-count fallback applies uniformly; dangling
    /// references come back as `None`.
    pub async fn stock_links(&self, product_id: &str) -> EngineResult<Vec<StockLink>> {
        let mappings = self.db.depletions().for_product(product_id).await?;

        let mut links = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let stock = self
                .db
                .stock_items()
                .get_by_id(&mapping.stock_item_id)
                .await?
                .map(|raw| reconcile(&raw).0);
            links.push((mapping, stock));
        }

        Ok(links)
    }

    /// Maximum sellable quantity for a product (0 when unmapped or any
    /// link is broken).
    pub async fn max_sellable(&self, product_id: &str) -> EngineResult<i64> {
        let links = self.stock_links(product_id).await?;
        let sellable = sellable::max_sellable(&links);

        debug!(product_id = %product_id, sellable, mappings = links.len(), "Computed max sellable");
        Ok(sellable)
    }

    /// Per-mapping availability breakdown for display next to a product.
    pub async fn availability(&self, product_id: &str) -> EngineResult<Vec<StockAvailability>> {
        let links = self.stock_links(product_id).await?;
        Ok(sellable::availability(&links))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{Depletion, RawStockItem, StockItem};
    use tally_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

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

    fn mapping(product_id: &str, stock_item_id: &str, rate: f64) -> Depletion {
        Depletion {
            product_id: product_id.into(),
            stock_item_id: stock_item_id.into(),
            depletion_quantity: rate,
        }
    }

    #[tokio::test]
    async fn test_unmapped_product_is_unsellable() {
        let db = test_db().await;
        let engine = DepletionEngine::new(db);

        assert_eq!(engine.max_sellable("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_min_across_mappings() {
        let db = test_db().await;
        db.stock_items().put(&stock("a", 10.0)).await.unwrap();
        db.stock_items().put(&stock("b", 20.0)).await.unwrap();
        db.depletions().put(&mapping("p1", "a", 3.0)).await.unwrap();
        db.depletions().put(&mapping("p1", "b", 4.0)).await.unwrap();

        let engine = DepletionEngine::new(db);
        // floor(10/3) = 3, floor(20/4) = 5 → 3
        assert_eq!(engine.max_sellable("p1").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_dangling_reference_blocks_product() {
        let db = test_db().await;
        db.stock_items().put(&stock("a", 100.0)).await.unwrap();
        db.depletions().put(&mapping("p1", "a", 1.0)).await.unwrap();
        db.depletions().put(&mapping("p1", "ghost", 1.0)).await.unwrap();

        let engine = DepletionEngine::new(db);
        assert_eq!(engine.max_sellable("p1").await.unwrap(), 0);

        let rows = engine.availability("p1").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|r| r.missing && r.stock_item_id == "ghost"));
    }

    #[tokio::test]
    async fn test_legacy_rows_use_quantity_fallback() {
        let db = test_db().await;
        // Pre-split row: 6 main units, no total_units column value.
        db.stock_items()
            .put_raw(&RawStockItem {
                item_id: "legacy".into(),
                description: "Old stock".into(),
                quantity: Some(6.0),
                ..Default::default()
            })
            .await
            .unwrap();
        db.depletions()
            .put(&mapping("p1", "legacy", 2.0))
            .await
            .unwrap();

        let engine = DepletionEngine::new(db);
        // total sub-units derives to 6 → floor(6/2) = 3
        assert_eq!(engine.max_sellable("p1").await.unwrap(), 3);
    }
}
