//! # Stock Service
//!
//! The reconciliation pass plus guarded stock item mutations.
//!
//! ## Reconciliation Pass
//! ```text
//! load all stock rows ──► reconcile() each ──► persist only changed rows
//!
//! Runs once at load time. Idempotent: a second pass repairs nothing and
//! therefore writes nothing.
//! ```

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult, ErrorCode};
use tally_core::validation::validate_stock_item;
use tally_core::{reconcile, CoreError, StockItem};
use tally_db::Database;

/// Result of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    /// Rows examined.
    pub checked: usize,

    /// Rows that needed a repair and were written back.
    pub repaired: usize,
}

/// Stock item operations above the raw repository.
#[derive(Debug, Clone)]
pub struct StockService {
    db: Database,
}

impl StockService {
    /// Creates a new StockService over the given database.
    pub fn new(db: Database) -> Self {
        StockService { db }
    }

    /// Repairs every stock row into the normalized unit/sub-unit shape,
    /// persisting only the rows that actually changed.
    pub async fn reconcile_all(&self) -> EngineResult<ReconcileSummary> {
        let rows = self.db.stock_items().get_all().await?;
        let checked = rows.len();
        let mut repaired = 0usize;

        for raw in &rows {
            let (item, changed) = reconcile(raw);
            if changed {
                debug!(item_id = %item.item_id, "Repairing stock item");
                self.db.stock_items().put(&item).await?;
                repaired += 1;
            }
        }

        info!(checked, repaired, "Stock reconciliation pass complete");
        Ok(ReconcileSummary { checked, repaired })
    }

    /// Validates and upserts a stock item.
    pub async fn save_stock_item(&self, item: &StockItem) -> EngineResult<()> {
        validate_stock_item(item).map_err(CoreError::from)?;
        self.db.stock_items().put(item).await?;
        Ok(())
    }

    /// Deletes a stock item, refusing while any depletion mapping still
    /// references it. Deleting anyway would silently orphan the mapping.
    pub async fn delete_stock_item(&self, item_id: &str) -> EngineResult<()> {
        let references = self.db.depletions().count_for_stock_item(item_id).await?;
        if references > 0 {
            return Err(CoreError::StockItemInUse {
                item_id: item_id.to_string(),
                count: references as usize,
            }
            .into());
        }

        self.db.stock_items().delete(item_id).await?;
        info!(item_id = %item_id, "Stock item deleted");
        Ok(())
    }

    /// Deletes every stock item, refusing while any depletion mappings
    /// exist. Returns how many items were removed.
    pub async fn clear_stock_items(&self) -> EngineResult<u64> {
        let references = self.db.depletions().count().await?;
        if references > 0 {
            return Err(EngineError::new(
                ErrorCode::BusinessLogic,
                format!(
                    "Cannot clear stock items: {} depletion mapping(s) still reference them",
                    references
                ),
            ));
        }

        let removed = self.db.stock_items().clear().await?;
        info!(removed, "All stock items cleared");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
