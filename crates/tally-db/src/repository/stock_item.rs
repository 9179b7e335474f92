//! # Stock Item Repository
//!
//! Keyed storage for the `stock_items` collection.
//!
//! Reads return [`RawStockItem`]: the numeric columns are nullable because
//! rows imported from the legacy system may predate the unit/sub-unit split.
//! The engine's reconciliation pass repairs such rows and writes them back
//! through [`StockItemRepository::put`], after which every column is
//! populated.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::{RawStockItem, StockItem};

/// Repository for stock item record operations.
#[derive(Debug, Clone)]
pub struct StockItemRepository {
    pool: SqlitePool,
}

impl StockItemRepository {
    /// Creates a new StockItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockItemRepository { pool }
    }

    /// Gets a stock item row by its key.
    pub async fn get_by_id(&self, item_id: &str) -> DbResult<Option<RawStockItem>> {
        let item = sqlx::query_as::<_, RawStockItem>(
            r#"
            SELECT item_id, description, quantity, sub_unit_count, unit_name, total_units
            FROM stock_items
            WHERE item_id = ?1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets all stock item rows, ordered by key.
    pub async fn get_all(&self) -> DbResult<Vec<RawStockItem>> {
        let items = sqlx::query_as::<_, RawStockItem>(
            r#"
            SELECT item_id, description, quantity, sub_unit_count, unit_name, total_units
            FROM stock_items
            ORDER BY item_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Case-insensitive substring search over key and description.
    pub async fn search(&self, query: &str) -> DbResult<Vec<RawStockItem>> {
        let query = query.trim();

        if query.is_empty() {
            return self.get_all().await;
        }

        let pattern = format!("%{}%", query.to_lowercase());
        let items = sqlx::query_as::<_, RawStockItem>(
            r#"
            SELECT item_id, description, quantity, sub_unit_count, unit_name, total_units
            FROM stock_items
            WHERE LOWER(item_id) LIKE ?1
               OR LOWER(description) LIKE ?1
            ORDER BY item_id
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Upserts a normalized stock item, keyed by item_id. Last write wins.
    pub async fn put(&self, item: &StockItem) -> DbResult<()> {
        debug!(item_id = %item.item_id, total_units = item.total_units, "Putting stock item");

        sqlx::query(
            r#"
            INSERT INTO stock_items
                (item_id, description, quantity, sub_unit_count, unit_name, total_units)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (item_id) DO UPDATE SET
                description = excluded.description,
                quantity = excluded.quantity,
                sub_unit_count = excluded.sub_unit_count,
                unit_name = excluded.unit_name,
                total_units = excluded.total_units
            "#,
        )
        .bind(&item.item_id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.sub_unit_count)
        .bind(&item.unit_name)
        .bind(item.total_units)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Upserts a raw row as-is, preserving missing fields as NULLs.
    ///
    /// Used to carry over legacy records that reconciliation has not seen
    /// yet (and by tests planting such records).
    pub async fn put_raw(&self, item: &RawStockItem) -> DbResult<()> {
        debug!(item_id = %item.item_id, "Putting raw stock item");

        sqlx::query(
            r#"
            INSERT INTO stock_items
                (item_id, description, quantity, sub_unit_count, unit_name, total_units)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (item_id) DO UPDATE SET
                description = excluded.description,
                quantity = excluded.quantity,
                sub_unit_count = excluded.sub_unit_count,
                unit_name = excluded.unit_name,
                total_units = excluded.total_units
            "#,
        )
        .bind(&item.item_id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.sub_unit_count)
        .bind(&item.unit_name)
        .bind(item.total_units)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a stock item by key.
    ///
    /// This is the raw keyed delete; the engine layer guards it against
    /// orphaning depletion mappings.
    pub async fn delete(&self, item_id: &str) -> DbResult<()> {
        debug!(item_id = %item_id, "Deleting stock item");

        let result = sqlx::query("DELETE FROM stock_items WHERE item_id = ?1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockItem", item_id));
        }

        Ok(())
    }

    /// Deletes every stock item. Returns how many were removed.
    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM stock_items")
            .execute(&self.pool)
            .await?;

        debug!(count = result.rows_affected(), "Cleared stock items");
        Ok(result.rows_affected())
    }

    /// Counts stored stock items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
