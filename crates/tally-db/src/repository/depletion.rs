//! # Depletion Repository
//!
//! Keyed storage for the `product_stock_depletion` collection.
//!
//! Rows are keyed by the composite `(product_id, stock_item_id)` pair: at
//! most one mapping per product/stock-item combination. The collection is a
//! pure association owned by neither side, so it is queryable from either
//! direction.
//!
//! Referential integrity is deliberately loose: a mapping may outlive the
//! product or stock item it points at, and readers treat such rows as
//! dangling rather than failing.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::Depletion;

/// Repository for depletion mapping operations.
#[derive(Debug, Clone)]
pub struct DepletionRepository {
    pool: SqlitePool,
}

impl DepletionRepository {
    /// Creates a new DepletionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DepletionRepository { pool }
    }

    /// Gets a single mapping by its composite key.
    pub async fn get(&self, product_id: &str, stock_item_id: &str) -> DbResult<Option<Depletion>> {
        let depletion = sqlx::query_as::<_, Depletion>(
            r#"
            SELECT product_id, stock_item_id, depletion_quantity
            FROM product_stock_depletion
            WHERE product_id = ?1 AND stock_item_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(stock_item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(depletion)
    }

    /// Gets all mappings for one product.
    pub async fn for_product(&self, product_id: &str) -> DbResult<Vec<Depletion>> {
        let depletions = sqlx::query_as::<_, Depletion>(
            r#"
            SELECT product_id, stock_item_id, depletion_quantity
            FROM product_stock_depletion
            WHERE product_id = ?1
            ORDER BY stock_item_id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(depletions)
    }

    /// Gets all mappings pointing at one stock item.
    pub async fn for_stock_item(&self, stock_item_id: &str) -> DbResult<Vec<Depletion>> {
        let depletions = sqlx::query_as::<_, Depletion>(
            r#"
            SELECT product_id, stock_item_id, depletion_quantity
            FROM product_stock_depletion
            WHERE stock_item_id = ?1
            ORDER BY product_id
            "#,
        )
        .bind(stock_item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(depletions)
    }

    /// Gets every mapping.
    pub async fn get_all(&self) -> DbResult<Vec<Depletion>> {
        let depletions = sqlx::query_as::<_, Depletion>(
            r#"
            SELECT product_id, stock_item_id, depletion_quantity
            FROM product_stock_depletion
            ORDER BY product_id, stock_item_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(depletions)
    }

    /// Upserts a mapping, keyed by (product_id, stock_item_id).
    pub async fn put(&self, depletion: &Depletion) -> DbResult<()> {
        debug!(
            product_id = %depletion.product_id,
            stock_item_id = %depletion.stock_item_id,
            rate = depletion.depletion_quantity,
            "Putting depletion mapping"
        );

        sqlx::query(
            r#"
            INSERT INTO product_stock_depletion (product_id, stock_item_id, depletion_quantity)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (product_id, stock_item_id) DO UPDATE SET
                depletion_quantity = excluded.depletion_quantity
            "#,
        )
        .bind(&depletion.product_id)
        .bind(&depletion.stock_item_id)
        .bind(depletion.depletion_quantity)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a mapping by its composite key.
    pub async fn delete(&self, product_id: &str, stock_item_id: &str) -> DbResult<()> {
        debug!(product_id = %product_id, stock_item_id = %stock_item_id, "Deleting depletion mapping");

        let result = sqlx::query(
            "DELETE FROM product_stock_depletion WHERE product_id = ?1 AND stock_item_id = ?2",
        )
        .bind(product_id)
        .bind(stock_item_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Depletion",
                format!("{}/{}", product_id, stock_item_id),
            ));
        }

        Ok(())
    }

    /// Deletes every mapping for one product (the replace-set edit flow).
    /// Returns how many were removed.
    pub async fn delete_for_product(&self, product_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM product_stock_depletion WHERE product_id = ?1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        debug!(
            product_id = %product_id,
            count = result.rows_affected(),
            "Cleared depletion mappings for product"
        );
        Ok(result.rows_affected())
    }

    /// Counts mappings referencing one stock item (the delete guard).
    pub async fn count_for_stock_item(&self, stock_item_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM product_stock_depletion WHERE stock_item_id = ?1",
        )
        .bind(stock_item_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Counts all mappings.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_stock_depletion")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn mapping(product_id: &str, stock_item_id: &str, rate: f64) -> Depletion {
        Depletion {
            product_id: product_id.into(),
            stock_item_id: stock_item_id.into(),
            depletion_quantity: rate,
        }
    }

    #[tokio::test]
    async fn test_composite_key_upsert() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.depletions();

        repo.put(&mapping("p1", "beans", 18.0)).await.unwrap();
        repo.put(&mapping("p1", "beans", 20.0)).await.unwrap();

        let loaded = repo.get("p1", "beans").await.unwrap().unwrap();
        assert_eq!(loaded.depletion_quantity, 20.0);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_queries_from_both_directions() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.depletions();

        repo.put(&mapping("p1", "beans", 18.0)).await.unwrap();
        repo.put(&mapping("p1", "milk", 160.0)).await.unwrap();
        repo.put(&mapping("p2", "beans", 9.0)).await.unwrap();

        assert_eq!(repo.for_product("p1").await.unwrap().len(), 2);
        assert_eq!(repo.for_stock_item("beans").await.unwrap().len(), 2);
        assert_eq!(repo.count_for_stock_item("milk").await.unwrap(), 1);
        assert_eq!(repo.get_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_for_product_clears_the_set() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.depletions();

        repo.put(&mapping("p1", "beans", 18.0)).await.unwrap();
        repo.put(&mapping("p1", "milk", 160.0)).await.unwrap();
        repo.put(&mapping("p2", "beans", 9.0)).await.unwrap();

        assert_eq!(repo.delete_for_product("p1").await.unwrap(), 2);
        assert!(repo.for_product("p1").await.unwrap().is_empty());
        // Other products untouched.
        assert_eq!(repo.for_product("p2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_single_mapping() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.depletions();

        repo.put(&mapping("p1", "beans", 18.0)).await.unwrap();
        repo.delete("p1", "beans").await.unwrap();

        assert!(repo.get("p1", "beans").await.unwrap().is_none());
        assert!(matches!(
            repo.delete("p1", "beans").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
