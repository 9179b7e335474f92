//! # Product Repository
//!
//! Keyed storage for the `products` collection.
//!
//! Puts are upserts: the caller owns key generation (ids are immutable once
//! assigned) and a second put with the same id overwrites the record,
//! last-write-wins. Deleting a product cascades nothing; depletion rows
//! referencing it are the caller's cleanup.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::Product;

/// Repository for product record operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price, description
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets all products, ordered by name.
    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price, description
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Case-insensitive substring search over name, category and id.
    ///
    /// An empty query returns all products.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, "Searching products");

        if query.is_empty() {
            return self.get_all().await;
        }

        let pattern = format!("%{}%", query.to_lowercase());
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price, description
            FROM products
            WHERE LOWER(name) LIKE ?1
               OR LOWER(category) LIKE ?1
               OR LOWER(id) LIKE ?1
            ORDER BY name
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Upserts a product, keyed by id. Last write wins.
    pub async fn put(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Putting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, price, description)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                price = excluded.price,
                description = excluded.description
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a product by id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no record with that id existed
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes every product. Returns how many were removed.
    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&self.pool)
            .await?;

        debug!(count = result.rows_affected(), "Cleared products");
        Ok(result.rows_affected())
    }

    /// Counts stored products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new product id.
///
/// Ids remain caller-suppliable strings; this helper keeps the legacy
/// `p`-prefixed shape with a uuid for the unique part.
pub fn new_product_id() -> String {
    format!("p{}", Uuid::new_v4().simple())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn product(id: &str, name: &str, price: f64) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            category: "Drinks".into(),
            price,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_put_get_delete_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.put(&product("p1", "Espresso", 3.5)).await.unwrap();

        let loaded = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Espresso");
        assert_eq!(loaded.price, 3.5);

        repo.delete("p1").await.unwrap();
        assert!(repo.get_by_id("p1").await.unwrap().is_none());
        assert!(matches!(
            repo.delete("p1").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_put_is_last_write_wins() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.put(&product("p1", "Espresso", 3.5)).await.unwrap();
        repo.put(&product("p1", "Double Espresso", 4.5)).await.unwrap();

        let loaded = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Double Espresso");
        assert_eq!(loaded.price, 4.5);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_matches_name_category_and_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.put(&product("p1", "Espresso", 3.5)).await.unwrap();
        repo.put(&product("p2", "Green Tea", 2.5)).await.unwrap();

        assert_eq!(repo.search("ESPRE").await.unwrap().len(), 1);
        assert_eq!(repo.search("drinks").await.unwrap().len(), 2);
        assert_eq!(repo.search("p2").await.unwrap().len(), 1);
        assert_eq!(repo.search("").await.unwrap().len(), 2);
        assert!(repo.search("nope").await.unwrap().is_empty());
    }

    #[test]
    fn test_new_product_id_shape() {
        let id = new_product_id();
        assert!(id.starts_with('p'));
        assert!(id.len() > 10);
        assert_ne!(new_product_id(), new_product_id());
    }
}
