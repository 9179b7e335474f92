//! # Catalog Service
//!
//! Product editing plus the mapping-set edit flow.
//!
//! Editing a product's depletion mappings is a *replace*, not a diff: the
//! prior set is deleted wholesale and the new set inserted, exactly what the
//! product form submits.

use tracing::{debug, info};

use crate::error::EngineResult;
use tally_core::validation::{validate_depletion, validate_product};
use tally_core::{CoreError, Depletion, Product};
use tally_db::Database;

/// Product and depletion-mapping editing.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    /// Creates a new CatalogService over the given database.
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    /// Validates and upserts a product.
    pub async fn save_product(&self, product: &Product) -> EngineResult<()> {
        validate_product(product).map_err(CoreError::from)?;
        self.db.products().put(product).await?;
        Ok(())
    }

    /// Saves a product together with its full depletion mapping set.
    ///
    /// This is the product-form submit: the product is upserted and its
    /// mapping set replaced in one go. Returns how many mappings the product
    /// ends up with.
    pub async fn save_product_with_depletions(
        &self,
        product: &Product,
        mappings: Vec<Depletion>,
    ) -> EngineResult<usize> {
        validate_product(product).map_err(CoreError::from)?;
        self.db.products().put(product).await?;
        self.replace_depletions(&product.id, mappings).await
    }

    /// Replaces a product's entire depletion mapping set.
    ///
    /// Each mapping is re-keyed to `product_id` (the form rows carry the
    /// stock side only), validated, the old set deleted, and the new set
    /// inserted. Duplicate stock items collapse through the composite-key
    /// upsert, last row wins.
    pub async fn replace_depletions(
        &self,
        product_id: &str,
        mappings: Vec<Depletion>,
    ) -> EngineResult<usize> {
        let mut keyed = Vec::with_capacity(mappings.len());
        for mut mapping in mappings {
            mapping.product_id = product_id.to_string();
            validate_depletion(&mapping).map_err(CoreError::from)?;
            keyed.push(mapping);
        }

        let removed = self.db.depletions().delete_for_product(product_id).await?;
        for mapping in &keyed {
            self.db.depletions().put(mapping).await?;
        }

        info!(
            product_id = %product_id,
            removed,
            inserted = keyed.len(),
            "Replaced depletion mapping set"
        );
        Ok(keyed.len())
    }

    /// Deletes a product by id.
    ///
    /// Cascades nothing: depletion rows for the product stay behind (and
    /// render as dangling) until the caller clears them, e.g. with
    /// `replace_depletions(id, vec![])`.
    pub async fn delete_product(&self, id: &str) -> EngineResult<()> {
        self.db.products().delete(id).await?;
        debug!(id = %id, "Product deleted");
        Ok(())
    }

    /// Gets a product's current depletion mappings.
    pub async fn depletions_for_product(&self, product_id: &str) -> EngineResult<Vec<Depletion>> {
        Ok(self.db.depletions().for_product(product_id).await?)
    }

    /// Deletes every product. Returns how many were removed.
    pub async fn clear_products(&self) -> EngineResult<u64> {
        let removed = self.db.products().clear().await?;
        info!(removed, "All products cleared");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tally_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            category: "Coffee".into(),
            price: 3.0,
            description: String::new(),
        }
    }

    fn mapping(stock_item_id: &str, rate: f64) -> Depletion {
        Depletion {
            product_id: String::new(), // re-keyed by the service
            stock_item_id: stock_item_id.into(),
            depletion_quantity: rate,
        }
    }

    #[tokio::test]
    async fn test_save_product_validates() {
        let db = test_db().await;
        let service = CatalogService::new(db);

        let mut bad = product("p1", "Espresso");
        bad.price = -1.0;
        let err = service.save_product(&bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mut no_name = product("p1", "");
        no_name.price = 2.0;
        assert!(service.save_product(&no_name).await.is_err());
    }

    #[tokio::test]
    async fn test_edit_flow_replaces_mapping_set() {
        let db = test_db().await;
        let service = CatalogService::new(db.clone());

        let p = product("p1", "Flat White");
        let count = service
            .save_product_with_depletions(&p, vec![mapping("beans", 18.0), mapping("milk", 160.0)])
            .await
            .unwrap();
        assert_eq!(count, 2);

        // Re-submit with a different set: old rows must be gone.
        let count = service
            .save_product_with_depletions(&p, vec![mapping("oat-milk", 180.0)])
            .await
            .unwrap();
        assert_eq!(count, 1);

        let current = service.depletions_for_product("p1").await.unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].stock_item_id, "oat-milk");
        assert_eq!(current[0].product_id, "p1");
    }

    #[tokio::test]
    async fn test_invalid_mapping_rejects_whole_set_before_deleting() {
        let db = test_db().await;
        let service = CatalogService::new(db.clone());

        let p = product("p1", "Flat White");
        service
            .save_product_with_depletions(&p, vec![mapping("beans", 18.0)])
            .await
            .unwrap();

        // Zero-rate mapping fails validation; the existing set must survive.
        let err = service
            .replace_depletions("p1", vec![mapping("beans", 0.0)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let current = service.depletions_for_product("p1").await.unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].depletion_quantity, 18.0);
    }

    #[tokio::test]
    async fn test_delete_product_leaves_mappings_behind() {
        let db = test_db().await;
        let service = CatalogService::new(db.clone());

        let p = product("p1", "Flat White");
        service
            .save_product_with_depletions(&p, vec![mapping("beans", 18.0)])
            .await
            .unwrap();

        service.delete_product("p1").await.unwrap();
        assert!(db.products().get_by_id("p1").await.unwrap().is_none());

        // Non-cascading on purpose: the mapping dangles until cleaned up.
        assert_eq!(service.depletions_for_product("p1").await.unwrap().len(), 1);

        service.replace_depletions("p1", vec![]).await.unwrap();
        assert!(service.depletions_for_product("p1").await.unwrap().is_empty());
    }
}
