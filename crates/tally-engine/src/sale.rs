//! # Sale Service
//!
//! Cart building and sale completion.
//!
//! ## Completion Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  complete_sale(cart)                                                    │
//! │                                                                         │
//! │  acquire sale lock ─────────── single-writer serialization point        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LOAD     every stock item any cart line touches → working set         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  VALIDATE each line against the working set, in cart order,            │
//! │           applying its consumption to the set as it passes;            │
//! │           two lines draining the same stock item see each other        │
//! │       │                                                                 │
//! │       │   any failure here → whole sale rejected, store untouched      │
//! │       ▼                                                                 │
//! │  PERSIST  changed stock items in first-touched order                   │
//! │       │   a storage failure surfaces; already-written rows stand       │
//! │       ▼                                                                 │
//! │  clear cart, return SaleOutcome (lines, total, updated stock)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock makes the read-validate-apply-persist sequence atomic with
//! respect to other sales in this process. Cross-process writers against the
//! same database file remain out of scope.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::EngineResult;
use crate::sellable::DepletionEngine;
use tally_core::units::floor_units;
use tally_core::validation::validate_sale_quantity;
use tally_core::{reconcile, Cart, CartTotals, CoreError, StockItem};
use tally_db::Database;

/// One completed sale line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub line_total: f64,
}

/// What a completed sale did.
///
/// Carries the updated stock items back to the caller; whether and what to
/// re-render is the caller's decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOutcome {
    pub lines: Vec<SaleLine>,
    pub total: f64,
    pub updated_stock: Vec<StockItem>,
}

/// Builds carts and completes sales.
#[derive(Debug, Clone)]
pub struct SaleService {
    db: Database,
    engine: DepletionEngine,
    sale_lock: Arc<Mutex<()>>,
}

impl SaleService {
    /// Creates a new SaleService over the given database.
    pub fn new(db: Database) -> Self {
        SaleService {
            engine: DepletionEngine::new(db.clone()),
            db,
            sale_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the read-only depletion engine this service validates with.
    pub fn engine(&self) -> &DepletionEngine {
        &self.engine
    }

    /// Adds a product to the cart, capping the line at the product's
    /// freshly computed max-sellable quantity.
    ///
    /// Returns the updated cart totals.
    pub async fn add_to_cart(
        &self,
        cart: &mut Cart,
        product_id: &str,
        quantity: i64,
    ) -> EngineResult<CartTotals> {
        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let max_sellable = self.engine.max_sellable(product_id).await?;
        cart.add_item(&product, quantity, max_sellable)?;

        debug!(product_id = %product_id, quantity, max_sellable, "Added to cart");
        Ok(CartTotals::from(&*cart))
    }

    /// Completes the sale in the cart, consuming stock through every line's
    /// depletion mappings.
    ///
    /// Every line is re-validated against live stock before anything is
    /// written; the add-time `max_quantity` snapshots in the cart are not
    /// trusted. On success the cart is cleared.
    pub async fn complete_sale(&self, cart: &mut Cart) -> EngineResult<SaleOutcome> {
        let _guard = self.sale_lock.lock().await;

        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        // Working set of stock items, shared across lines so a later line
        // sees what an earlier line consumed. `touched` keeps first-touch
        // order for the persist phase.
        let mut stock: HashMap<String, StockItem> = HashMap::new();
        let mut touched: Vec<String> = Vec::new();
        let mut lines: Vec<SaleLine> = Vec::new();

        for item in &cart.items {
            validate_sale_quantity(item.quantity).map_err(CoreError::from)?;

            let mappings = self.db.depletions().for_product(&item.product_id).await?;
            if mappings.is_empty() {
                return Err(CoreError::ProductNotLinked(item.product_id.clone()).into());
            }

            for mapping in &mappings {
                if !stock.contains_key(&mapping.stock_item_id) {
                    match self.db.stock_items().get_by_id(&mapping.stock_item_id).await? {
                        Some(raw) => {
                            stock.insert(mapping.stock_item_id.clone(), reconcile(&raw).0);
                            touched.push(mapping.stock_item_id.clone());
                        }
                        None => {
                            return Err(CoreError::BrokenStockLink {
                                product_id: item.product_id.clone(),
                                stock_item_id: mapping.stock_item_id.clone(),
                            }
                            .into());
                        }
                    }
                }
                if mapping.depletion_quantity <= 0.0 {
                    return Err(CoreError::BrokenStockLink {
                        product_id: item.product_id.clone(),
                        stock_item_id: mapping.stock_item_id.clone(),
                    }
                    .into());
                }
            }

            let available = mappings
                .iter()
                .map(|m| {
                    floor_units(
                        stock[&m.stock_item_id].total_sub_units(),
                        m.depletion_quantity,
                    )
                })
                .min()
                .unwrap_or(0);

            if item.quantity > available {
                return Err(CoreError::InsufficientStock {
                    product: item.name.clone(),
                    available,
                    requested: item.quantity,
                }
                .into());
            }

            for mapping in &mappings {
                if let Some(entry) = stock.get_mut(&mapping.stock_item_id) {
                    entry.deplete(mapping.depletion_quantity * item.quantity as f64);
                }
            }

            lines.push(SaleLine {
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                line_total: item.line_total(),
            });
        }

        // Persist phase. A failure here surfaces to the caller and aborts
        // the remaining writes; rows already written stand as committed.
        let mut updated_stock = Vec::with_capacity(touched.len());
        for item_id in &touched {
            let item = &stock[item_id];
            self.db.stock_items().put(item).await?;
            updated_stock.push(item.clone());
        }

        let outcome = SaleOutcome {
            total: cart.total(),
            lines,
            updated_stock,
        };

        info!(
            lines = outcome.lines.len(),
            total = outcome.total,
            stock_items = outcome.updated_stock.len(),
            "Sale completed"
        );

        cart.clear();
        Ok(outcome)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
