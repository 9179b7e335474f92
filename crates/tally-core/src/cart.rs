//! # Cart Session
//!
//! The explicit cart object a sale is built in.
//!
//! The cart is passed to and returned from sale operations rather than living
//! in ambient shared state; several independent carts can exist side by side
//! and the engine stays testable without any UI attached.
//!
//! ## Snapshot Semantics
//! `CartItem` freezes the product name and price at add time, along with the
//! max-sellable quantity observed then. The snapshot caps further adds of the
//! same product, but it is advisory only: [`complete_sale`] re-validates
//! every line against live stock at commit time.
//!
//! [`complete_sale`]: ../../tally_engine/sale/struct.SaleService.html

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Product;
use crate::validation::validate_sale_quantity;

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product record key.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding (frozen).
    pub price: f64,

    /// Quantity to sell.
    pub quantity: i64,

    /// Max sellable quantity observed when the product was added.
    pub max_quantity: i64,
}

impl CartItem {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// An in-progress sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines, unique by product id.
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds a product to the cart, merging with an existing line for the
    /// same product.
    ///
    /// `max_sellable` is the freshly computed sellable quantity for the
    /// product; the merged line quantity may not exceed it.
    pub fn add_item(&mut self, product: &Product, quantity: i64, max_sellable: i64) -> CoreResult<()> {
        validate_sale_quantity(quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let requested = item.quantity + quantity;
            if requested > max_sellable {
                return Err(CoreError::InsufficientStock {
                    product: product.name.clone(),
                    available: max_sellable,
                    requested,
                });
            }
            item.quantity = requested;
            item.max_quantity = max_sellable;
            return Ok(());
        }

        if quantity > max_sellable {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: max_sellable,
                requested: quantity,
            });
        }

        self.items.push(CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity,
            max_quantity: max_sellable,
        });
        Ok(())
    }

    /// Sets the quantity of an existing line; a quantity of zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }
        validate_sale_quantity(quantity)?;

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                if quantity > item.max_quantity {
                    return Err(CoreError::InsufficientStock {
                        product: item.name.clone(),
                        available: item.max_quantity,
                        requested: quantity,
                    });
                }
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ProductNotInCart(product_id.to_string())),
        }
    }

    /// Removes a line by product id.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == before {
            Err(CoreError::ProductNotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Grand total across all lines.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.line_total()).sum()
    }
}

/// Cart totals summary for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: f64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
