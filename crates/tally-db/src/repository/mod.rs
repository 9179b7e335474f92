//! # Repositories
//!
//! One repository per collection, each exposing the same keyed contract:
//! get-by-key, get-all, put (upsert, last-write-wins), delete.
//!
//! - [`product::ProductRepository`] - the `products` collection
//! - [`stock_item::StockItemRepository`] - the `stock_items` collection
//! - [`depletion::DepletionRepository`] - the `product_stock_depletion`
//!   collection (composite-keyed association rows)

pub mod depletion;
pub mod product;
pub mod stock_item;
