//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate is the heart of Tally POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 tally-engine (Services)                         │   │
//! │  │   reconcile pass ── depletion engine ── sales ── import/export  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ reconcile │  │ sellable  │  │   cart    │  │   │
//! │  │   │  Product  │  │ unit sync │  │ max-sell  │  │   Cart    │  │   │
//! │  │   │ StockItem │  │  repairs  │  │ bottleneck│  │ CartItem  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Record Store)                      │   │
//! │  │          SQLite repositories for the three collections          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Record types (Product, StockItem, Depletion)
//! - [`units`] - Shared numeric helpers (tolerance, floor division, parsing)
//! - [`reconcile`] - Stock item unit/sub-unit reconciliation
//! - [`sellable`] - Max-sellable computation across depletion mappings
//! - [`cart`] - Explicit cart session object
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod reconcile;
pub mod sellable;
pub mod types;
pub mod units;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use reconcile::reconcile;
pub use sellable::{max_sellable, StockAvailability};
pub use types::{Depletion, Product, RawStockItem, StockItem};
