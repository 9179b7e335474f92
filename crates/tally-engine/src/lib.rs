//! # tally-engine: Orchestration Services for Tally POS
//!
//! Ties the pure logic in `tally-core` to the record store in `tally-db`.
//!
//! ## Service Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         tally-engine                                    │
//! │                                                                         │
//! │  StockService      reconcile_all() at load time, guarded deletes       │
//! │  DepletionEngine   max_sellable(product) / availability(product)       │
//! │  SaleService       add_to_cart() / complete_sale(cart)                 │
//! │  CatalogService    save_product(), replace_depletions()                │
//! │  TransferService   import/export (CSV + JSON)                          │
//! │                                                                         │
//! │  Every mutation returns the updated entities (or a summary); there is  │
//! │  no implicit refresh hook; the caller decides what to re-render.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("./tally.db")).await?;
//! StockService::new(db.clone()).reconcile_all().await?;   // one-time repair pass
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod sale;
pub mod sellable;
pub mod stock;
pub mod transfer;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::CatalogService;
pub use error::{EngineError, EngineResult, ErrorCode};
pub use sale::{SaleLine, SaleOutcome, SaleService};
pub use sellable::DepletionEngine;
pub use stock::{ReconcileSummary, StockService};
pub use transfer::{ImportSummary, TransferFormat, TransferService};
