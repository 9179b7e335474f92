//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Record store failures                          │
//! │                                                                         │
//! │  tally-engine errors (separate crate)                                  │
//! │  └── EngineError      - What callers see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → EngineError → Caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations or domain logic failures, and
/// are translated to user-facing messages by the engine layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Stock item cannot be found.
    #[error("Stock item not found: {0}")]
    StockItemNotFound(String),

    /// Product has no depletion mappings at all.
    ///
    /// Unlinked products are informational only: with nothing to consume
    /// they can never be sold, so a sale line for one is rejected outright.
    #[error("Product {0} is not linked to any stock item")]
    ProductNotLinked(String),

    /// A depletion mapping points at a missing stock item, or carries a
    /// non-positive consumption rate. One broken link blocks the whole
    /// product.
    #[error("Product {product_id} has a broken stock link to {stock_item_id}")]
    BrokenStockLink {
        product_id: String,
        stock_item_id: String,
    },

    /// Requested quantity exceeds what current stock can cover.
    #[error("Not enough stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A stock item is still referenced by depletion mappings and cannot be
    /// deleted without orphaning them.
    #[error("Stock item {item_id} is referenced by {count} depletion mapping(s)")]
    StockItemInUse { item_id: String, count: usize },

    /// Sale attempted with an empty cart.
    #[error("No items in sale")]
    EmptyCart,

    /// Cart operation targeted a product that is not in the cart.
    #[error("Product {0} is not in the cart")]
    ProductNotInCart(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user or imported input doesn't meet requirements, and
/// are raised before any state is mutated.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Value is below the allowed minimum.
    #[error("{field} must be at least {min}")]
    TooSmall { field: String, min: f64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
