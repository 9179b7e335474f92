//! # Engine Error Type
//!
//! Unified error type returned by the service layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally POS                              │
//! │                                                                         │
//! │  tally-core               tally-db                tally-engine         │
//! │  ───────────              ────────                ────────────         │
//! │  ValidationError ─┐                                                    │
//! │                   ├─► CoreError ──────────────┐                        │
//! │                                               ├─► EngineError          │
//! │  sqlx::Error ────────► DbError ───────────────┘   { code, message }    │
//! │                                                                         │
//! │  The code is machine-readable for programmatic handling; the message   │
//! │  is what gets shown to the operator.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tally_core::CoreError;
use tally_db::DbError;

/// Error returned from engine services.
///
/// ## Serialization
/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Not enough stock for Flat White: ..." }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for engine responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Record store operation failed
    DatabaseError,

    /// Business rule violation (broken stock link, guarded delete, ...)
    BusinessLogic,

    /// Cart operation failed
    CartError,

    /// Requested quantity exceeds sellable stock
    InsufficientStock,

    /// Internal error
    Internal,
}

impl EngineError {
    /// Creates a new engine error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        EngineError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        EngineError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to engine errors.
impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ProductNotFound(id) => EngineError::not_found("Product", id),
            CoreError::StockItemNotFound(id) => EngineError::not_found("Stock item", id),
            CoreError::ProductNotLinked(_) | CoreError::BrokenStockLink { .. } => {
                EngineError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::InsufficientStock { .. } => {
                EngineError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::StockItemInUse { .. } => {
                EngineError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::EmptyCart | CoreError::ProductNotInCart(_) => {
                EngineError::new(ErrorCode::CartError, err.to_string())
            }
            CoreError::Validation(e) => EngineError::validation(e.to_string()),
        }
    }
}

/// Converts record store errors to engine errors.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => EngineError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                EngineError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                EngineError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                EngineError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                EngineError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for EngineError {}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
