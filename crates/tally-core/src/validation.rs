//! # Validation Module
//!
//! Business rule validation for records entering the store.
//!
//! Validation runs synchronously before any mutation: a record that fails
//! here never reaches a repository. Reconciliation (see [`crate::reconcile`])
//! is the opposite discipline (it repairs instead of rejecting) and applies
//! only to stock rows already in storage.

use crate::error::ValidationError;
use crate::types::{Depletion, Product, StockItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product before upsert.
///
/// ## Rules
/// - `id` must be non-empty (it is the record key)
/// - `name` must be non-empty
/// - `price` must not be negative (zero is allowed: giveaway items)
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if product.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if !(product.price >= 0.0) {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock item before upsert.
///
/// ## Rules
/// - `item_id` and `description` must be non-empty
/// - `unit_name` must be non-empty
/// - `sub_unit_count >= 1`
/// - `total_units >= 0`
pub fn validate_stock_item(item: &StockItem) -> ValidationResult<()> {
    if item.item_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "itemId".to_string(),
        });
    }

    if item.description.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if item.unit_name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "unitName".to_string(),
        });
    }

    if !(item.sub_unit_count >= 1.0) {
        return Err(ValidationError::TooSmall {
            field: "subUnitCount".to_string(),
            min: 1.0,
        });
    }

    if !(item.total_units >= 0.0) {
        return Err(ValidationError::MustBeNonNegative {
            field: "totalUnits".to_string(),
        });
    }

    Ok(())
}

/// Validates a depletion mapping.
///
/// ## Rules
/// - Both key halves must be non-empty
/// - `depletion_quantity > 0` (a zero-rate mapping would make the product
///   infinitely sellable against finite stock)
pub fn validate_depletion(depletion: &Depletion) -> ValidationResult<()> {
    if depletion.product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "productId".to_string(),
        });
    }

    if depletion.stock_item_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "stockItemId".to_string(),
        });
    }

    if !(depletion.depletion_quantity > 0.0) {
        return Err(ValidationError::MustBePositive {
            field: "depletionQuantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale quantity: must be a positive whole number.
pub fn validate_sale_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: "p1".into(),
            name: "Espresso".into(),
            category: "Drinks".into(),
            price: 3.5,
            description: String::new(),
        }
    }

    fn stock_item() -> StockItem {
        StockItem {
            item_id: "beans".into(),
            description: "Arabica beans".into(),
            quantity: 1.0,
            sub_unit_count: 1000.0,
            unit_name: "gram".into(),
            total_units: 1000.0,
        }
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&product()).is_ok());

        let mut p = product();
        p.id = "  ".into();
        assert!(validate_product(&p).is_err());

        let mut p = product();
        p.name = String::new();
        assert!(validate_product(&p).is_err());

        let mut p = product();
        p.price = -0.01;
        assert!(validate_product(&p).is_err());

        // NaN price must not pass the non-negative check.
        let mut p = product();
        p.price = f64::NAN;
        assert!(validate_product(&p).is_err());

        let mut p = product();
        p.price = 0.0;
        assert!(validate_product(&p).is_ok());
    }

    #[test]
    fn test_validate_stock_item() {
        assert!(validate_stock_item(&stock_item()).is_ok());

        let mut s = stock_item();
        s.sub_unit_count = 0.5;
        assert!(validate_stock_item(&s).is_err());

        let mut s = stock_item();
        s.total_units = -1.0;
        assert!(validate_stock_item(&s).is_err());

        let mut s = stock_item();
        s.unit_name = String::new();
        assert!(validate_stock_item(&s).is_err());
    }

    #[test]
    fn test_validate_depletion() {
        let dep = Depletion {
            product_id: "p1".into(),
            stock_item_id: "beans".into(),
            depletion_quantity: 18.0,
        };
        assert!(validate_depletion(&dep).is_ok());

        let mut d = dep.clone();
        d.depletion_quantity = 0.0;
        assert!(validate_depletion(&d).is_err());

        let mut d = dep.clone();
        d.depletion_quantity = -2.0;
        assert!(validate_depletion(&d).is_err());

        let mut d = dep;
        d.stock_item_id = String::new();
        assert!(validate_depletion(&d).is_err());
    }

    #[test]
    fn test_validate_sale_quantity() {
        assert!(validate_sale_quantity(1).is_ok());
        assert!(validate_sale_quantity(999).is_ok());
        assert!(validate_sale_quantity(0).is_err());
        assert!(validate_sale_quantity(-3).is_err());
    }
}
