//! Validation utilities for the Retail ERP platform

use rust_decimal::Decimal;

/// Validate that a movement or transfer quantity is strictly positive
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a product or variant SKU (non-empty, no surrounding whitespace)
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.trim().is_empty() {
        return Err("SKU cannot be empty");
    }
    if sku != sku.trim() {
        return Err("SKU cannot have leading or trailing whitespace");
    }
    if sku.len() > 100 {
        return Err("SKU cannot exceed 100 characters");
    }
    Ok(())
}

/// Validate a branch/warehouse code
pub fn validate_location_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("Location code cannot be empty");
    }
    if code.len() > 50 {
        return Err("Location code cannot exceed 50 characters");
    }
    Ok(())
}

/// Validate an external reference string (optional, bounded length)
pub fn validate_reference(reference: &str) -> Result<(), &'static str> {
    if reference.len() > 100 {
        return Err("Reference cannot exceed 100 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_quantities() {
        assert!(validate_positive_quantity(Decimal::from(1)).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(Decimal::from(-3)).is_err());
    }

    #[test]
    fn rejects_blank_skus() {
        assert!(validate_sku("ELEC-SAM-001").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("  ").is_err());
        assert!(validate_sku(" ELEC-SAM-001").is_err());
    }
}
