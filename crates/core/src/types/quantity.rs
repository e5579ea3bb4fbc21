//! Validation for stock and order quantities.

use rust_decimal::Decimal;

/// Errors that can occur when validating a quantity argument.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The quantity is zero.
    #[error("{field} must be greater than zero")]
    Zero {
        /// Name of the offending argument.
        field: &'static str,
    },
    /// The quantity is negative.
    #[error("{field} must not be negative (got {value})")]
    Negative {
        /// Name of the offending argument.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },
}

/// Require a strictly positive quantity.
///
/// Quantities are decimals so that weighed stock (kilograms of onions, litres
/// of oil) and counted stock (buns) share one ledger.
///
/// # Errors
///
/// Returns [`QuantityError::Zero`] or [`QuantityError::Negative`] when the
/// value is not above zero.
pub fn require_positive(field: &'static str, value: Decimal) -> Result<Decimal, QuantityError> {
    if value.is_zero() {
        return Err(QuantityError::Zero { field });
    }
    if value.is_sign_negative() {
        return Err(QuantityError::Negative { field, value });
    }
    Ok(value)
}
