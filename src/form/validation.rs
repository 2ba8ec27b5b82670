//! Local input validation.
//!
//! Runs before any network access. Checks are ordered so that the reported
//! violation is deterministic: shop name first, then the UPI id.

use super::model::Configuration;

/// Trait for validating request objects.
pub trait Validator {
    /// Validate the state of the object, reporting the first violation.
    fn validate(&self) -> Result<(), ValidationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Shop name is required")]
    MissingShopName,
    #[error("Please enter a valid UPI ID (e.g., name@bank)")]
    InvalidPaymentIdentifier,
}

impl ValidationError {
    /// The field that failed validation
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingShopName => "shop_name",
            ValidationError::InvalidPaymentIdentifier => "upi_id",
        }
    }

    /// Suggestion for how to fix the error
    pub fn suggestion(&self) -> &'static str {
        match self {
            ValidationError::MissingShopName => "Please enter a name for your shop.",
            ValidationError::InvalidPaymentIdentifier => {
                "UPI ID must contain \"@\" (e.g., shopname@bank)"
            }
        }
    }
}

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Validate a UPI id: `handle@bank`, only the separator is checked.
pub fn validate_upi(value: &str) -> bool {
    value.trim().contains('@')
}

impl Validator for Configuration {
    fn validate(&self) -> Result<(), ValidationError> {
        if !validate_required(&self.shop_name) {
            return Err(ValidationError::MissingShopName);
        }
        if !validate_upi(&self.upi_id) {
            return Err(ValidationError::InvalidPaymentIdentifier);
        }
        Ok(())
    }
}
