//! # Error Types
//!
//! Domain-specific error types for reentel-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  reentel-core errors (this file)                                       │
//! │  ├── CoreError         - General domain errors                         │
//! │  ├── ValidationError   - One failed form rule (field-scoped)           │
//! │  └── ValidationErrors  - Every failed rule of one submission           │
//! │                                                                         │
//! │  reentel-rates errors (separate crate)                                 │
//! │  └── RatesError        - Fetch/parse failures (never reach the engine) │
//! │                                                                         │
//! │  reentel-desktop errors (app)                                          │
//! │  └── ApiError          - What the frontend sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → ValidationErrors → ApiError → Host UI         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Validation errors are data, collected per submission, never thrown
//! 3. Every validation error names the form field it belongs to

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

use crate::types::PaymentMethod;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A rate handed to the engine is zero, negative or otherwise unusable.
    ///
    /// ## When This Occurs
    /// - A rate source reports `0` or a negative price
    /// - Someone builds a `RateSnapshot` by hand with bad numbers
    ///
    /// The loading placeholder (`RateSnapshot::loading`) bypasses this check on
    /// purpose: it is the only snapshot allowed to carry zeros.
    #[error("Invalid rate for {name}: {value} (must be positive)")]
    InvalidRate { name: &'static str, value: String },

    /// Pricing rules are inconsistent (e.g. non-positive multiplier).
    #[error("Invalid pricing rules: {reason}")]
    InvalidRules { reason: String },

    /// Validation error (wraps ValidationErrors).
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

// =============================================================================
// Input Field
// =============================================================================

/// The calculator form field a validation error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum InputField {
    CurrentBalance,
    PurchaseQuantity,
    PaymentMethod,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputField::CurrentBalance => write!(f, "currentBalance"),
            InputField::PurchaseQuantity => write!(f, "purchaseQuantity"),
            InputField::PaymentMethod => write!(f, "paymentMethod"),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single failed validation rule.
///
/// ## User Workflow
/// ```text
/// User clicks "Calculate"
///      │
///      ▼
/// validate(input) ── balance "abc"    ──► InvalidBalance        (currentBalance)
///                 ── quantity "0"     ──► InvalidPurchaseQuantity (purchaseQuantity)
///                 ── no method picked ──► MissingPaymentMethod  (paymentMethod)
///      │
///      ▼
/// UI highlights each offending field with its own message
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Balance was provided but is not a number or is negative.
    #[error("Invalid xRNT balance '{value}': enter a number greater than or equal to 0")]
    InvalidBalance { value: String },

    /// Purchase quantity is missing, not a number, or not strictly positive.
    #[error("Invalid RNT quantity '{value}': enter a number greater than 0")]
    InvalidPurchaseQuantity { value: String },

    /// No payment method selected.
    #[error("Select a payment method")]
    MissingPaymentMethod,

    /// Payment method exists but is not offered by the active rule-set.
    #[error("Payment method {method} is not accepted")]
    UnsupportedPaymentMethod { method: PaymentMethod },
}

impl ValidationError {
    /// Returns the form field this error belongs to.
    pub fn field(&self) -> InputField {
        match self {
            ValidationError::InvalidBalance { .. } => InputField::CurrentBalance,
            ValidationError::InvalidPurchaseQuantity { .. } => InputField::PurchaseQuantity,
            ValidationError::MissingPaymentMethod
            | ValidationError::UnsupportedPaymentMethod { .. } => InputField::PaymentMethod,
        }
    }

    /// Stable machine-readable code for the host UI.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidBalance { .. } => "INVALID_BALANCE",
            ValidationError::InvalidPurchaseQuantity { .. } => "INVALID_PURCHASE_QUANTITY",
            ValidationError::MissingPaymentMethod => "MISSING_PAYMENT_METHOD",
            ValidationError::UnsupportedPaymentMethod { .. } => "UNSUPPORTED_PAYMENT_METHOD",
        }
    }
}

// =============================================================================
// Validation Errors (collection)
// =============================================================================

/// All validation failures of one submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Returns the first error attached to `field`, if any.
    pub fn for_field(&self, field: InputField) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field() == field)
    }

    /// Converts into `Ok(value)` when empty, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::InvalidBalance {
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid xRNT balance 'abc': enter a number greater than or equal to 0"
        );

        let err = ValidationError::UnsupportedPaymentMethod {
            method: PaymentMethod::TransferEur,
        };
        assert_eq!(err.to_string(), "Payment method TRANSFER_EUR is not accepted");
    }

    #[test]
    fn test_error_fields() {
        assert_eq!(
            ValidationError::MissingPaymentMethod.field(),
            InputField::PaymentMethod
        );
        assert_eq!(
            ValidationError::InvalidPurchaseQuantity {
                value: "0".into()
            }
            .field(),
            InputField::PurchaseQuantity
        );
    }

    #[test]
    fn test_collection_lookup_and_display() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.push(ValidationError::InvalidBalance { value: "-1".into() });
        errors.push(ValidationError::MissingPaymentMethod);

        assert_eq!(errors.len(), 2);
        assert!(errors.for_field(InputField::CurrentBalance).is_some());
        assert!(errors.for_field(InputField::PurchaseQuantity).is_none());
        assert!(errors.to_string().contains("; Select a payment method"));
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let errors = ValidationErrors::from(ValidationError::MissingPaymentMethod);
        let core_err: CoreError = errors.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
