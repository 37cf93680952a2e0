//! # Validation Module
//!
//! Field validators for the calculator form.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host UI                                                      │
//! │  ├── Numeric inputs, required markers                                  │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Parse raw text into exact decimals                                │
//! │  └── Range and membership checks, one ValidationError per field       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  PricingEngine::validate collects every field error at once            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use reentel_core::validation::{parse_amount, validate_purchase_quantity};
//!
//! assert!(parse_amount("1000").is_some());
//! assert!(validate_purchase_quantity(Some("0")).is_err());
//! ```

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::rules::PaymentMethodSet;
use crate::types::PaymentMethod;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Parsing
// =============================================================================

/// Parses a user-typed number.
///
/// Accepts plain decimals (`"1000"`, `"0.0001"`, `"-5"`) and scientific
/// notation (`"1e3"`). Surrounding whitespace is ignored. Returns `None` for
/// blank or non-numeric text.
///
/// ## Example
/// ```rust
/// use reentel_core::validation::parse_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_amount(" 8000 "), Some(dec!(8000)));
/// assert_eq!(parse_amount("1e3"), Some(dec!(1000)));
/// assert_eq!(parse_amount("abc"), None);
/// ```
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .map(|d| d.normalize())
}

/// Returns the trimmed text if it contains anything.
fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates the optional xRNT balance.
///
/// ## Rules
/// - Blank or absent: accepted, returns `None`
/// - Otherwise must parse and be `>= 0`
pub fn validate_balance(raw: Option<&str>) -> ValidationResult<Option<Decimal>> {
    let Some(text) = non_blank(raw) else {
        return Ok(None);
    };

    match parse_amount(text) {
        Some(balance) if balance >= Decimal::ZERO => Ok(Some(balance)),
        _ => Err(ValidationError::InvalidBalance {
            value: text.to_string(),
        }),
    }
}

/// Validates the RNT quantity to buy.
///
/// ## Rules
/// - Mandatory
/// - Must parse and be `> 0`; no upper bound, pricing saturates instead
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  User enters quantity: 1000                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_purchase_quantity(Some("1000")) ← THIS FUNCTION              │
/// │       │                                                                 │
/// │       ├── blank?        → InvalidPurchaseQuantity                      │
/// │       ├── not a number? → InvalidPurchaseQuantity                      │
/// │       ├── <= 0?         → InvalidPurchaseQuantity                      │
/// │       │                                                                 │
/// │       └── OK → 1000                                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_purchase_quantity(raw: Option<&str>) -> ValidationResult<Decimal> {
    let text = non_blank(raw).unwrap_or_default();

    match parse_amount(text) {
        Some(quantity) if quantity > Decimal::ZERO => Ok(quantity),
        _ => Err(ValidationError::InvalidPurchaseQuantity {
            value: text.to_string(),
        }),
    }
}

/// Validates the payment method against the active set.
pub fn validate_payment_method(
    method: Option<PaymentMethod>,
    accepted: PaymentMethodSet,
) -> ValidationResult<PaymentMethod> {
    let method = method.ok_or(ValidationError::MissingPaymentMethod)?;

    if !accepted.accepts(method) {
        return Err(ValidationError::UnsupportedPaymentMethod { method });
    }

    Ok(method)
}

// =============================================================================
// Unit Tests
// =============================================================================
