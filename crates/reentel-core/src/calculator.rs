//! # Calculator State Machine
//!
//! The two states a calculator form can be in and the pure transitions
//! between them.
//!
//! ```text
//!              submit(valid)                 submit(valid)
//!   ┌──────┐ ───────────────► ┌────────────┐ ─────────────┐
//!   │ Idle │                  │ Calculated │ ◄────────────┘
//!   └──────┘ ◄─────────────── └────────────┘
//!      ▲  │   reset() / submit(invalid)
//!      └──┘
//!   submit(invalid): stays Idle, errors replaced
//! ```
//!
//! Transitions take `&self` and return a new state; the caller decides where
//! to keep it.

use serde::Serialize;
use ts_rs::TS;

use crate::error::{InputField, ValidationError, ValidationErrors};
use crate::pricing::PricingEngine;
use crate::types::{CalculationInput, CalculationResult, RateSnapshot, ValidatedInput};

/// Field-level error as shown next to a form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: InputField,
    pub code: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(error: &ValidationError) -> Self {
        FieldError {
            field: error.field(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Current state of the calculator form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalculatorState {
    /// No valid result yet. `errors` holds the last failed submission.
    Idle { errors: ValidationErrors },
    /// A result priced against the snapshot used at submit time.
    Calculated {
        input: ValidatedInput,
        rates: RateSnapshot,
        result: CalculationResult,
    },
}

impl Default for CalculatorState {
    fn default() -> Self {
        CalculatorState::new()
    }
}

impl CalculatorState {
    /// Fresh form with no errors.
    pub fn new() -> Self {
        CalculatorState::Idle {
            errors: ValidationErrors::new(),
        }
    }

    /// Validates `input` and prices it against `rates`.
    ///
    /// A valid submission always produces `Calculated`, whatever the previous
    /// state. An invalid one returns `Idle` carrying every field error.
    pub fn submit(
        &self,
        engine: &PricingEngine,
        input: &CalculationInput,
        rates: &RateSnapshot,
    ) -> CalculatorState {
        match engine.validate(input) {
            Ok(validated) => {
                let result = engine.compute_result(&validated, rates);
                CalculatorState::Calculated {
                    input: validated,
                    rates: rates.clone(),
                    result,
                }
            }
            Err(errors) => CalculatorState::Idle { errors },
        }
    }

    /// Clears any result and errors.
    pub fn reset(&self) -> CalculatorState {
        CalculatorState::new()
    }

    pub fn is_calculated(&self) -> bool {
        matches!(self, CalculatorState::Calculated { .. })
    }

    /// Input, rates and result of the current calculation.
    pub fn calculation(&self) -> Option<(&ValidatedInput, &RateSnapshot, &CalculationResult)> {
        match self {
            CalculatorState::Calculated {
                input,
                rates,
                result,
            } => Some((input, rates, result)),
            CalculatorState::Idle { .. } => None,
        }
    }

    /// The error shown next to `field`, if any.
    pub fn errors_for(&self, field: InputField) -> Option<&ValidationError> {
        match self {
            CalculatorState::Idle { errors } => errors.for_field(field),
            CalculatorState::Calculated { .. } => None,
        }
    }

    /// All field errors, ready for the UI.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            CalculatorState::Idle { errors } => errors.iter().map(FieldError::from).collect(),
            CalculatorState::Calculated { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, StatusTier};
    use rust_decimal_macros::dec;

    fn valid_input() -> CalculationInput {
        CalculationInput {
            current_balance: Some("8000".into()),
            tier: StatusTier::SuperReentel,
            purchase_quantity: Some("1000".into()),
            payment_method: Some(PaymentMethod::Usdt),
        }
    }

    #[test]
    fn test_starts_idle_without_errors() {
        let state = CalculatorState::default();
        assert!(!state.is_calculated());
        assert!(state.calculation().is_none());
        assert!(state.field_errors().is_empty());
    }

    #[test]
    fn test_valid_submit_calculates() {
        let engine = PricingEngine::default();
        let rates = RateSnapshot::fallback();

        let state = CalculatorState::new().submit(&engine, &valid_input(), &rates);
        assert!(state.is_calculated());
        let (input, priced_with, result) = state.calculation().unwrap();
        assert_eq!(result.final_price, dec!(128.1));
        assert_eq!(priced_with, &rates);
        assert_eq!(input.purchase_quantity, dec!(1000));

        // Resubmitting from Calculated recalculates.
        let mut input = valid_input();
        input.tier = StatusTier::ReentelPro;
        let state = state.submit(&engine, &input, &rates);
        assert_eq!(state.calculation().map(|(_, _, r)| r.discount_percent), Some(20));
    }

    #[test]
    fn test_invalid_submit_returns_idle_with_errors() {
        let engine = PricingEngine::default();
        let rates = RateSnapshot::fallback();
        let calculated = CalculatorState::new().submit(&engine, &valid_input(), &rates);

        let mut input = valid_input();
        input.purchase_quantity = Some("-1".into());
        let state = calculated.submit(&engine, &input, &rates);

        assert!(!state.is_calculated());
        assert!(state.errors_for(InputField::PurchaseQuantity).is_some());
        assert!(state.errors_for(InputField::CurrentBalance).is_none());

        let errors = state.field_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "INVALID_PURCHASE_QUANTITY");
    }

    #[test]
    fn test_reset_clears_everything() {
        let engine = PricingEngine::default();
        let state = CalculatorState::new()
            .submit(&engine, &valid_input(), &RateSnapshot::fallback())
            .reset();

        assert_eq!(state, CalculatorState::new());
    }
}
