//! # Calculator State
//!
//! The form the user is editing plus the state machine from `reentel-core`.
//!
//! ## Form Lifecycle
//! ```text
//! update_form ──► draft changes, result (if any) stays until recalculated
//! calculate   ──► phase = submit(draft)       Idle{errors} | Calculated
//! reset       ──► draft cleared, phase = Idle
//! ```
//!
//! ## Why Arc<Mutex<>>?
//! Tauri commands can run concurrently on its runtime. The lock is held only
//! for one pure transition, never across an await.

use std::sync::{Arc, Mutex};

use reentel_core::{
    CalculationInput, CalculatorState as CalculatorPhase, PaymentMethod, PricingEngine,
    RateSnapshot, StatusTier,
};
use serde::Deserialize;
use ts_rs::TS;

/// Partial form update sent while the user types.
///
/// Absent fields are left unchanged. A blank balance clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct FormUpdate {
    pub current_balance: Option<String>,
    pub tier: Option<StatusTier>,
    pub purchase_quantity: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

/// Draft input and the outcome of the last submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub draft: CalculationInput,
    pub phase: CalculatorPhase,
}

impl Form {
    pub fn new() -> Self {
        Form {
            draft: CalculationInput::default(),
            phase: CalculatorPhase::new(),
        }
    }

    /// Merges `update` into the draft.
    pub fn apply(&mut self, update: FormUpdate) {
        if let Some(balance) = update.current_balance {
            self.draft.current_balance = non_blank(balance);
        }
        if let Some(tier) = update.tier {
            self.draft.tier = tier;
        }
        if let Some(quantity) = update.purchase_quantity {
            self.draft.purchase_quantity = non_blank(quantity);
        }
        if let Some(method) = update.payment_method {
            self.draft.payment_method = Some(method);
        }
    }

    /// Prices the draft against `rates` and stores the new phase.
    pub fn submit(&mut self, engine: &PricingEngine, rates: &RateSnapshot) -> &CalculatorPhase {
        self.phase = self.phase.submit(engine, &self.draft, rates);
        &self.phase
    }

    /// Back to an empty form with the default tier.
    pub fn reset(&mut self) {
        self.draft = CalculationInput::default();
        self.phase = self.phase.reset();
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Thread-safe wrapper around the form.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<Form>>` so commands can share it.
#[derive(Debug, Clone)]
pub struct CalculatorState {
    form: Arc<Mutex<Form>>,
}

impl CalculatorState {
    /// Creates an empty form.
    pub fn new() -> Self {
        CalculatorState {
            form: Arc::new(Mutex::new(Form::new())),
        }
    }

    /// Executes a function with read access to the form.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let draft = calculator.with_form(|form| form.draft.clone());
    /// ```
    pub fn with_form<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Form) -> R,
    {
        let form = self.form.lock().expect("Calculator mutex poisoned");
        f(&form)
    }

    /// Executes a function with write access to the form.
    pub fn with_form_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Form) -> R,
    {
        let mut form = self.form.lock().expect("Calculator mutex poisoned");
        f(&mut form)
    }
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reentel_core::InputField;

    #[test]
    fn test_apply_partial_update() {
        let mut form = Form::new();
        form.apply(FormUpdate {
            current_balance: Some("8000".into()),
            purchase_quantity: Some("1000".into()),
            ..Default::default()
        });
        form.apply(FormUpdate {
            tier: Some(StatusTier::ReentelPro),
            ..Default::default()
        });

        assert_eq!(form.draft.current_balance.as_deref(), Some("8000"));
        assert_eq!(form.draft.purchase_quantity.as_deref(), Some("1000"));
        assert_eq!(form.draft.tier, StatusTier::ReentelPro);
        assert_eq!(form.draft.payment_method, None);
    }

    #[test]
    fn test_blank_balance_clears() {
        let mut form = Form::new();
        form.apply(FormUpdate {
            current_balance: Some("8000".into()),
            ..Default::default()
        });
        form.apply(FormUpdate {
            current_balance: Some("  ".into()),
            ..Default::default()
        });

        assert_eq!(form.draft.current_balance, None);
    }

    #[test]
    fn test_submit_and_reset() {
        let engine = PricingEngine::default();
        let mut form = Form::new();

        form.submit(&engine, &RateSnapshot::fallback());
        assert!(form.phase.errors_for(InputField::PurchaseQuantity).is_some());
        assert!(form.phase.errors_for(InputField::PaymentMethod).is_some());

        form.apply(FormUpdate {
            purchase_quantity: Some("500".into()),
            payment_method: Some(PaymentMethod::Eth),
            ..Default::default()
        });
        assert!(form.submit(&engine, &RateSnapshot::fallback()).is_calculated());

        form.reset();
        assert_eq!(form, Form::new());
    }

    #[test]
    fn test_state_is_shared_between_clones() {
        let state = CalculatorState::new();
        let other = state.clone();

        other.with_form_mut(|form| {
            form.apply(FormUpdate {
                purchase_quantity: Some("42".into()),
                ..Default::default()
            })
        });

        let quantity = state.with_form(|form| form.draft.purchase_quantity.clone());
        assert_eq!(quantity.as_deref(), Some("42"));
    }
}
