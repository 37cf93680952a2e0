//! # Calculator Commands
//!
//! Tauri commands driving the calculator form.
//!
//! ## Form Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Calculator Lifecycle                                 │
//! │                                                                         │
//! │  ┌──────────┐  update_form   ┌──────────┐   calculate   ┌────────────┐ │
//! │  │  Empty   │──────────────► │ Editing  │─────────────► │ Calculated │ │
//! │  │  Form    │                │ (Idle)   │ ◄──────────── │            │ │
//! │  └──────────┘                └──────────┘  invalid input└────────────┘ │
//! │       ▲                       │      ▲                        │         │
//! │       │                preview│      │fill_missing_amount     │         │
//! │       │                       ▼      │                        │         │
//! │       └────────────────── reset_calculator ◄──────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use reentel_core::format::format_amount;
use reentel_core::validation::parse_amount;
use reentel_core::{
    CalculationInput, CalculationResult, CalculatorState as CalculatorPhase, FieldError,
    PricingEngine, RateSnapshot, ValidatedInput,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tauri::State;
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::ApiError;
use crate::export::ExportPayload;
use crate::state::{CalculatorState, ConfigState, Form, FormUpdate, RateState};

/// Form contents plus live hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub draft: CalculationInput,
    pub preview: Preview,
    /// Errors from the last failed submission
    pub errors: Vec<FieldError>,
    pub is_calculated: bool,
}

impl FormResponse {
    fn build(form: &Form, engine: &PricingEngine) -> Self {
        FormResponse {
            draft: form.draft.clone(),
            preview: Preview::build(&form.draft, engine),
            errors: form.phase.field_errors(),
            is_calculated: form.phase.is_calculated(),
        }
    }
}

/// Discount and missing xRNT for the draft as typed.
///
/// A balance that does not parse counts as zero here; `calculate` reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub discount_percent: u8,
    #[ts(type = "string")]
    pub missing_amount: Decimal,
    /// `missing_amount` with es-ES separators
    pub missing_amount_display: String,
    #[ts(type = "string")]
    pub status_threshold: Decimal,
}

impl Preview {
    fn build(draft: &CalculationInput, engine: &PricingEngine) -> Self {
        let balance = draft_balance(draft);
        let missing_amount = engine.compute_missing_amount(balance, draft.tier);

        Preview {
            discount_percent: engine.compute_discount_percent(balance, draft.tier).percent(),
            missing_amount,
            missing_amount_display: format_amount(missing_amount, 0),
            status_threshold: engine.rules().status_threshold(draft.tier),
        }
    }
}

fn draft_balance(draft: &CalculationInput) -> Option<Decimal> {
    draft.current_balance.as_deref().and_then(parse_amount)
}

/// A successful calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    pub input: ValidatedInput,
    /// Rates the result was priced with
    pub rates: RateSnapshot,
    pub result: CalculationResult,
    /// Formatted values for the result card
    pub card: ExportPayload,
}

// =============================================================================
// Commands
// =============================================================================

/// Gets the current form.
///
/// `invoke('get_form')` on page load restores the draft and its hints.
#[tauri::command]
pub fn get_form(calculator: State<'_, CalculatorState>, config: State<'_, ConfigState>) -> FormResponse {
    debug!("get_form command");
    let engine = config.engine();
    calculator.with_form(|form| FormResponse::build(form, &engine))
}

/// Applies a partial update while the user types.
///
/// An existing result stays visible until the next `calculate`.
#[tauri::command]
pub fn update_form(
    calculator: State<'_, CalculatorState>,
    config: State<'_, ConfigState>,
    update: FormUpdate,
) -> FormResponse {
    debug!(?update, "update_form command");
    let engine = config.engine();
    calculator.with_form_mut(|form| {
        form.apply(update);
        FormResponse::build(form, &engine)
    })
}

/// Live discount and missing amount for the current draft.
#[tauri::command]
pub fn preview(calculator: State<'_, CalculatorState>, config: State<'_, ConfigState>) -> Preview {
    debug!("preview command");
    let engine = config.engine();
    calculator.with_form(|form| Preview::build(&form.draft, &engine))
}

/// Pre-fills the purchase quantity with the xRNT still missing for the tier.
#[tauri::command]
pub fn fill_missing_amount(
    calculator: State<'_, CalculatorState>,
    config: State<'_, ConfigState>,
) -> FormResponse {
    let engine = config.engine();
    calculator.with_form_mut(|form| {
        let missing = engine.compute_missing_amount(draft_balance(&form.draft), form.draft.tier);
        debug!(%missing, tier = %form.draft.tier, "fill_missing_amount command");

        form.apply(FormUpdate {
            purchase_quantity: Some(missing.normalize().to_string()),
            ..Default::default()
        });
        FormResponse::build(form, &engine)
    })
}

/// Validates the draft and prices it with the latest rates.
///
/// ## Errors
/// - `RATES_LOADING` before the first rate fetch has finished; the form is
///   left untouched
/// - `VALIDATION_ERROR` with one entry per invalid field
#[tauri::command]
pub fn calculate(
    calculator: State<'_, CalculatorState>,
    config: State<'_, ConfigState>,
    rates: State<'_, RateState>,
) -> Result<CalculationResponse, ApiError> {
    debug!("calculate command");

    let provider = rates.provider();
    if provider.is_loading() {
        return Err(ApiError::rates_loading());
    }

    let snapshot = provider.current_snapshot();
    let engine = config.engine();
    let phase = calculator.with_form_mut(|form| form.submit(&engine, &snapshot).clone());

    match phase {
        CalculatorPhase::Calculated {
            input,
            rates,
            result,
        } => {
            info!(
                tier = %input.tier,
                method = %input.payment_method,
                discount = result.discount_percent,
                final_price = %result.final_price,
                stale_rates = rates.is_stale(),
                "Calculated price"
            );
            let card = ExportPayload::build(
                &input,
                &rates,
                &result,
                &config.wallet_address,
                config.amount_decimals,
                chrono::Utc::now(),
            );
            Ok(CalculationResponse {
                input,
                rates,
                result,
                card,
            })
        }
        CalculatorPhase::Idle { errors } => {
            debug!(count = errors.len(), "Calculation rejected");
            Err(ApiError::from(errors))
        }
    }
}

/// Clears the form and any result.
#[tauri::command]
pub fn reset_calculator(
    calculator: State<'_, CalculatorState>,
    config: State<'_, ConfigState>,
) -> FormResponse {
    debug!("reset_calculator command");
    let engine = config.engine();
    calculator.with_form_mut(|form| {
        form.reset();
        FormResponse::build(form, &engine)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_app;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use reentel_core::{FixedRates, InputField, PaymentMethod, StatusTier};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tauri::test::MockRuntime;
    use tauri::{App, Manager};

    fn fixed(snapshot: RateSnapshot) -> RateState {
        RateState::new(Arc::new(FixedRates(snapshot)))
    }

    fn live_rates() -> RateState {
        fixed(RateSnapshot::live(dec!(0.183), dec!(0.94), Utc::now()).unwrap())
    }

    fn fill(app: &App<MockRuntime>, update: FormUpdate) -> FormResponse {
        update_form(app.state(), app.state(), update)
    }

    #[test]
    fn test_preview_follows_typing() {
        let app = test_app(live_rates());

        let p = preview(app.state(), app.state());
        assert_eq!(p.discount_percent, 20);
        assert_eq!(p.missing_amount, dec!(28000));
        assert_eq!(p.missing_amount_display, "28.000");

        let form = fill(
            &app,
            FormUpdate {
                current_balance: Some("8000".into()),
                ..Default::default()
            },
        );
        assert_eq!(form.preview.discount_percent, 30);
        assert_eq!(form.preview.missing_amount, dec!(20000));

        let form = fill(
            &app,
            FormUpdate {
                tier: Some(StatusTier::ReentelPro),
                ..Default::default()
            },
        );
        assert_eq!(form.preview.discount_percent, 20);
        assert_eq!(form.preview.missing_amount, dec!(6000));
        assert_eq!(form.preview.status_threshold, dec!(14000));
    }

    #[test]
    fn test_fill_missing_amount() {
        let app = test_app(live_rates());
        fill(
            &app,
            FormUpdate {
                current_balance: Some("10000.5".into()),
                ..Default::default()
            },
        );

        let form = fill_missing_amount(app.state(), app.state());
        assert_eq!(form.draft.purchase_quantity.as_deref(), Some("17999.5"));

        fill(
            &app,
            FormUpdate {
                current_balance: Some("30000".into()),
                ..Default::default()
            },
        );
        let form = fill_missing_amount(app.state(), app.state());
        assert_eq!(form.draft.purchase_quantity.as_deref(), Some("0"));
    }

    #[test]
    fn test_calculate_scenario_a() {
        let app = test_app(live_rates());
        fill(
            &app,
            FormUpdate {
                current_balance: Some("8000".into()),
                purchase_quantity: Some("1000".into()),
                payment_method: Some(PaymentMethod::Usdt),
                ..Default::default()
            },
        );

        let response = calculate(app.state(), app.state(), app.state()).unwrap();

        assert_eq!(response.result.discount_percent, 30);
        assert_eq!(response.result.base_price, dec!(183));
        assert_eq!(response.result.final_price, dec!(128.1));
        assert_eq!(response.card.final_price, "$128,10");
        assert_eq!(response.card.current_balance, "8000,00");
        assert!(!response.rates.is_stale());
        assert!(get_form(app.state(), app.state()).is_calculated);
    }

    #[test]
    fn test_calculate_accepts_large_amounts() {
        let app = test_app(live_rates());
        fill(
            &app,
            FormUpdate {
                current_balance: Some("2000000000000".into()),
                purchase_quantity: Some("5000000000000".into()),
                payment_method: Some(PaymentMethod::Usdt),
                ..Default::default()
            },
        );

        let response = calculate(app.state(), app.state(), app.state()).unwrap();

        assert_eq!(response.result.base_price, dec!(915000000000));
        assert_eq!(response.card.current_balance, "2.000.000.000.000,00");
    }

    #[test]
    fn test_calculate_reports_every_invalid_field() {
        let app = test_app(live_rates());
        fill(
            &app,
            FormUpdate {
                current_balance: Some("abc".into()),
                purchase_quantity: Some("0".into()),
                ..Default::default()
            },
        );

        let err = calculate(app.state(), app.state(), app.state()).unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        let fields: Vec<InputField> = err.fields.iter().map(|f| f.field).collect();
        assert_eq!(
            fields,
            vec![
                InputField::CurrentBalance,
                InputField::PurchaseQuantity,
                InputField::PaymentMethod
            ]
        );
        assert_eq!(get_form(app.state(), app.state()).errors.len(), 3);
    }

    #[test]
    fn test_calculate_refuses_while_rates_loading() {
        let app = test_app(fixed(RateSnapshot::loading()));
        fill(
            &app,
            FormUpdate {
                purchase_quantity: Some("1000".into()),
                payment_method: Some(PaymentMethod::Usdt),
                ..Default::default()
            },
        );

        let err = calculate(app.state(), app.state(), app.state()).unwrap_err();

        assert_eq!(err.code, ErrorCode::RatesLoading);
        let form = get_form(app.state(), app.state());
        assert!(!form.is_calculated);
        assert!(form.errors.is_empty());
    }

    #[test]
    fn test_calculate_with_fallback_rates() {
        let app = test_app(fixed(RateSnapshot::fallback()));
        fill(
            &app,
            FormUpdate {
                purchase_quantity: Some("500".into()),
                payment_method: Some(PaymentMethod::Btc),
                ..Default::default()
            },
        );

        let response = calculate(app.state(), app.state(), app.state()).unwrap();

        assert!(response.rates.is_stale());
        assert!(response.card.rates_stale);
        assert_eq!(response.result.final_price, dec!(73.2));
    }

    #[test]
    fn test_reset_clears_result_and_draft() {
        let app = test_app(live_rates());
        fill(
            &app,
            FormUpdate {
                tier: Some(StatusTier::ReentelPro),
                purchase_quantity: Some("1000".into()),
                payment_method: Some(PaymentMethod::Eth),
                ..Default::default()
            },
        );
        calculate(app.state(), app.state(), app.state()).unwrap();

        let form = reset_calculator(app.state(), app.state());

        assert!(!form.is_calculated);
        assert_eq!(form.draft, CalculationInput::default());
        assert_eq!(form.draft.tier, StatusTier::SuperReentel);
    }
}
