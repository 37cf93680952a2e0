//! # Export Commands
//!
//! Copying the wallet address and saving the result card.
//!
//! Both actions go through the managed [`ExportState`] and never change the
//! form: a failure is reported as `EXPORT_FAILED` and the result stays on
//! screen.

use chrono::Utc;
use tauri::State;
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::export::{render_export, ExportFormat, ExportPayload, ExportedFile};
use crate::state::{CalculatorState, ConfigState, ExportState};

/// Copies the payment wallet to the clipboard and returns it.
#[tauri::command]
pub fn copy_wallet_address(
    export: State<'_, ExportState>,
    config: State<'_, ConfigState>,
) -> Result<String, ApiError> {
    debug!("copy_wallet_address command");

    export
        .clipboard()
        .write_text(&config.wallet_address)
        .map_err(|e| {
            error!(error = %e, "Failed to copy wallet address");
            ApiError::from(e)
        })?;

    Ok(config.wallet_address.clone())
}

/// Renders the current result as an image or PDF.
///
/// ## Errors
/// - `NOT_CALCULATED` unless the form holds a result
/// - `EXPORT_FAILED` if the renderer fails or returns nothing
#[tauri::command]
pub fn export_result(
    calculator: State<'_, CalculatorState>,
    config: State<'_, ConfigState>,
    export: State<'_, ExportState>,
    format: ExportFormat,
) -> Result<ExportedFile, ApiError> {
    debug!(%format, "export_result command");

    let payload = calculator
        .with_form(|form| {
            form.phase.calculation().map(|(input, rates, result)| {
                ExportPayload::build(
                    input,
                    rates,
                    result,
                    &config.wallet_address,
                    config.amount_decimals,
                    Utc::now(),
                )
            })
        })
        .ok_or_else(ApiError::not_calculated)?;

    let file = render_export(export.renderer(), &payload, format).map_err(|e| {
        error!(error = %e, %format, "Export failed");
        ApiError::from(e)
    })?;

    info!(file_name = %file.file_name, bytes = file.bytes.len(), "Exported result");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::calculator::{calculate, get_form, update_form};
    use crate::commands::test_app;
    use crate::error::ErrorCode;
    use crate::export::{Clipboard, ExportError, ResultRenderer};
    use crate::state::{FormUpdate, RateState};
    use reentel_core::{FixedRates, PaymentMethod, RateSnapshot};
    use std::sync::{Arc, Mutex};
    use tauri::test::MockRuntime;
    use tauri::{App, Manager};

    #[derive(Default)]
    struct MemoryClipboard {
        text: Mutex<Option<String>>,
        fail: bool,
    }

    impl Clipboard for MemoryClipboard {
        fn write_text(&self, text: &str) -> Result<(), ExportError> {
            if self.fail {
                return Err(ExportError::Clipboard("permission denied".into()));
            }
            *self.text.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    struct StubRenderer {
        fail: bool,
    }

    impl ResultRenderer for StubRenderer {
        fn render(
            &self,
            payload: &ExportPayload,
            format: ExportFormat,
        ) -> Result<Vec<u8>, ExportError> {
            if self.fail {
                return Err(ExportError::Render {
                    format,
                    reason: "canvas unavailable".into(),
                });
            }
            Ok(payload.final_price.as_bytes().to_vec())
        }
    }

    fn app_with(clipboard: Arc<MemoryClipboard>, renderer: StubRenderer) -> App<MockRuntime> {
        let app = test_app(RateState::new(Arc::new(FixedRates(RateSnapshot::fallback()))));
        app.manage(ExportState::new(clipboard, Arc::new(renderer)));
        app
    }

    fn calculate_scenario_a(app: &App<MockRuntime>) {
        update_form(
            app.state(),
            app.state(),
            FormUpdate {
                current_balance: Some("8000".into()),
                purchase_quantity: Some("1000".into()),
                payment_method: Some(PaymentMethod::Usdt),
                ..Default::default()
            },
        );
        calculate(app.state(), app.state(), app.state()).unwrap();
    }

    #[test]
    fn test_copy_wallet_address() {
        let clipboard = Arc::new(MemoryClipboard::default());
        let app = app_with(Arc::clone(&clipboard), StubRenderer { fail: false });

        let copied = copy_wallet_address(app.state(), app.state()).unwrap();

        let config = app.state::<ConfigState>();
        assert_eq!(copied, config.wallet_address);
        assert_eq!(
            clipboard.text.lock().unwrap().as_deref(),
            Some(config.wallet_address.as_str())
        );
    }

    #[test]
    fn test_copy_wallet_failure() {
        let clipboard = Arc::new(MemoryClipboard {
            fail: true,
            ..Default::default()
        });
        let app = app_with(clipboard, StubRenderer { fail: false });

        let err = copy_wallet_address(app.state(), app.state()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExportFailed);
    }

    #[test]
    fn test_export_requires_result() {
        let app = app_with(Arc::default(), StubRenderer { fail: false });

        let err =
            export_result(app.state(), app.state(), app.state(), ExportFormat::Png).unwrap_err();

        assert_eq!(err.code, ErrorCode::NotCalculated);
        assert_eq!(
            err.to_string(),
            "[NOT_CALCULATED] Calculate a price before exporting"
        );
    }

    #[test]
    fn test_export_result() {
        let app = app_with(Arc::default(), StubRenderer { fail: false });
        calculate_scenario_a(&app);

        let file =
            export_result(app.state(), app.state(), app.state(), ExportFormat::Pdf).unwrap();

        assert_eq!(file.bytes, b"$128,10".to_vec());
        assert_eq!(file.mime_type, "application/pdf");
        assert!(file.file_name.starts_with("reentel-superreentel-"));
    }

    #[test]
    fn test_failed_export_keeps_result() {
        let app = app_with(Arc::default(), StubRenderer { fail: true });
        calculate_scenario_a(&app);

        let err =
            export_result(app.state(), app.state(), app.state(), ExportFormat::Jpeg).unwrap_err();

        assert_eq!(err.code, ErrorCode::ExportFailed);
        assert!(err.message.contains("JPEG"));
        assert!(get_form(app.state(), app.state()).is_calculated);
    }

    #[test]
    fn test_system_backends_export_pdf() {
        let app = test_app(RateState::new(Arc::new(FixedRates(RateSnapshot::fallback()))));
        app.manage(ExportState::system());
        calculate_scenario_a(&app);

        let file =
            export_result(app.state(), app.state(), app.state(), ExportFormat::Pdf).unwrap();

        assert!(file.bytes.starts_with(b"%PDF"));
        assert!(file.file_name.ends_with(".pdf"));
    }
}
