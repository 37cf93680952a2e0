//! # Calculator Commands Module
//!
//! All Tauri commands exposed to the frontend.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports)
//! ├── calculator.rs  ◄─── Form editing, preview, calculate, reset
//! ├── rates.rs       ◄─── Live rates and stale indicator
//! ├── config.rs      ◄─── Configuration retrieval
//! └── export.rs      ◄─── Wallet copy, result export
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Frontend (webview)                                                     │
//! │  ──────────────────                                                     │
//! │  const result = await invoke('calculate');                              │
//! │         │                                                               │
//! │         │ (Tauri IPC bridge)                                            │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  #[tauri::command]                                                      │
//! │  fn calculate(                                                          │
//! │      calculator: State<CalculatorState>,  ◄── Injected by Tauri         │
//! │      config: State<ConfigState>,                                        │
//! │      rates: State<RateState>,                                           │
//! │  ) -> Result<CalculationResponse, ApiError>                             │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  Frontend receives: CalculationResponse | ApiError                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs config
//! fn get_config(config: State<'_, ConfigState>)
//!
//! // Needs the form and the rules
//! fn update_form(calculator: State<'_, CalculatorState>, config: State<'_, ConfigState>, update: FormUpdate)
//!
//! // Needs the export backends
//! fn copy_wallet_address(export: State<'_, ExportState>, config: State<'_, ConfigState>)
//! ```

pub mod calculator;
pub mod config;
pub mod export;
pub mod rates;

/// Mock Tauri app with the calculator state managed, for command tests.
#[cfg(test)]
pub(crate) fn test_app(rates: crate::state::RateState) -> tauri::App<tauri::test::MockRuntime> {
    use crate::state::{CalculatorState, ConfigState};
    use tauri::Manager;

    let app = tauri::test::mock_app();
    app.manage(CalculatorState::new());
    app.manage(ConfigState::default());
    app.manage(rates);
    app
}
