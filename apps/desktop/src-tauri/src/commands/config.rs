//! # Config Commands
//!
//! Tauri commands for retrieving calculator configuration.

use tauri::State;
use tracing::debug;

use crate::state::ConfigState;

/// Gets the current calculator configuration.
///
/// ## When Used
/// - App startup (payment method selector, thresholds)
/// - Result card (wallet address)
///
/// ## Returns
/// Complete configuration state (read-only)
#[tauri::command]
pub fn get_config(config: State<'_, ConfigState>) -> ConfigState {
    debug!("get_config command");
    config.inner().clone()
}
