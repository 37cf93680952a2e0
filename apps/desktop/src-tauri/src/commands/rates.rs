//! # Rate Commands
//!
//! Tauri commands exposing the live rates and the stale indicator.
//! Updates are also pushed as `rates:updated` events.

use tauri::State;
use tracing::debug;

use crate::state::{RateState, RateStatusDto};

/// Gets the current rates.
///
/// ## When Used
/// - Header ticker (RNT price, USDT→EUR)
/// - Stale badge when the fallback pair is shown
#[tauri::command]
pub fn get_rates(rates: State<'_, RateState>) -> RateStatusDto {
    debug!("get_rates command");
    rates.get_status()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_app;
    use reentel_core::{FixedRates, RateSnapshot};
    use std::sync::Arc;
    use tauri::Manager;

    #[test]
    fn test_get_rates_reports_fallback_as_stale() {
        let app = test_app(RateState::new(Arc::new(FixedRates(RateSnapshot::fallback()))));
        let dto = get_rates(app.state());

        assert!(dto.is_stale);
        assert!(!dto.is_loading);
        assert_eq!(dto.token_price_usdt, "0.183");
        assert_eq!(dto.last_error, None);
    }
}
