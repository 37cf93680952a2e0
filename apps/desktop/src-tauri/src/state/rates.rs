//! # Rate State
//!
//! Read access to the rate service plus a UI-ready copy of its last status.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rate Update Flow                                 │
//! │                                                                         │
//! │  RateService task                                                       │
//! │       │ publish(status)                                                 │
//! │       ├──► watch channel ──► RateServiceHandle ──► calculate            │
//! │       │                                                                 │
//! │       └──► TauriRateEventEmitter                                        │
//! │               ├── updates RateStatusDto (stale indicator)               │
//! │               └── app_handle.emit("rates:updated" / "rates:error")      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frontend
//! ```text
//! import { listen } from '@tauri-apps/api/event';
//!
//! listen('rates:updated', (event) => setRates(event.payload));
//! listen('rates:error', (event) => toast.warn(event.payload.message));
//! ```

use std::sync::{Arc, Mutex, RwLock};

use reentel_core::format::format_rate;
use reentel_core::{RateProvider, RateSnapshot};
use reentel_rates::{RateEventEmitter, RateService, RateServiceHandle, RateStatus};
use serde::Serialize;
use tauri::{AppHandle, Emitter, Runtime};
use tracing::{debug, error};
use ts_rs::TS;

/// Event name for a newly published snapshot.
pub const RATES_UPDATED_EVENT: &str = "rates:updated";

/// Event name for a failed fetch.
pub const RATES_ERROR_EVENT: &str = "rates:error";

/// Rate state shared by commands.
#[derive(Clone)]
pub struct RateState {
    provider: Arc<dyn RateProvider>,
    status: Arc<RwLock<RateStatusDto>>,
}

impl RateState {
    /// Wraps any provider. The DTO starts from the provider's current view.
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        let dto = RateStatusDto::from_snapshot(&provider.current_snapshot(), provider.is_loading());
        RateState {
            provider,
            status: Arc::new(RwLock::new(dto)),
        }
    }

    /// Wraps a running rate service whose emitter writes into `status`.
    pub fn from_handle(handle: RateServiceHandle, status: Arc<RwLock<RateStatusDto>>) -> Self {
        RateState {
            provider: Arc::new(handle),
            status,
        }
    }

    pub fn provider(&self) -> &dyn RateProvider {
        self.provider.as_ref()
    }

    /// Gets the last status seen by the emitter.
    pub fn get_status(&self) -> RateStatusDto {
        self.status
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|_| {
                RateStatusDto::from_snapshot(
                    &self.provider.current_snapshot(),
                    self.provider.is_loading(),
                )
            })
    }

    /// Shared slot the emitter writes into.
    pub fn status_slot(&self) -> Arc<RwLock<RateStatusDto>> {
        Arc::clone(&self.status)
    }
}

/// DTO for rate status that can be serialized to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RateStatusDto {
    /// RNT price in USDT, 3 decimals
    pub token_price_usdt: String,

    /// USDT→EUR rate, 4 decimals
    pub usdt_to_eur_rate: String,

    /// True until the first fetch attempt has finished
    pub is_loading: bool,

    /// True when showing fallback values
    pub is_stale: bool,

    /// When the snapshot was fetched (ISO8601)
    pub fetched_at: Option<String>,

    /// Last fetch error, cleared on success
    pub last_error: Option<String>,
}

impl RateStatusDto {
    fn from_snapshot(snapshot: &RateSnapshot, is_loading: bool) -> Self {
        RateStatusDto {
            token_price_usdt: format_rate(snapshot.token_price_usdt(), 3),
            usdt_to_eur_rate: format_rate(snapshot.usdt_to_eur_rate(), 4),
            is_loading,
            is_stale: snapshot.is_stale(),
            fetched_at: snapshot.fetched_at().map(|t| t.to_rfc3339()),
            last_error: None,
        }
    }
}

impl Default for RateStatusDto {
    fn default() -> Self {
        RateStatusDto::from(RateStatus::default())
    }
}

impl From<RateStatus> for RateStatusDto {
    fn from(status: RateStatus) -> Self {
        let mut dto = RateStatusDto::from_snapshot(&status.snapshot, status.is_loading);
        dto.last_error = status.last_error;
        dto
    }
}

/// Owns the running rate service so it can be stopped when the app exits.
pub struct RateServiceSlot(Mutex<Option<RateService>>);

impl RateServiceSlot {
    pub fn new(service: RateService) -> Self {
        RateServiceSlot(Mutex::new(Some(service)))
    }

    /// Takes the service out; `None` once taken.
    pub fn take(&self) -> Option<RateService> {
        self.0.lock().ok().and_then(|mut s| s.take())
    }
}

/// Payload of `rates:error`.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct RateErrorEvent {
    pub message: String,
    pub retryable: bool,
}

/// Tauri event emitter for rate updates.
///
/// Implements the `RateEventEmitter` trait from reentel-rates.
pub struct TauriRateEventEmitter<R: Runtime> {
    app_handle: AppHandle<R>,
    rate_state: Arc<RwLock<RateStatusDto>>,
}

impl<R: Runtime> TauriRateEventEmitter<R> {
    pub fn new(app_handle: AppHandle<R>, rate_state: Arc<RwLock<RateStatusDto>>) -> Self {
        Self {
            app_handle,
            rate_state,
        }
    }
}

impl<R: Runtime> RateEventEmitter for TauriRateEventEmitter<R> {
    fn emit_snapshot(&self, snapshot: &RateSnapshot) {
        // The snapshot arrives after the fetch attempt finished.
        let mut dto = RateStatusDto::from_snapshot(snapshot, false);

        if let Ok(mut s) = self.rate_state.write() {
            // Fallback snapshots carry no fetch time; keep the error emitted
            // just before them.
            dto.last_error = if snapshot.fetched_at().is_some() {
                None
            } else {
                s.last_error.take()
            };
            *s = dto.clone();
        }

        debug!(
            token_price = %dto.token_price_usdt,
            eur_rate = %dto.usdt_to_eur_rate,
            stale = dto.is_stale,
            "Rates updated"
        );

        if let Err(e) = self.app_handle.emit(RATES_UPDATED_EVENT, &dto) {
            error!("Failed to emit rates update: {}", e);
        }
    }

    fn emit_error(&self, message: &str, retryable: bool) {
        debug!(message, retryable, "Forwarding rate error");

        if let Ok(mut s) = self.rate_state.write() {
            s.last_error = Some(message.to_string());
        }

        let payload = RateErrorEvent {
            message: message.to_string(),
            retryable,
        };
        if let Err(e) = self.app_handle.emit(RATES_ERROR_EVENT, payload) {
            error!("Failed to emit rates error: {}", e);
        }
    }
}
