//! # reentel-rates: Live Rates for the Reentel Calculator
//!
//! This crate keeps a current [`RateSnapshot`](reentel_core::RateSnapshot)
//! available: the RNT price in USDT and the USDT→EUR rate.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rate Service Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  RateService (background task)                   │  │
//! │  │                                                                  │  │
//! │  │  Spawned on Tauri's Tokio runtime at startup                     │  │
//! │  │  Fetches immediately, then every 30 seconds                      │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ HttpRateSource │  │  RatesConfig   │  │  RateServiceHandle     │    │
//! │  │                │  │                │  │                        │    │
//! │  │ CoinGecko +    │  │ TOML + env     │  │ implements             │    │
//! │  │ exchangerate-  │  │ URLs, timer,   │  │ reentel_core::         │    │
//! │  │ api over HTTPS │  │ fallback pair  │  │ RateProvider           │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  On any fetch failure the fallback pair (0.183, 0.94) is published,    │
//! │  marked stale. Errors never reach the pricing engine.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`service`] - `RateService` refresh loop, handle and event emitter
//! - [`source`] - `RateSource` trait and the HTTP implementation
//! - [`config`] - Rates configuration (feeds, interval, fallback)
//! - [`error`] - Rate error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reentel_core::RateProvider;
//! use reentel_rates::{RateService, RatesConfig};
//!
//! let config = RatesConfig::load_or_default(None);
//! let mut service = RateService::new(config)?;
//! let rates = service.start()?;
//!
//! let snapshot = rates.current_snapshot();
//! println!("RNT: {} USDT (stale: {})", snapshot.token_price_usdt(), snapshot.is_stale());
//!
//! service.shutdown().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod service;
pub mod source;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{FallbackSettings, RatesConfig, RefreshSettings, SourceSettings};
pub use error::{RatesError, RatesResult};
pub use service::{
    NoOpEmitter, RateEventEmitter, RateService, RateServiceBuilder, RateServiceHandle, RateStatus,
};
pub use source::{HttpRateSource, RateSource};
