//! # Application State
//!
//! State objects managed by Tauri and injected into commands.
//!
//! ## State Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Managed State                                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Tauri Runtime                              │   │
//! │  │  app.manage(calculator_state);  // CalculatorState              │   │
//! │  │  app.manage(config_state);      // ConfigState                  │   │
//! │  │  app.manage(rate_state);        // RateState + RateServiceSlot  │   │
//! │  │  app.manage(export_state);      // ExportState                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌────────────────┐ ┌──────────────┐  ┌──────────────────┐             │
//! │  │CalculatorState │ │ ConfigState  │  │   RateState      │             │
//! │  │                │ │              │  │                  │             │
//! │  │  Arc<Mutex<    │ │ wallet       │  │ RateProvider     │             │
//! │  │    Form        │ │ rules        │  │ + RwLock<        │             │
//! │  │  >>            │ │ methods      │  │   RateStatusDto> │             │
//! │  └────────────────┘ └──────────────┘  └──────────────────┘             │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CalculatorState: Protected by Arc<Mutex<T>> for exclusive access    │
//! │  • ConfigState: Read-only after initialization                         │
//! │  • RateState: watch channel reads + RwLock for the UI copy             │
//! │  • ExportState: stateless backends behind Arc<dyn _>                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod calculator;
mod config;
mod export;
mod rates;

pub use calculator::{CalculatorState, Form, FormUpdate};
pub use config::ConfigState;
pub use export::ExportState;
pub use rates::{
    RateErrorEvent, RateServiceSlot, RateState, RateStatusDto, TauriRateEventEmitter,
    RATES_ERROR_EVENT, RATES_UPDATED_EVENT,
};
