//! # Reentel Desktop Library
//!
//! Core library for the Reentel calculator desktop application.
//! This is the main entry point that configures and runs the Tauri app.
//!
//! ## Module Organization
//! ```text
//! reentel_desktop_lib/
//! ├── lib.rs        ◄─── You are here (Tauri setup & run)
//! ├── commands/     ◄─── Tauri commands
//! │   ├── calculator.rs
//! │   ├── rates.rs
//! │   ├── config.rs
//! │   └── export.rs
//! ├── state/        ◄─── Managed state types
//! │   ├── calculator.rs
//! │   ├── config.rs
//! │   ├── export.rs
//! │   └── rates.rs
//! ├── export.rs     ◄─── Result card payload, clipboard and renderer traits
//! ├── platform.rs   ◄─── arboard clipboard, printpdf card renderer
//! └── error.rs      ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod export;
pub mod platform;
pub mod state;

use std::sync::{Arc, RwLock};

use reentel_rates::{RateService, RateServiceBuilder, RateSource, RatesConfig};
use tauri::{AppHandle, Manager, RunEvent, Runtime};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use error::ApiError;
use state::{
    CalculatorState, ConfigState, ExportState, RateServiceSlot, RateState, RateStatusDto,
    TauriRateEventEmitter,
};

/// Runs the Tauri application.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • Default: INFO, DEBUG for reentel crates                           │
/// │                                                                         │
/// │  2. Start Calculator (App::start) ────────────────────────────────────► │
/// │     • ConfigState::from_env, RatesConfig::load_or_default               │
/// │     • Rate service on Tauri's Tokio runtime                             │
/// │                                                                         │
/// │  3. Manage State ─────────────────────────────────────────────────────► │
/// │     • CalculatorState, ConfigState, RateState, ExportState              │
/// │                                                                         │
/// │  4. Register Commands & Launch Window ────────────────────────────────► │
/// │                                                                         │
/// │  5. On Exit ──────────────────────────────────────────────────────────► │
/// │     • Stop the rate service                                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() {
    // Initialize tracing (logging)
    init_tracing();

    info!("Starting Reentel Calculator");

    tauri::Builder::default()
        .setup(|app| {
            let handle = app.handle().clone();

            // The rate service spawns its refresh task on the current runtime.
            let calculator = tauri::async_runtime::block_on(async move { App::start(handle) })?;

            calculator.manage(app.handle());
            app.manage(ExportState::system());

            info!("State initialized");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Calculator commands
            commands::calculator::get_form,
            commands::calculator::update_form,
            commands::calculator::preview,
            commands::calculator::fill_missing_amount,
            commands::calculator::calculate,
            commands::calculator::reset_calculator,
            // Rate commands
            commands::rates::get_rates,
            // Config commands
            commands::config::get_config,
            // Export commands
            commands::export::copy_wallet_address,
            commands::export::export_result,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| {
            if let RunEvent::Exit = event {
                stop_rate_service(app_handle);
            }
        });
}

fn stop_rate_service<R: Runtime>(app_handle: &AppHandle<R>) {
    let Some(slot) = app_handle.try_state::<RateServiceSlot>() else {
        return;
    };

    if let Some(mut service) = slot.take() {
        if let Err(e) = tauri::async_runtime::block_on(service.shutdown()) {
            error!(error = %e, "Failed to stop rate service");
        }
    }
}

/// Calculator state plus the running rate service.
///
/// Built in the setup hook, then handed to Tauri with [`App::manage`].
pub struct App {
    pub calculator: CalculatorState,
    pub config: ConfigState,
    pub rates: RateState,
    service: RateService,
}

impl App {
    /// Loads configuration from the environment and starts the rate service.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<R: Runtime>(app_handle: AppHandle<R>) -> Result<Self, ApiError> {
        let config = ConfigState::from_env();
        let rates_config = RatesConfig::load_or_default(None);

        Self::start_with(config, RateServiceBuilder::new(rates_config), app_handle)
    }

    /// Starts with explicit configuration and rate source.
    pub fn with_source<R: Runtime>(
        config: ConfigState,
        rates_config: RatesConfig,
        source: Arc<dyn RateSource>,
        app_handle: AppHandle<R>,
    ) -> Result<Self, ApiError> {
        Self::start_with(
            config,
            RateServiceBuilder::new(rates_config).with_source(source),
            app_handle,
        )
    }

    fn start_with<R: Runtime>(
        config: ConfigState,
        builder: RateServiceBuilder,
        app_handle: AppHandle<R>,
    ) -> Result<Self, ApiError> {
        config.validate()?;

        let status = Arc::new(RwLock::new(RateStatusDto::default()));
        let emitter = TauriRateEventEmitter::new(app_handle, Arc::clone(&status));

        let mut service = builder.with_emitter(Arc::new(emitter)).build()?;
        let handle = service.start()?;

        info!(
            rule_set = %config.rule_set,
            wallet = %config.wallet_address,
            "Calculator started"
        );

        Ok(App {
            calculator: CalculatorState::new(),
            config,
            rates: RateState::from_handle(handle, status),
            service,
        })
    }

    /// Registers every state object with Tauri.
    ///
    /// The service moves into a [`RateServiceSlot`] so the exit handler can
    /// stop it.
    pub fn manage<R: Runtime>(self, app_handle: &AppHandle<R>) {
        app_handle.manage(self.calculator);
        app_handle.manage(self.config);
        app_handle.manage(self.rates);
        app_handle.manage(RateServiceSlot::new(self.service));
    }

    /// Stops the rate service.
    pub async fn shutdown(&mut self) -> Result<(), ApiError> {
        self.service.shutdown().await?;
        info!("Calculator stopped");
        Ok(())
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=reentel=trace` - Show trace for reentel crates only
/// - Default: INFO, DEBUG for reentel crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reentel=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
