//! # reentel-core: Pure Pricing Logic for the Reentel Calculator
//!
//! This crate holds everything the calculator decides: discount tiers,
//! form validation, price math and the form state machine. It performs no
//! I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Reentel Calculator Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Host UI (web view, shell)                    │   │
//! │  │     Balance ──► Tier ──► Quantity ──► Method ──► Result/Export │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              reentel-desktop (Tauri app)                       │   │
//! │  │    update_form, preview, calculate, export_result, etc.        │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │ RateSnapshot           │
//! │  ┌──────────────▼──────────────────┐  ┌────────┴──────────────────┐    │
//! │  │   ★ reentel-core (THIS CRATE) ★ │  │      reentel-rates        │    │
//! │  │                                 │  │  HTTP sources, 30s timer  │    │
//! │  │  types  rules  validation       │  │  fallback (0.183, 0.94)   │    │
//! │  │  pricing  calculator  format    │  └───────────────────────────┘    │
//! │  │                                 │                                    │
//! │  │  NO I/O • NO NETWORK • NO TIMERS│                                    │
//! │  └─────────────────────────────────┘                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (tiers, payment methods, snapshot, result)
//! - [`rules`] - Named pricing constants and rule-sets
//! - [`validation`] - Form field validators
//! - [`pricing`] - The pricing engine
//! - [`calculator`] - Idle/Calculated form state machine
//! - [`format`] - es-ES amount formatting
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input and snapshot, same result
//! 2. **Exact Decimals**: all money is `rust_decimal::Decimal`, never `f64`
//! 3. **Errors as Data**: validation failures are collected, not thrown
//!
//! ## Example Usage
//!
//! ```rust
//! use reentel_core::{CalculationInput, PaymentMethod, PricingEngine, RateSnapshot, StatusTier};
//! use rust_decimal_macros::dec;
//!
//! let engine = PricingEngine::default();
//! let input = CalculationInput {
//!     current_balance: Some("8000".into()),
//!     tier: StatusTier::SuperReentel,
//!     purchase_quantity: Some("1000".into()),
//!     payment_method: Some(PaymentMethod::Usdt),
//! };
//!
//! let (_, result) = engine.calculate(&input, &RateSnapshot::fallback()).unwrap();
//! assert_eq!(result.discount_percent, 30);
//! assert_eq!(result.final_price, dec!(128.1));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod error;
pub mod format;
pub mod pricing;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::{CalculatorState, FieldError};
pub use error::{CoreError, CoreResult, InputField, ValidationError, ValidationErrors};
pub use pricing::PricingEngine;
pub use rules::{PaymentMethodSet, PricingRules, RuleSet};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Wallet that on-chain payments are sent to.
///
/// Shown with a copy button under the result. Only checked for being
/// non-empty, not for a valid EIP-55 checksum.
pub const DEFAULT_WALLET_ADDRESS: &str = "0x4495Ba59116F7dF7AC6C438638AaDA85a6D6Cb0F1";
