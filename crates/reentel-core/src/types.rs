//! # Domain Types
//!
//! Core domain types used throughout the Reentel calculator.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StatusTier    │   │  DiscountTier   │   │  PaymentMethod  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  ReentelPro     │   │  Standard (20%) │   │  USDT USDC ...  │       │
//! │  │  SuperReentel   │   │  Premium  (30%) │   │  TRANSFER_EUR   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CalculationInput│──►│ ValidatedInput  │──►│CalculationResult│       │
//! │  │  raw form text  │   │  parsed numbers │   │  prices, savings│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                               ▲                                         │
//! │                     ┌─────────┴───────┐                                 │
//! │                     │  RateSnapshot   │  (from reentel-rates)           │
//! │                     └─────────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every type here is a value: built fresh for one calculation, never mutated
//! afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Status Tier
// =============================================================================

/// Loyalty status the user is aiming for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    /// Lower tier. Always priced at the standard discount.
    ReentelPro,
    /// Higher tier. Unlocks the premium discount with enough xRNT.
    #[default]
    SuperReentel,
}

impl StatusTier {
    /// Display name shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            StatusTier::ReentelPro => "ReentelPro",
            StatusTier::SuperReentel => "SuperReentel",
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Discount Tier
// =============================================================================

/// The discount applied to a purchase.
///
/// Only two rates exist; the enum makes any other percentage unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountTier {
    /// 20% off.
    Standard,
    /// 30% off.
    Premium,
}

impl DiscountTier {
    /// Discount in whole percent (20 or 30).
    #[inline]
    pub const fn percent(&self) -> u8 {
        match self {
            DiscountTier::Standard => 20,
            DiscountTier::Premium => 30,
        }
    }

    /// Share of the base price the buyer still pays, e.g. `0.70` for Premium.
    #[inline]
    pub fn price_factor(&self) -> Decimal {
        (dec!(100) - Decimal::from(self.percent())) / dec!(100)
    }
}

// =============================================================================
// Display Currency
// =============================================================================

/// Currency a final total is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisplayCurrency {
    Usdt,
    Usd,
    Eur,
}

impl DisplayCurrency {
    /// Symbol prefixed to formatted amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            DisplayCurrency::Usdt | DisplayCurrency::Usd => "$",
            DisplayCurrency::Eur => "€",
        }
    }

    /// Converts an amount quoted in USDT into this currency.
    ///
    /// USD and USDT are treated as 1:1. Saturates at `Decimal::MAX`.
    pub fn convert_from_usdt(&self, amount_usdt: Decimal, rates: &RateSnapshot) -> Decimal {
        match self {
            DisplayCurrency::Usdt | DisplayCurrency::Usd => amount_usdt,
            DisplayCurrency::Eur => amount_usdt.saturating_mul(rates.usdt_to_eur_rate()),
        }
    }
}

impl fmt::Display for DisplayCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayCurrency::Usdt => write!(f, "USDT"),
            DisplayCurrency::Usd => write!(f, "USD"),
            DisplayCurrency::Eur => write!(f, "EUR"),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Every payment method any rule-set has offered.
///
/// Which subset is accepted is decided by [`crate::rules::PaymentMethodSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Usdt,
    Usdc,
    Eth,
    Btc,
    TransferEur,
    TransferUsd,
    Crypto,
}

impl PaymentMethod {
    /// Human-readable label for selectors and receipts.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Usdt => "USDT",
            PaymentMethod::Usdc => "USDC",
            PaymentMethod::Eth => "ETH",
            PaymentMethod::Btc => "BTC",
            PaymentMethod::TransferEur => "Bank transfer (EUR)",
            PaymentMethod::TransferUsd => "Bank transfer (USD)",
            PaymentMethod::Crypto => "Crypto",
        }
    }

    /// Currency the final total is displayed in for this method.
    pub fn display_currency(&self) -> DisplayCurrency {
        match self {
            PaymentMethod::TransferEur => DisplayCurrency::Eur,
            PaymentMethod::TransferUsd => DisplayCurrency::Usd,
            PaymentMethod::Usdt
            | PaymentMethod::Usdc
            | PaymentMethod::Eth
            | PaymentMethod::Btc
            | PaymentMethod::Crypto => DisplayCurrency::Usdt,
        }
    }

    /// Whether the buyer pays on-chain to the project wallet.
    pub fn is_on_chain(&self) -> bool {
        !matches!(self, PaymentMethod::TransferEur | PaymentMethod::TransferUsd)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            PaymentMethod::Usdt => "USDT",
            PaymentMethod::Usdc => "USDC",
            PaymentMethod::Eth => "ETH",
            PaymentMethod::Btc => "BTC",
            PaymentMethod::TransferEur => "TRANSFER_EUR",
            PaymentMethod::TransferUsd => "TRANSFER_USD",
            PaymentMethod::Crypto => "CRYPTO",
        };
        f.write_str(code)
    }
}

// =============================================================================
// Rate Snapshot
// =============================================================================

/// Fallback RNT price used when the price feed cannot be reached.
pub const FALLBACK_TOKEN_PRICE_USDT: Decimal = dec!(0.183);

/// Fallback USDT→EUR rate used when the FX feed cannot be reached.
pub const FALLBACK_USDT_TO_EUR_RATE: Decimal = dec!(0.94);

/// One consistent pair of exchange rates.
///
/// ## Lifecycle
/// ```text
/// loading() ──first fetch──► live(..)      (is_stale = false)
///     │                         │
///     │                    fetch fails
///     ▼                         ▼
///  fetch fails ──────────► fallback()      (is_stale = true)
/// ```
///
/// Fields are private so only the constructors can create a snapshot; the
/// only one allowed to hold zeros is `loading()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RateSnapshot {
    #[ts(type = "string")]
    token_price_usdt: Decimal,
    #[ts(type = "string")]
    usdt_to_eur_rate: Decimal,
    is_stale: bool,
    #[ts(as = "Option<String>")]
    fetched_at: Option<DateTime<Utc>>,
}

impl RateSnapshot {
    /// Creates a snapshot, rejecting non-positive rates.
    pub fn new(
        token_price_usdt: Decimal,
        usdt_to_eur_rate: Decimal,
        is_stale: bool,
        fetched_at: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if token_price_usdt <= Decimal::ZERO {
            return Err(CoreError::InvalidRate {
                name: "token_price_usdt",
                value: token_price_usdt.to_string(),
            });
        }
        if usdt_to_eur_rate <= Decimal::ZERO {
            return Err(CoreError::InvalidRate {
                name: "usdt_to_eur_rate",
                value: usdt_to_eur_rate.to_string(),
            });
        }

        Ok(RateSnapshot {
            token_price_usdt,
            usdt_to_eur_rate,
            is_stale,
            fetched_at: Some(fetched_at),
        })
    }

    /// Creates a fresh snapshot from a successful fetch.
    pub fn live(
        token_price_usdt: Decimal,
        usdt_to_eur_rate: Decimal,
        fetched_at: DateTime<Utc>,
    ) -> CoreResult<Self> {
        Self::new(token_price_usdt, usdt_to_eur_rate, false, fetched_at)
    }

    /// The documented fallback pair (`0.183`, `0.94`), marked stale.
    pub fn fallback() -> Self {
        RateSnapshot {
            token_price_usdt: FALLBACK_TOKEN_PRICE_USDT,
            usdt_to_eur_rate: FALLBACK_USDT_TO_EUR_RATE,
            is_stale: true,
            fetched_at: None,
        }
    }

    /// A fallback pair other than the documented one, marked stale.
    ///
    /// Rejects non-positive rates like [`RateSnapshot::new`].
    pub fn fallback_from(token_price_usdt: Decimal, usdt_to_eur_rate: Decimal) -> CoreResult<Self> {
        let mut snapshot = Self::new(token_price_usdt, usdt_to_eur_rate, true, Utc::now())?;
        snapshot.fetched_at = None;
        Ok(snapshot)
    }

    /// Placeholder published before the first fetch completes.
    pub fn loading() -> Self {
        RateSnapshot {
            token_price_usdt: Decimal::ZERO,
            usdt_to_eur_rate: Decimal::ZERO,
            is_stale: true,
            fetched_at: None,
        }
    }

    /// Returns a copy marked stale, keeping the fetch time.
    pub fn into_stale(mut self) -> Self {
        self.is_stale = true;
        self
    }

    #[inline]
    pub fn token_price_usdt(&self) -> Decimal {
        self.token_price_usdt
    }

    #[inline]
    pub fn usdt_to_eur_rate(&self) -> Decimal {
        self.usdt_to_eur_rate
    }

    #[inline]
    pub fn is_stale(&self) -> bool {
        self.is_stale
    }

    #[inline]
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// True while the token price is still the loading placeholder.
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.token_price_usdt.is_zero()
    }
}

// =============================================================================
// Rate Provider
// =============================================================================

/// Read-only source of the latest rate snapshot.
///
/// Implemented by the background rate service; the engine only ever sees the
/// snapshot it returns.
pub trait RateProvider: Send + Sync {
    /// Latest snapshot: live, fallback, or the loading placeholder.
    fn current_snapshot(&self) -> RateSnapshot;

    /// True until the first fetch attempt has completed.
    fn is_loading(&self) -> bool;
}

/// A provider that always returns the same snapshot.
#[derive(Debug, Clone)]
pub struct FixedRates(pub RateSnapshot);

impl RateProvider for FixedRates {
    fn current_snapshot(&self) -> RateSnapshot {
        self.0.clone()
    }

    fn is_loading(&self) -> bool {
        self.0.is_placeholder()
    }
}

// =============================================================================
// Calculation Input
// =============================================================================

/// Raw calculator form values, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    /// Current xRNT balance. Optional; blank means "not provided".
    pub current_balance: Option<String>,
    /// Target status.
    pub tier: StatusTier,
    /// RNT to buy. Mandatory.
    pub purchase_quantity: Option<String>,
    /// Selected payment method. Mandatory.
    pub payment_method: Option<PaymentMethod>,
}

/// Form values after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedInput {
    #[ts(type = "string | null")]
    pub current_balance: Option<Decimal>,
    pub tier: StatusTier,
    #[ts(type = "string")]
    pub purchase_quantity: Decimal,
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Calculation Result
// =============================================================================

/// Everything derived from one calculation.
///
/// All USDT amounts are in `base_price`, `discount_amount` and `final_price`;
/// the display-currency fields repeat them in `display_currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// 20 or 30.
    pub discount_percent: u8,
    #[ts(type = "string")]
    pub base_price: Decimal,
    #[ts(type = "string")]
    pub discount_amount: Decimal,
    #[ts(type = "string")]
    pub final_price: Decimal,
    pub display_currency: DisplayCurrency,
    #[ts(type = "string")]
    pub final_price_in_display_currency: Decimal,
    /// `discount_amount` in the display currency.
    #[ts(type = "string")]
    pub savings: Decimal,
    /// `final_price` in EUR, shown as an "≈ €" hint next to USDT totals.
    #[ts(type = "string")]
    pub eur_equivalent: Decimal,
}

impl CalculationResult {
    /// The discount tier this result was priced with.
    pub fn discount_tier(&self) -> DiscountTier {
        if self.discount_percent == DiscountTier::Premium.percent() {
            DiscountTier::Premium
        } else {
            DiscountTier::Standard
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
