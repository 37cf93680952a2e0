//! # Pricing Rules
//!
//! Every number that has changed between calculator releases lives here as a
//! named constant, grouped into a [`PricingRules`] rule-set.
//!
//! ## Rule-sets
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Rule-set Comparison                             │
//! │                                                                         │
//! │                                   current()        legacy()             │
//! │  ───────────────────────────────  ─────────────    ─────────────        │
//! │  ReentelPro status threshold      14,000 xRNT      8,000 xRNT           │
//! │  SuperReentel status threshold    28,000 xRNT      28,000 xRNT          │
//! │  Premium (30%) min. balance       8,000 xRNT       8,000 xRNT           │
//! │  Price multiplier                 ×1               ×10                  │
//! │  Payment methods                  USDT USDC        Transfer EUR         │
//! │                                   ETH  BTC         Transfer USD, Crypto │
//! │                                                                         │
//! │  The ×10 multiplier is unconfirmed (lot size or defect). It is only    │
//! │  applied when the legacy rule-set or an explicit override selects it.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{PaymentMethod, StatusTier};

// =============================================================================
// Named Constants
// =============================================================================

/// xRNT needed to hold ReentelPro status.
pub const REENTEL_PRO_THRESHOLD: Decimal = dec!(14000);

/// xRNT needed for ReentelPro in the legacy rule-set.
pub const LEGACY_REENTEL_PRO_THRESHOLD: Decimal = dec!(8000);

/// xRNT needed to hold SuperReentel status.
pub const SUPER_REENTEL_THRESHOLD: Decimal = dec!(28000);

/// Minimum xRNT balance for a SuperReentel buyer to get the 30% discount.
pub const PREMIUM_DISCOUNT_MIN_BALANCE: Decimal = dec!(8000);

/// Multiplier applied to `quantity × price`.
pub const DEFAULT_PRICE_MULTIPLIER: Decimal = dec!(1);

/// Multiplier used by the legacy rule-set.
pub const LEGACY_PRICE_MULTIPLIER: Decimal = dec!(10);

// =============================================================================
// Payment Method Set
// =============================================================================

/// The closed set of payment methods a rule-set offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodSet {
    /// USDT, USDC, ETH, BTC.
    #[default]
    CryptoAssets,
    /// Bank transfer in EUR or USD, or generic crypto.
    BankTransfer,
}

const CRYPTO_ASSETS: &[PaymentMethod] = &[
    PaymentMethod::Usdt,
    PaymentMethod::Usdc,
    PaymentMethod::Eth,
    PaymentMethod::Btc,
];

const BANK_TRANSFER: &[PaymentMethod] = &[
    PaymentMethod::TransferEur,
    PaymentMethod::TransferUsd,
    PaymentMethod::Crypto,
];

impl PaymentMethodSet {
    /// Methods offered, in selector order.
    pub fn methods(&self) -> &'static [PaymentMethod] {
        match self {
            PaymentMethodSet::CryptoAssets => CRYPTO_ASSETS,
            PaymentMethodSet::BankTransfer => BANK_TRANSFER,
        }
    }

    pub fn accepts(&self, method: PaymentMethod) -> bool {
        self.methods().contains(&method)
    }
}

impl FromStr for PaymentMethodSet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crypto" | "crypto_assets" => Ok(PaymentMethodSet::CryptoAssets),
            "transfer" | "bank_transfer" => Ok(PaymentMethodSet::BankTransfer),
            other => Err(CoreError::InvalidRules {
                reason: format!(
                    "Unknown payment method set: '{}'. Valid options: crypto, transfer",
                    other
                ),
            }),
        }
    }
}

// =============================================================================
// Rule-set Name
// =============================================================================

/// Named preset a [`PricingRules`] value starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    #[default]
    Current,
    Legacy,
}

impl RuleSet {
    pub fn rules(&self) -> PricingRules {
        match self {
            RuleSet::Current => PricingRules::current(),
            RuleSet::Legacy => PricingRules::legacy(),
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSet::Current => write!(f, "current"),
            RuleSet::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for RuleSet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" | "default" => Ok(RuleSet::Current),
            "legacy" => Ok(RuleSet::Legacy),
            other => Err(CoreError::InvalidRules {
                reason: format!("Unknown rule-set: '{}'. Valid options: current, legacy", other),
            }),
        }
    }
}

// =============================================================================
// Pricing Rules
// =============================================================================

/// Thresholds, multiplier and payment methods used by the pricing engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingRules {
    /// xRNT required for ReentelPro status.
    #[ts(type = "string")]
    pub reentel_pro_threshold: Decimal,

    /// xRNT required for SuperReentel status.
    #[ts(type = "string")]
    pub super_reentel_threshold: Decimal,

    /// Minimum balance for the premium discount (SuperReentel only).
    #[ts(type = "string")]
    pub premium_discount_min_balance: Decimal,

    /// Applied to `quantity × token price`.
    #[ts(type = "string")]
    pub price_multiplier: Decimal,

    /// Accepted payment methods.
    pub payment_methods: PaymentMethodSet,
}

impl PricingRules {
    /// The rule-set the calculator ships with.
    pub fn current() -> Self {
        PricingRules {
            reentel_pro_threshold: REENTEL_PRO_THRESHOLD,
            super_reentel_threshold: SUPER_REENTEL_THRESHOLD,
            premium_discount_min_balance: PREMIUM_DISCOUNT_MIN_BALANCE,
            price_multiplier: DEFAULT_PRICE_MULTIPLIER,
            payment_methods: PaymentMethodSet::CryptoAssets,
        }
    }

    /// The earlier rule-set: lower ReentelPro threshold, ×10 multiplier,
    /// transfer-based payment methods.
    pub fn legacy() -> Self {
        PricingRules {
            reentel_pro_threshold: LEGACY_REENTEL_PRO_THRESHOLD,
            super_reentel_threshold: SUPER_REENTEL_THRESHOLD,
            premium_discount_min_balance: PREMIUM_DISCOUNT_MIN_BALANCE,
            price_multiplier: LEGACY_PRICE_MULTIPLIER,
            payment_methods: PaymentMethodSet::BankTransfer,
        }
    }

    /// xRNT balance required to hold `tier`.
    pub fn status_threshold(&self, tier: StatusTier) -> Decimal {
        match tier {
            StatusTier::ReentelPro => self.reentel_pro_threshold,
            StatusTier::SuperReentel => self.super_reentel_threshold,
        }
    }

    /// Checks the rules are usable by the engine.
    pub fn validate(&self) -> CoreResult<()> {
        if self.price_multiplier <= Decimal::ZERO {
            return Err(CoreError::InvalidRules {
                reason: format!(
                    "price multiplier must be positive, got {}",
                    self.price_multiplier
                ),
            });
        }

        let thresholds = [
            ("reentel_pro_threshold", self.reentel_pro_threshold),
            ("super_reentel_threshold", self.super_reentel_threshold),
            (
                "premium_discount_min_balance",
                self.premium_discount_min_balance,
            ),
        ];
        for (name, value) in thresholds {
            if value.is_sign_negative() {
                return Err(CoreError::InvalidRules {
                    reason: format!("{} must not be negative, got {}", name, value),
                });
            }
        }

        Ok(())
    }
}

impl Default for PricingRules {
    fn default() -> Self {
        PricingRules::current()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_rules() {
        let rules = PricingRules::default();
        assert_eq!(rules.status_threshold(StatusTier::ReentelPro), dec!(14000));
        assert_eq!(rules.status_threshold(StatusTier::SuperReentel), dec!(28000));
        assert_eq!(rules.premium_discount_min_balance, dec!(8000));
        assert_eq!(rules.price_multiplier, Decimal::ONE);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_legacy_rules() {
        let rules = RuleSet::Legacy.rules();
        assert_eq!(rules.status_threshold(StatusTier::ReentelPro), dec!(8000));
        assert_eq!(rules.price_multiplier, dec!(10));
        assert_eq!(rules.payment_methods, PaymentMethodSet::BankTransfer);
    }

    #[test]
    fn test_payment_method_sets() {
        assert!(PaymentMethodSet::CryptoAssets.accepts(PaymentMethod::Btc));
        assert!(!PaymentMethodSet::CryptoAssets.accepts(PaymentMethod::TransferEur));
        assert!(PaymentMethodSet::BankTransfer.accepts(PaymentMethod::Crypto));
        assert_eq!(PaymentMethodSet::BankTransfer.methods().len(), 3);
    }

    #[test]
    fn test_parsing() {
        assert_eq!("legacy".parse::<RuleSet>().unwrap(), RuleSet::Legacy);
        assert_eq!(" Current ".parse::<RuleSet>().unwrap(), RuleSet::Current);
        assert!("v3".parse::<RuleSet>().is_err());

        assert_eq!(
            "transfer".parse::<PaymentMethodSet>().unwrap(),
            PaymentMethodSet::BankTransfer
        );
        assert!("cash".parse::<PaymentMethodSet>().is_err());
    }

    #[test]
    fn test_invalid_rules() {
        let mut rules = PricingRules::current();
        rules.price_multiplier = Decimal::ZERO;
        assert!(rules.validate().is_err());

        let mut rules = PricingRules::current();
        rules.super_reentel_threshold = dec!(-1);
        assert!(rules.validate().is_err());
    }
}
