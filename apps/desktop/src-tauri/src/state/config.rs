//! # Configuration State
//!
//! Stores calculator configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`REENTEL_*`)
//! 2. Rule-set preset (`current` or `legacy`)
//! 3. Defaults (this file)
//!
//! Rate feed settings live in `reentel_rates::RatesConfig`, not here.
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::str::FromStr;

use reentel_core::{
    PaymentMethod, PaymentMethodSet, PricingEngine, PricingRules, RuleSet,
    DEFAULT_WALLET_ADDRESS,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;
use ts_rs::TS;

use crate::error::ApiError;

const MAX_AMOUNT_DECIMALS: u32 = 8;

/// Calculator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Wallet on-chain payments are sent to
    pub wallet_address: String,

    /// Preset the rules started from
    pub rule_set: RuleSet,

    /// Effective pricing rules after overrides
    pub rules: PricingRules,

    /// Methods shown in the selector, in order
    pub payment_methods: Vec<PaymentMethod>,

    /// Fraction digits for the balance and quantity on the result card
    pub amount_decimals: u32,
}

impl Default for ConfigState {
    /// Current rules, default wallet, 2 decimals.
    fn default() -> Self {
        ConfigState::with_rules(RuleSet::Current, RuleSet::Current.rules())
    }
}

impl ConfigState {
    fn with_rules(rule_set: RuleSet, rules: PricingRules) -> Self {
        ConfigState {
            wallet_address: DEFAULT_WALLET_ADDRESS.to_string(),
            rule_set,
            payment_methods: rules.payment_methods.methods().to_vec(),
            rules,
            amount_decimals: 2,
        }
    }

    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `REENTEL_WALLET_ADDRESS`: Override the payment wallet
    /// - `REENTEL_RULESET`: `current` or `legacy`
    /// - `REENTEL_PAYMENT_METHODS`: `crypto` or `transfer`
    /// - `REENTEL_PREMIUM_MIN_BALANCE`: xRNT needed for the 30% discount
    /// - `REENTEL_PRICE_MULTIPLIER`: Multiplier on `quantity × price`
    /// - `REENTEL_AMOUNT_DECIMALS`: Fraction digits for amounts on the card (0-8)
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let rule_set = lookup("REENTEL_RULESET")
            .and_then(|value| parse_or_warn::<RuleSet>("REENTEL_RULESET", &value))
            .unwrap_or_default();
        let mut rules = rule_set.rules();

        if let Some(set) = lookup("REENTEL_PAYMENT_METHODS")
            .and_then(|value| parse_or_warn::<PaymentMethodSet>("REENTEL_PAYMENT_METHODS", &value))
        {
            rules.payment_methods = set;
        }

        if let Some(min) = lookup("REENTEL_PREMIUM_MIN_BALANCE")
            .and_then(|value| parse_or_warn::<Decimal>("REENTEL_PREMIUM_MIN_BALANCE", &value))
        {
            rules.premium_discount_min_balance = min;
        }

        if let Some(multiplier) = lookup("REENTEL_PRICE_MULTIPLIER")
            .and_then(|value| parse_or_warn::<Decimal>("REENTEL_PRICE_MULTIPLIER", &value))
        {
            rules.price_multiplier = multiplier;
        }

        let mut config = ConfigState::with_rules(rule_set, rules);

        if let Some(wallet) = lookup("REENTEL_WALLET_ADDRESS") {
            config.wallet_address = wallet.trim().to_string();
        }

        if let Some(decimals) = lookup("REENTEL_AMOUNT_DECIMALS")
            .and_then(|value| parse_or_warn::<u32>("REENTEL_AMOUNT_DECIMALS", &value))
        {
            config.amount_decimals = decimals;
        }

        config
    }

    /// Checks the wallet is set and the rules are usable.
    ///
    /// The wallet is not checked for a valid checksum.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.wallet_address.is_empty() {
            return Err(ApiError::config("Wallet address must not be empty"));
        }

        if self.amount_decimals > MAX_AMOUNT_DECIMALS {
            return Err(ApiError::config(format!(
                "Amount decimals must be at most {}, got {}",
                MAX_AMOUNT_DECIMALS, self.amount_decimals
            )));
        }

        self.rules.validate()?;
        Ok(())
    }

    /// Engine configured with these rules.
    pub fn engine(&self) -> PricingEngine {
        PricingEngine::new(self.rules.clone())
    }
}

fn parse_or_warn<T: FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, value, "Ignoring unparseable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ConfigState::default();

        assert_eq!(config.wallet_address, DEFAULT_WALLET_ADDRESS);
        assert_eq!(config.rules, PricingRules::current());
        assert_eq!(
            config.payment_methods,
            vec![
                PaymentMethod::Usdt,
                PaymentMethod::Usdc,
                PaymentMethod::Eth,
                PaymentMethod::Btc
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_legacy_ruleset_from_env() {
        let config = ConfigState::from_lookup(lookup(&[("REENTEL_RULESET", "legacy")]));

        assert_eq!(config.rule_set, RuleSet::Legacy);
        assert_eq!(config.rules.price_multiplier, dec!(10));
        assert_eq!(config.payment_methods[0], PaymentMethod::TransferEur);
    }

    #[test]
    fn test_overrides_apply_on_top_of_preset() {
        let config = ConfigState::from_lookup(lookup(&[
            ("REENTEL_RULESET", "legacy"),
            ("REENTEL_PAYMENT_METHODS", "crypto"),
            ("REENTEL_PRICE_MULTIPLIER", "1"),
            ("REENTEL_PREMIUM_MIN_BALANCE", "10000"),
            ("REENTEL_WALLET_ADDRESS", " 0xabc "),
        ]));

        assert_eq!(config.rules.payment_methods, PaymentMethodSet::CryptoAssets);
        assert_eq!(config.rules.price_multiplier, dec!(1));
        assert_eq!(config.rules.premium_discount_min_balance, dec!(10000));
        assert_eq!(config.wallet_address, "0xabc");
    }

    #[test]
    fn test_amount_decimals_from_env() {
        let config = ConfigState::from_lookup(lookup(&[("REENTEL_AMOUNT_DECIMALS", "0")]));
        assert_eq!(config.amount_decimals, 0);
        assert!(config.validate().is_ok());

        let config = ConfigState::from_lookup(lookup(&[("REENTEL_AMOUNT_DECIMALS", "two")]));
        assert_eq!(config.amount_decimals, 2);

        let config = ConfigState::from_lookup(lookup(&[("REENTEL_AMOUNT_DECIMALS", "12")]));
        assert_eq!(config.validate().unwrap_err().code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let config = ConfigState::from_lookup(lookup(&[
            ("REENTEL_RULESET", "ancient"),
            ("REENTEL_PRICE_MULTIPLIER", "ten"),
        ]));

        assert_eq!(config, ConfigState::default());
    }

    #[test]
    fn test_validate_rejects_empty_wallet_and_bad_rules() {
        let config = ConfigState::from_lookup(lookup(&[("REENTEL_WALLET_ADDRESS", "")]));
        assert_eq!(config.validate().unwrap_err().code, ErrorCode::ConfigError);

        let config = ConfigState::from_lookup(lookup(&[("REENTEL_PRICE_MULTIPLIER", "0")]));
        assert_eq!(config.validate().unwrap_err().code, ErrorCode::ConfigError);
    }
}
