//! # Rates Configuration
//!
//! Where rates come from, how often they refresh and what to show when the
//! feeds are down.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     REENTEL_TOKEN_ID=reental                                           │
//! │     REENTEL_REFRESH_SECS=30                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/reentel-calculator/rates.toml (Linux)                    │
//! │     ~/Library/Application Support/com.reentel.calculator/rates.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     CoinGecko + exchangerate-api, 30s, fallback 0.183 / 0.94          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # rates.toml
//! [source]
//! token_id = "reental"
//! token_price_url = "https://api.coingecko.com/api/v3/simple/price"
//! fx_url = "https://api.exchangerate-api.com/v4/latest/USD"
//! request_timeout_secs = 10
//!
//! [refresh]
//! interval_secs = 30
//!
//! [fallback]
//! token_price_usdt = "0.183"
//! usdt_to_eur_rate = "0.94"
//! ```

use reentel_core::{RateSnapshot, FALLBACK_TOKEN_PRICE_USDT, FALLBACK_USDT_TO_EUR_RATE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{RatesError, RatesResult};

// =============================================================================
// Source Settings
// =============================================================================

/// Where the two rates are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// CoinGecko coin id of the token.
    #[serde(default = "default_token_id")]
    pub token_id: String,

    /// CoinGecko `simple/price` endpoint (without query string).
    #[serde(default = "default_token_price_url")]
    pub token_price_url: String,

    /// Endpoint returning `{"rates": {"EUR": ...}}` for a USD base.
    #[serde(default = "default_fx_url")]
    pub fx_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_token_id() -> String {
    "reental".to_string()
}
fn default_token_price_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price".to_string()
}
fn default_fx_url() -> String {
    "https://api.exchangerate-api.com/v4/latest/USD".to_string()
}
fn default_request_timeout() -> u64 {
    10
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            token_id: default_token_id(),
            token_price_url: default_token_price_url(),
            fx_url: default_fx_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl SourceSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Refresh Settings
// =============================================================================

/// How often the service refetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSettings {
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
}

fn default_refresh_interval() -> u64 {
    30
}

impl Default for RefreshSettings {
    fn default() -> Self {
        RefreshSettings {
            interval_secs: default_refresh_interval(),
        }
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

// =============================================================================
// Fallback Settings
// =============================================================================

/// Rates published when a fetch fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackSettings {
    #[serde(default = "default_fallback_token_price")]
    pub token_price_usdt: Decimal,

    #[serde(default = "default_fallback_eur_rate")]
    pub usdt_to_eur_rate: Decimal,
}

fn default_fallback_token_price() -> Decimal {
    FALLBACK_TOKEN_PRICE_USDT
}
fn default_fallback_eur_rate() -> Decimal {
    FALLBACK_USDT_TO_EUR_RATE
}

impl Default for FallbackSettings {
    fn default() -> Self {
        FallbackSettings {
            token_price_usdt: default_fallback_token_price(),
            usdt_to_eur_rate: default_fallback_eur_rate(),
        }
    }
}

impl FallbackSettings {
    /// The stale snapshot built from these settings.
    pub fn snapshot(&self) -> RatesResult<RateSnapshot> {
        if self.token_price_usdt == FALLBACK_TOKEN_PRICE_USDT
            && self.usdt_to_eur_rate == FALLBACK_USDT_TO_EUR_RATE
        {
            return Ok(RateSnapshot::fallback());
        }
        Ok(RateSnapshot::fallback_from(
            self.token_price_usdt,
            self.usdt_to_eur_rate,
        )?)
    }
}

// =============================================================================
// Rates Config
// =============================================================================

/// Complete configuration for the rate service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesConfig {
    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub refresh: RefreshSettings,

    #[serde(default)]
    pub fallback: FallbackSettings,
}

impl RatesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (rates.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> RatesResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading rates config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load rates config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> RatesResult<()> {
        for (name, raw) in [
            ("token_price_url", &self.source.token_price_url),
            ("fx_url", &self.source.fx_url),
        ] {
            let url = Url::parse(raw)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(RatesError::InvalidUrl(format!(
                    "{} must start with http:// or https://, got: {}",
                    name, raw
                )));
            }
        }

        if self.source.token_id.trim().is_empty() {
            return Err(RatesError::InvalidConfig("token_id must not be empty".into()));
        }

        if self.source.request_timeout_secs == 0 {
            return Err(RatesError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.refresh.interval_secs == 0 {
            return Err(RatesError::InvalidConfig(
                "refresh interval_secs must be greater than 0".into(),
            ));
        }

        self.fallback
            .snapshot()
            .map_err(|e| RatesError::InvalidConfig(format!("fallback: {}", e)))?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the process environment in
    /// production, a map in tests).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup("REENTEL_TOKEN_ID") {
            debug!(token_id = %id, "Overriding token id from environment");
            self.source.token_id = id;
        }

        if let Some(url) = lookup("REENTEL_TOKEN_PRICE_URL") {
            debug!(url = %url, "Overriding token price URL from environment");
            self.source.token_price_url = url;
        }

        if let Some(url) = lookup("REENTEL_FX_URL") {
            debug!(url = %url, "Overriding FX URL from environment");
            self.source.fx_url = url;
        }

        if let Some(secs) = lookup("REENTEL_REFRESH_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.refresh.interval_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid REENTEL_REFRESH_SECS"),
            }
        }

        if let Some(secs) = lookup("REENTEL_REQUEST_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.source.request_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid REENTEL_REQUEST_TIMEOUT_SECS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "reentel", "calculator")
            .map(|dirs| dirs.config_dir().join("rates.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = RatesConfig::default();
        assert_eq!(config.source.token_id, "reental");
        assert_eq!(config.refresh.interval(), Duration::from_secs(30));
        assert_eq!(config.fallback.token_price_usdt, dec!(0.183));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RatesConfig::default();
        config.source.fx_url = "ftp://rates.example.com".into();
        assert!(matches!(config.validate(), Err(RatesError::InvalidUrl(_))));

        let mut config = RatesConfig::default();
        config.source.token_price_url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = RatesConfig::default();
        config.refresh.interval_secs = 0;
        assert!(matches!(config.validate(), Err(RatesError::InvalidConfig(_))));

        let mut config = RatesConfig::default();
        config.fallback.usdt_to_eur_rate = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("REENTEL_TOKEN_ID", "other-token"),
            ("REENTEL_REFRESH_SECS", "60"),
            ("REENTEL_REQUEST_TIMEOUT_SECS", "soon"),
        ]
        .into_iter()
        .collect();

        let mut config = RatesConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.source.token_id, "other-token");
        assert_eq!(config.refresh.interval_secs, 60);
        // Unparseable values are ignored.
        assert_eq!(config.source.request_timeout_secs, 10);
    }

    #[test]
    fn test_toml_partial_file() {
        let config: RatesConfig = toml::from_str(
            r#"
            [refresh]
            interval_secs = 15

            [fallback]
            token_price_usdt = "0.2"
            "#,
        )
        .unwrap();

        assert_eq!(config.refresh.interval_secs, 15);
        assert_eq!(config.fallback.token_price_usdt, dec!(0.2));
        assert_eq!(config.fallback.usdt_to_eur_rate, dec!(0.94));
        assert_eq!(config.source, SourceSettings::default());

        let snapshot = config.fallback.snapshot().unwrap();
        assert!(snapshot.is_stale());
        assert_eq!(snapshot.token_price_usdt(), dec!(0.2));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&RatesConfig::default()).unwrap();
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[refresh]"));
        assert!(toml_str.contains("[fallback]"));
    }
}
