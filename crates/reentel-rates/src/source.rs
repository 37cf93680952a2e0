//! # Rate Sources
//!
//! One fetch of the token price and the USD→EUR rate.
//!
//! ## HTTP Source
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        HttpRateSource::fetch                            │
//! │                                                                         │
//! │  GET {token_price_url}?ids=reental&vs_currencies=usd                   │
//! │      {"reental": {"usd": 0.183}}                                       │
//! │                  │                                                      │
//! │                  ├── present  → live token price                        │
//! │                  └── missing  → fallback token price, snapshot stale   │
//! │                                                                         │
//! │  GET {fx_url}                                                          │
//! │      {"base": "USD", "rates": {"EUR": 0.94, ...}}                      │
//! │                  │                                                      │
//! │                  ├── present  → live EUR rate                           │
//! │                  └── missing  → error (whole fetch fails)              │
//! │                                                                         │
//! │  Transport errors, non-2xx statuses and bad JSON fail the whole fetch. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reentel_core::RateSnapshot;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use url::Url;

use crate::config::{FallbackSettings, SourceSettings};
use crate::error::{RatesError, RatesResult};

/// Something that can produce one fresh snapshot.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches both rates once.
    async fn fetch(&self) -> RatesResult<RateSnapshot>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

// =============================================================================
// HTTP Source
// =============================================================================

/// Fetches the token price from CoinGecko and the EUR rate from an
/// exchangerate-api style endpoint.
pub struct HttpRateSource {
    client: reqwest::Client,
    token_id: String,
    token_price_url: Url,
    fx_url: Url,
    fallback_token_price: Decimal,
}

impl HttpRateSource {
    /// Builds a source with its own HTTP client.
    pub fn new(source: &SourceSettings, fallback: &FallbackSettings) -> RatesResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(source.request_timeout())
            .build()
            .map_err(|e| RatesError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Self::with_client(client, source, fallback)
    }

    /// Builds a source around an existing client.
    pub fn with_client(
        client: reqwest::Client,
        source: &SourceSettings,
        fallback: &FallbackSettings,
    ) -> RatesResult<Self> {
        let token_price_url = Url::parse_with_params(
            &source.token_price_url,
            &[("ids", source.token_id.as_str()), ("vs_currencies", "usd")],
        )?;
        let fx_url = Url::parse(&source.fx_url)?;

        Ok(HttpRateSource {
            client,
            token_id: source.token_id.clone(),
            token_price_url,
            fx_url,
            fallback_token_price: fallback.token_price_usdt,
        })
    }

    /// Builds the snapshot for one fetch.
    ///
    /// A missing token price falls back to the configured price; the live
    /// EUR rate is kept and the snapshot is marked stale.
    fn snapshot(
        &self,
        token_price: Option<Decimal>,
        eur_rate: Decimal,
        now: DateTime<Utc>,
    ) -> RatesResult<RateSnapshot> {
        match token_price {
            Some(price) => {
                debug!(token_price = %price, eur_rate = %eur_rate, "Fetched live rates");
                Ok(RateSnapshot::live(price, eur_rate, now)?)
            }
            None => {
                warn!(
                    token_id = %self.token_id,
                    fallback = %self.fallback_token_price,
                    "Token price missing from response, using fallback price"
                );
                Ok(RateSnapshot::live(self.fallback_token_price, eur_rate, now)?.into_stale())
            }
        }
    }

    async fn get_text(&self, url: &Url) -> RatesResult<String> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RatesError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self) -> RatesResult<RateSnapshot> {
        let (token_body, fx_body) = tokio::try_join!(
            self.get_text(&self.token_price_url),
            self.get_text(&self.fx_url)
        )?;

        let token_price = parse_token_price(&token_body, &self.token_id)?;
        let eur_rate = parse_eur_rate(&fx_body)?;

        self.snapshot(token_price, eur_rate, Utc::now())
    }

    fn name(&self) -> &str {
        "http"
    }
}

// =============================================================================
// Response Parsing
// =============================================================================

/// Reads `<token_id>.usd` from a CoinGecko `simple/price` body.
///
/// Returns `Ok(None)` when the token or its USD price is absent.
pub fn parse_token_price(body: &str, token_id: &str) -> RatesResult<Option<Decimal>> {
    let response: api::SimplePriceResponse = serde_json::from_str(body)?;

    Ok(response.get(token_id).and_then(|price| price.usd))
}

/// Reads `rates.EUR` from a USD-based FX body.
pub fn parse_eur_rate(body: &str) -> RatesResult<Decimal> {
    let response: api::FxResponse = serde_json::from_str(body)?;

    response
        .rates
        .get("EUR")
        .copied()
        .ok_or_else(|| RatesError::MissingField("rates.EUR".into()))
}

mod api {
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use std::collections::HashMap;

    /// `{"<coin id>": {"usd": 0.183}}`
    pub type SimplePriceResponse = HashMap<String, CoinPrice>;

    #[derive(Deserialize, Debug)]
    pub struct CoinPrice {
        #[serde(default)]
        pub usd: Option<Decimal>,
    }

    #[derive(Deserialize, Debug)]
    pub struct FxResponse {
        pub rates: HashMap<String, Decimal>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const COINGECKO_OK: &str = r#"{"reental":{"usd":0.1837}}"#;
    const COINGECKO_EMPTY: &str = r#"{}"#;
    const COINGECKO_NO_USD: &str = r#"{"reental":{}}"#;
    const FX_OK: &str = r#"{
        "provider": "https://www.exchangerate-api.com",
        "base": "USD",
        "date": "2024-05-01",
        "time_last_updated": 1714521601,
        "rates": {"USD": 1, "EUR": 0.935, "GBP": 0.8}
    }"#;

    #[test]
    fn test_parse_token_price() {
        assert_eq!(
            parse_token_price(COINGECKO_OK, "reental").unwrap(),
            Some(dec!(0.1837))
        );
        assert_eq!(parse_token_price(COINGECKO_EMPTY, "reental").unwrap(), None);
        assert_eq!(parse_token_price(COINGECKO_NO_USD, "reental").unwrap(), None);
        assert_eq!(parse_token_price(COINGECKO_OK, "bitcoin").unwrap(), None);
    }

    #[test]
    fn test_parse_token_price_bad_json() {
        assert!(matches!(
            parse_token_price("<html>rate limited</html>", "reental"),
            Err(RatesError::ParseFailed(_))
        ));
    }

    #[test]
    fn test_parse_eur_rate() {
        assert_eq!(parse_eur_rate(FX_OK).unwrap(), dec!(0.935));
        assert!(matches!(
            parse_eur_rate(r#"{"rates":{"GBP":0.8}}"#),
            Err(RatesError::MissingField(_))
        ));
        assert!(parse_eur_rate(r#"{"result":"error"}"#).is_err());
    }

    #[test]
    fn test_missing_token_price_keeps_live_eur_rate() {
        let source =
            HttpRateSource::new(&SourceSettings::default(), &FallbackSettings::default()).unwrap();
        let now = Utc::now();

        let live = source.snapshot(Some(dec!(0.19)), dec!(0.935), now).unwrap();
        assert!(!live.is_stale());

        let partial = source.snapshot(None, dec!(0.935), now).unwrap();
        assert!(partial.is_stale());
        assert_eq!(partial.token_price_usdt(), dec!(0.183));
        assert_eq!(partial.usdt_to_eur_rate(), dec!(0.935));
        assert_eq!(partial.fetched_at(), Some(now));
    }

    #[test]
    fn test_request_url_carries_token_query() {
        let source =
            HttpRateSource::new(&SourceSettings::default(), &FallbackSettings::default()).unwrap();

        assert_eq!(
            source.token_price_url.as_str(),
            "https://api.coingecko.com/api/v3/simple/price?ids=reental&vs_currencies=usd"
        );
        assert_eq!(source.name(), "http");
    }
}
