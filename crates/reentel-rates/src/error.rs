//! # Rate Error Types
//!
//! Error types for fetching and publishing exchange rates.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Rate Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Response            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  RequestFailed  │  │  ParseFailed            │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  MissingField           │ │
//! │  │  ConfigLoad...  │  │  HttpStatus     │  │  InvalidRate            │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  None of these reach the pricing engine: the service logs them and     │
//! │  publishes the fallback snapshot instead.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for rate operations.
pub type RatesResult<T> = Result<T, RatesError>;

/// Everything that can go wrong while loading config or fetching rates.
#[derive(Debug, Error)]
pub enum RatesError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid rates configuration.
    #[error("Invalid rates configuration: {0}")]
    InvalidConfig(String),

    /// A feed URL is malformed or not http(s).
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request could not be sent or the connection dropped.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The feed did not answer within the request timeout.
    #[error("Request timed out")]
    Timeout,

    /// The feed answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// Body is not the JSON shape we expect.
    #[error("Failed to parse response: {0}")]
    ParseFailed(String),

    /// A required field is absent from an otherwise valid response.
    #[error("Response is missing {0}")]
    MissingField(String),

    /// The feed returned a rate the core rejects (zero or negative).
    #[error("Rejected rate: {0}")]
    InvalidRate(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Service is shutting down.
    #[error("Rate service is shutting down")]
    ShuttingDown,

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for RatesError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RatesError::Timeout
        } else if err.is_decode() {
            RatesError::ParseFailed(err.to_string())
        } else if let Some(status) = err.status() {
            RatesError::HttpStatus {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                status: status.as_u16(),
            }
        } else {
            RatesError::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RatesError {
    fn from(err: serde_json::Error) -> Self {
        RatesError::ParseFailed(err.to_string())
    }
}

impl From<url::ParseError> for RatesError {
    fn from(err: url::ParseError) -> Self {
        RatesError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for RatesError {
    fn from(err: std::io::Error) -> Self {
        RatesError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for RatesError {
    fn from(err: toml::de::Error) -> Self {
        RatesError::ConfigLoadFailed(err.to_string())
    }
}

impl From<reentel_core::CoreError> for RatesError {
    fn from(err: reentel_core::CoreError) -> Self {
        RatesError::InvalidRate(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl RatesError {
    /// Returns true if the next scheduled fetch may succeed without any change.
    ///
    /// ## Retryable Errors
    /// - Connection failures (network issues)
    /// - Timeouts
    /// - Server-side (5xx) and rate-limit (429) responses
    ///
    /// ## Non-Retryable Errors
    /// - Configuration errors
    /// - Response shape changes
    pub fn is_retryable(&self) -> bool {
        match self {
            RatesError::RequestFailed(_) | RatesError::Timeout => true,
            RatesError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RatesError::InvalidConfig(_) | RatesError::InvalidUrl(_) | RatesError::ConfigLoadFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(RatesError::RequestFailed("dns".into()).is_retryable());
        assert!(RatesError::Timeout.is_retryable());
        assert!(RatesError::HttpStatus {
            url: "https://api.coingecko.com".into(),
            status: 429
        }
        .is_retryable());
        assert!(RatesError::HttpStatus {
            url: "https://api.coingecko.com".into(),
            status: 503
        }
        .is_retryable());

        assert!(!RatesError::HttpStatus {
            url: "https://api.coingecko.com".into(),
            status: 404
        }
        .is_retryable());
        assert!(!RatesError::MissingField("rates.EUR".into()).is_retryable());
        assert!(!RatesError::InvalidConfig("bad".into()).is_retryable());
    }

    #[test]
    fn test_config_errors() {
        assert!(RatesError::InvalidUrl("ftp://x".into()).is_config_error());
        assert!(!RatesError::Timeout.is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = RatesError::HttpStatus {
            url: "https://api.exchangerate-api.com/v4/latest/USD".into(),
            status: 502,
        };
        assert_eq!(
            err.to_string(),
            "https://api.exchangerate-api.com/v4/latest/USD returned HTTP 502"
        );
    }
}
