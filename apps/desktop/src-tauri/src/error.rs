//! # API Error Type
//!
//! Unified error type for calculator commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Calculator                         │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ───────                     ────────────                               │
//! │                                                                         │
//! │  invoke('calculate')                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Rates loading? ──── RATES_LOADING ────────────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Bad input? ─── ValidationErrors ── fields[] ─── ApiError ─────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await invoke('calculate')                                            │
//! │  } catch (e) {                                                          │
//! │    // e.code = "VALIDATION_ERROR"                                       │
//! │    // e.fields = [{ field: "purchaseQuantity", code: "...", ... }]      │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use reentel_core::{CoreError, FieldError, ValidationErrors};
use reentel_rates::RatesError;
use serde::Serialize;
use ts_rs::TS;

use crate::export::ExportError;

/// API error returned from calculator commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Invalid RNT quantity '0': enter a number greater than 0",
///   "fields": [{ "field": "purchaseQuantity", "code": "INVALID_PURCHASE_QUANTITY", "message": "..." }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// One entry per offending form field (validation errors only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// One or more form fields are invalid
    ValidationError,

    /// No rate snapshot has been produced yet
    RatesLoading,

    /// Export requested before a successful calculation
    NotCalculated,

    /// Clipboard or renderer failed
    ExportFailed,

    /// Invalid configuration
    ConfigError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Wire name, as serialized to the frontend.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::RatesLoading => "RATES_LOADING",
            ErrorCode::NotCalculated => "NOT_CALCULATED",
            ErrorCode::ExportFailed => "EXPORT_FAILED",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn rates_loading() -> Self {
        ApiError::new(
            ErrorCode::RatesLoading,
            "Exchange rates are still loading, try again in a moment",
        )
    }

    pub fn not_calculated() -> Self {
        ApiError::new(
            ErrorCode::NotCalculated,
            "Calculate a price before exporting",
        )
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ConfigError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts a failed submission into a single error carrying every field.
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields: Vec<FieldError> = errors.iter().map(FieldError::from).collect();
        let message = fields
            .first()
            .map(|f| f.message.clone())
            .unwrap_or_else(|| "Validation failed".to_string());

        ApiError {
            code: ErrorCode::ValidationError,
            message,
            fields,
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => ApiError::from(errors),
            CoreError::InvalidRules { .. } => ApiError::config(err.to_string()),
            CoreError::InvalidRate { .. } => ApiError::internal(err.to_string()),
        }
    }
}

/// Converts rate service errors to API errors.
impl From<RatesError> for ApiError {
    fn from(err: RatesError) -> Self {
        if err.is_config_error() {
            ApiError::config(err.to_string())
        } else {
            ApiError::internal(err.to_string())
        }
    }
}

/// Converts export failures to API errors.
impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::new(ErrorCode::ExportFailed, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
