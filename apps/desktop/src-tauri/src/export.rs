//! # Result Export
//!
//! Seams for the two outward actions on a result: copying the payment wallet
//! and saving the result card as an image or PDF.
//!
//! ```text
//! CalculatorState::Calculated
//!          │
//!          ▼
//!   ExportPayload::build ──► ResultRenderer::render(payload, Png|Jpeg|Pdf)
//!                                       │
//!                                       ▼
//!                                 ExportedFile { file_name, mime_type, bytes }
//! ```
//!
//! This module decides what goes on the card; the desktop backends live in
//! [`crate::platform`].

use chrono::{DateTime, Utc};
use reentel_core::format::{format_amount, format_money, format_rate};
use reentel_core::{
    CalculationResult, DisplayCurrency, PaymentMethod, RateSnapshot, StatusTier, ValidatedInput,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

/// Failures of the clipboard or the renderer.
///
/// Always transient: the calculator state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Rendering {format} failed: {reason}")]
    Render { format: ExportFormat, reason: String },

    #[error("Renderer produced an empty {0} file")]
    EmptyOutput(ExportFormat),
}

// =============================================================================
// Export Format
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Pdf => "PDF",
        })
    }
}

// =============================================================================
// Payload
// =============================================================================

/// Display-ready contents of the result card.
///
/// Every amount is already formatted (es-ES separators), so a renderer only
/// lays out strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub current_balance: String,
    pub purchase_quantity: String,
    pub status_tier: StatusTier,
    pub payment_method: String,
    pub discount_percent: u8,
    /// RNT price, 3 decimals.
    pub token_price: String,
    /// USDT→EUR rate, 4 decimals.
    pub eur_rate: String,
    pub rates_stale: bool,
    pub base_price: String,
    pub final_price: String,
    pub savings: String,
    /// "≈ €" hint, present only for USDT payments.
    pub eur_equivalent: Option<String>,
    /// Present only for on-chain payment methods.
    pub wallet_address: Option<String>,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

impl ExportPayload {
    /// Builds the card for a calculated result.
    ///
    /// `amount_decimals` applies to the balance and quantity; prices always
    /// show cents.
    pub fn build(
        input: &ValidatedInput,
        rates: &RateSnapshot,
        result: &CalculationResult,
        wallet_address: &str,
        amount_decimals: u32,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let currency = result.display_currency;
        let eur_equivalent = (input.payment_method == PaymentMethod::Usdt)
            .then(|| format_money(result.eur_equivalent, DisplayCurrency::Eur));
        let wallet_address = input
            .payment_method
            .is_on_chain()
            .then(|| wallet_address.to_string());

        ExportPayload {
            current_balance: format_amount(
                input.current_balance.unwrap_or_default(),
                amount_decimals,
            ),
            purchase_quantity: format_amount(input.purchase_quantity, amount_decimals),
            status_tier: input.tier,
            payment_method: input.payment_method.label().to_string(),
            discount_percent: result.discount_percent,
            token_price: format!("${}", format_rate(rates.token_price_usdt(), 3)),
            eur_rate: format_rate(rates.usdt_to_eur_rate(), 4),
            rates_stale: rates.is_stale(),
            base_price: format_money(result.base_price, DisplayCurrency::Usdt),
            final_price: format_money(result.final_price_in_display_currency, currency),
            savings: format_money(result.savings, currency),
            eur_equivalent,
            wallet_address,
            generated_at,
        }
    }

    /// Label and value rows in card order.
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        let token_price = if self.rates_stale {
            format!("{} (fallback)", self.token_price)
        } else {
            self.token_price.clone()
        };

        let mut lines = vec![
            ("xRNT balance", self.current_balance.clone()),
            ("RNT to buy", self.purchase_quantity.clone()),
            ("Payment method", self.payment_method.clone()),
            ("Discount", format!("{}%", self.discount_percent)),
            ("RNT price", token_price),
            ("USDT/EUR", self.eur_rate.clone()),
            ("Base price", self.base_price.clone()),
            ("Final price", self.final_price.clone()),
            ("Savings", self.savings.clone()),
        ];
        if let Some(eur) = &self.eur_equivalent {
            lines.push(("In euros", format!("≈ {}", eur)));
        }
        if let Some(wallet) = &self.wallet_address {
            lines.push(("Pay to", wallet.clone()));
        }
        lines
    }

    /// `reentel-<tier>-<yyyymmdd-hhmmss>.<ext>`
    pub fn file_name(&self, format: ExportFormat) -> String {
        format!(
            "reentel-{}-{}.{}",
            self.status_tier.label().to_lowercase(),
            self.generated_at.format("%Y%m%d-%H%M%S"),
            format.extension()
        )
    }
}

/// A rendered result card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Host Seams
// =============================================================================

/// System clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ExportError>;
}

/// Turns a payload into image or PDF bytes.
pub trait ResultRenderer: Send + Sync {
    fn render(&self, payload: &ExportPayload, format: ExportFormat) -> Result<Vec<u8>, ExportError>;
}

/// Renders `payload` and names the file.
pub fn render_export(
    renderer: &dyn ResultRenderer,
    payload: &ExportPayload,
    format: ExportFormat,
) -> Result<ExportedFile, ExportError> {
    let bytes = renderer.render(payload, format)?;
    if bytes.is_empty() {
        return Err(ExportError::EmptyOutput(format));
    }

    Ok(ExportedFile {
        file_name: payload.file_name(format),
        mime_type: format.mime_type().to_string(),
        bytes,
    })
}
