//! # Platform Export Backends
//!
//! Desktop implementations of the export seams in [`crate::export`].
//!
//! ```text
//! copy_wallet_address ──► SystemClipboard ──► arboard (OS clipboard)
//! export_result(pdf)  ──► PdfCardRenderer ──► printpdf (A5 card, Helvetica)
//! export_result(png)  ──► rejected: raster cards are captured by the webview
//! ```

use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::debug;

use crate::export::{Clipboard, ExportError, ExportFormat, ExportPayload, ResultRenderer};

// =============================================================================
// Clipboard
// =============================================================================

/// The OS clipboard.
///
/// A handle is opened per copy; the OS keeps the text after it is dropped.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ExportError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ExportError::Clipboard(e.to_string()))
    }
}

// =============================================================================
// PDF Renderer
// =============================================================================

const PAGE_WIDTH_MM: f32 = 148.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 15.0;
const VALUE_COLUMN_MM: f32 = 75.0;
const LINE_HEIGHT_MM: f32 = 8.0;

/// Lays the result card out on an A5 page.
#[derive(Debug, Default)]
pub struct PdfCardRenderer;

impl ResultRenderer for PdfCardRenderer {
    fn render(&self, payload: &ExportPayload, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        if format != ExportFormat::Pdf {
            return Err(ExportError::Render {
                format,
                reason: "raster cards are captured by the webview".to_string(),
            });
        }

        render_pdf(payload).map_err(|e| ExportError::Render {
            format,
            reason: e.to_string(),
        })
    }
}

fn render_pdf(payload: &ExportPayload) -> Result<Vec<u8>, printpdf::Error> {
    let (doc, page, layer) = PdfDocument::new(
        "Reentel price",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Card",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut y = PAGE_HEIGHT_MM - 25.0;
    layer.use_text(
        format!("{} status", payload.status_tier.label()),
        20.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font_bold,
    );
    y -= 2.0 * LINE_HEIGHT_MM;

    let lines = payload.lines();
    debug!(lines = lines.len(), "Rendering PDF card");
    for (label, value) in lines {
        layer.use_text(label, 11.0, Mm(MARGIN_MM), Mm(y), &font);
        layer.use_text(value, 11.0, Mm(VALUE_COLUMN_MM), Mm(y), &font_bold);
        y -= LINE_HEIGHT_MM;
    }

    layer.use_text(
        format!(
            "Generated {}",
            payload.generated_at.format("%Y-%m-%d %H:%M UTC")
        ),
        8.0,
        Mm(MARGIN_MM),
        Mm(MARGIN_MM),
        &font,
    );

    doc.save_to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reentel_core::{PaymentMethod, PricingEngine, RateSnapshot, StatusTier, ValidatedInput};
    use rust_decimal_macros::dec;

    fn payload() -> ExportPayload {
        let input = ValidatedInput {
            current_balance: Some(dec!(8000)),
            tier: StatusTier::SuperReentel,
            purchase_quantity: dec!(1000),
            payment_method: PaymentMethod::Usdt,
        };
        let rates = RateSnapshot::fallback();
        let result = PricingEngine::default().compute_result(&input, &rates);
        ExportPayload::build(
            &input,
            &rates,
            &result,
            "0xabc",
            2,
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_pdf_card() {
        let bytes = PdfCardRenderer.render(&payload(), ExportFormat::Pdf).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_raster_formats_are_rejected() {
        let err = PdfCardRenderer
            .render(&payload(), ExportFormat::Png)
            .unwrap_err();

        assert!(matches!(
            err,
            ExportError::Render {
                format: ExportFormat::Png,
                ..
            }
        ));
    }
}
