//! # Number Formatting
//!
//! Renders amounts the way the calculator shows them to Spanish-speaking
//! buyers.
//!
//! ```text
//! format_amount(dec!(183), 2)        → "183,00"
//! format_amount(dec!(1234.5), 2)     → "1234,50"     (4-digit integers stay ungrouped)
//! format_amount(dec!(28000), 0)      → "28.000"
//! format_amount(dec!(1234567.891), 2)→ "1.234.567,89"
//! format_rate(dec!(0.94), 4)         → "0.9400"
//! ```

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::DisplayCurrency;

const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';

/// Integer parts shorter than this are printed without grouping (es-ES).
const MIN_GROUPED_DIGITS: usize = 5;

/// Formats an amount with es-ES separators and `decimals` fraction digits.
///
/// Rounds half away from zero.
pub fn format_amount(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.*}", decimals as usize, rounded.abs());

    let (int_part, frac_part) = match plain.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (plain.as_str(), None),
    };

    let mut out = String::with_capacity(plain.len() + int_part.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac_part) = frac_part {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(frac_part);
    }
    out
}

/// Formats an amount prefixed with the currency symbol, e.g. `"€120,41"`.
pub fn format_money(value: Decimal, currency: DisplayCurrency) -> String {
    format!("{}{}", currency.symbol(), format_amount(value, 2))
}

/// Formats an exchange rate with a `.` decimal point and fixed digits.
pub fn format_rate(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimals as usize, rounded)
}

fn group_thousands(digits: &str) -> String {
    if digits.len() < MIN_GROUPED_DIGITS {
        return digits.to_string();
    }

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}
