//! Document rendering.
//!
//! Both renderers first assemble an ordered layout (sections of labelled rows
//! or paragraphs) as plain data, then hand it to a writer. The layout is the
//! contract; fonts and colours are writer detail.

pub mod letter;
pub mod workbook;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::UnderwriteError;
use crate::types::{round_money, Money};

/// "$1,234,567" (whole units, negative as "-$1,234").
pub fn format_currency(amount: Money) -> String {
    let rounded = round_money(amount);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let digits = rounded.abs().trunc().to_string();
    format!("{sign}${}", group_thousands(&digits))
}

/// "5.70%" from a percentage figure.
pub fn format_pct(pct: Decimal) -> String {
    format!("{:.2}%", pct.round_dp(2))
}

/// Thousands separators for a plain digit string.
pub fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

pub(crate) fn render_error(document: &str, e: impl std::fmt::Display) -> UnderwriteError {
    UnderwriteError::Render {
        document: document.into(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(450000)), "$450,000");
        assert_eq!(format_currency(dec!(2133.23)), "$2,133");
        assert_eq!(format_currency(dec!(-1234.5)), "-$1,235");
        assert_eq!(format_currency(dec!(999)), "$999");
        assert_eq!(format_currency(Decimal::ZERO), "$0");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(dec!(5.7)), "5.70%");
        assert_eq!(format_pct(dec!(0.04546)), "0.05%");
    }
}
