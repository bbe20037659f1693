//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a decimal price for display, trimming trailing zeros.
///
/// Usage in templates: `{{ service.price|money }} ₽`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_money(&value.to_string()))
}

/// Trim trailing fraction zeros from a decimal string.
///
/// Non-numeric input passes through untouched.
fn format_money(raw: &str) -> String {
    raw.parse::<Decimal>()
        .map_or_else(|_| raw.to_owned(), |d| d.normalize().to_string())
}

#[cfg(test)]
mod tests {
    use super::format_money;

    #[test]
    fn test_format_money_trims_zeros() {
        assert_eq!(format_money("1500.00"), "1500");
        assert_eq!(format_money("900.50"), "900.5");
        assert_eq!(format_money("0"), "0");
    }

    #[test]
    fn test_format_money_passes_through_garbage() {
        assert_eq!(format_money("free"), "free");
    }
}
