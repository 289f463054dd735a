//! Formatter checks.
//!
//! Prints exactly what the staff panel renders for a value, so locale and
//! currency settings can be checked without starting the server.

use orderflow_core::{CurrencyCode, Locale, format_currency, format_date, format_date_time};

/// Print `amount` as currency.
#[allow(clippy::print_stdout)]
pub fn currency(amount: &str, currency: Option<CurrencyCode>, locale: Option<Locale>) {
    println!("{}", render_or_marker(format_currency(amount, currency, locale)));
}

/// Print `value` as a short date.
#[allow(clippy::print_stdout)]
pub fn date(value: &str, locale: Option<Locale>) {
    let formatted = match epoch_millis(value) {
        Some(millis) => format_date(millis, locale),
        None => format_date(value, locale),
    };
    println!("{}", render_or_marker(formatted));
}

/// Print `value` as a short date with hour and minute.
#[allow(clippy::print_stdout)]
pub fn date_time(value: &str, locale: Option<Locale>) {
    let formatted = match epoch_millis(value) {
        Some(millis) => format_date_time(millis, locale),
        None => format_date_time(value, locale),
    };
    println!("{}", render_or_marker(formatted));
}

/// Digits-only input is read as milliseconds since the epoch.
fn epoch_millis(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// The panel renders invalid input as nothing; make that visible.
fn render_or_marker(formatted: String) -> String {
    if formatted.is_empty() {
        "(empty: input is not valid)".to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_millis_only_for_digits() {
        assert_eq!(epoch_millis("1704465000000"), Some(1_704_465_000_000));
        assert_eq!(epoch_millis("2024-01-05"), None);
        assert_eq!(epoch_millis("-5"), None);
        assert_eq!(epoch_millis(""), None);
    }

    #[test]
    fn test_empty_output_is_marked() {
        assert_eq!(render_or_marker(String::new()), "(empty: input is not valid)");
        assert_eq!(render_or_marker("₹1.00".to_string()), "₹1.00");
    }
}
