//! Currency formatting.

use rust_decimal::prelude::*;

use super::locale::{Grouping, Locale};
use crate::types::CurrencyCode;

/// Fractional digits shown for every supported currency.
const FRACTION_DIGITS: u32 = 2;

/// A finite monetary amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    /// Fits in a `Decimal`.
    Exact(Decimal),
    /// Finite, but outside the range of `Decimal`.
    Float(f64),
}

/// A value that may describe a finite monetary amount.
///
/// Backend payloads carry amounts as JSON numbers or decimal strings, so both
/// are accepted. Anything that is not a finite number yields `None`.
pub trait ToAmount {
    /// Convert to an [`Amount`], or `None` when not a finite number.
    fn to_amount(&self) -> Option<Amount>;
}

impl ToAmount for Decimal {
    fn to_amount(&self) -> Option<Amount> {
        Some(Amount::Exact(*self))
    }
}

impl ToAmount for f64 {
    /// Floats go through their shortest decimal form, so `1.005` is the
    /// decimal `1.005` and not the binary value just below it.
    fn to_amount(&self) -> Option<Amount> {
        if !self.is_finite() {
            return None;
        }
        Some(
            Decimal::from_str(&self.to_string())
                .map_or(Amount::Float(*self), Amount::Exact),
        )
    }
}

impl ToAmount for f32 {
    fn to_amount(&self) -> Option<Amount> {
        if !self.is_finite() {
            return None;
        }
        Decimal::from_str(&self.to_string())
            .map_or_else(|_| f64::from(*self).to_amount(), |d| Some(Amount::Exact(d)))
    }
}

impl ToAmount for i64 {
    fn to_amount(&self) -> Option<Amount> {
        Some(Amount::Exact(Decimal::from(*self)))
    }
}

impl ToAmount for i32 {
    fn to_amount(&self) -> Option<Amount> {
        Some(Amount::Exact(Decimal::from(*self)))
    }
}

impl ToAmount for u64 {
    fn to_amount(&self) -> Option<Amount> {
        Some(Amount::Exact(Decimal::from(*self)))
    }
}

impl ToAmount for u32 {
    fn to_amount(&self) -> Option<Amount> {
        Some(Amount::Exact(Decimal::from(*self)))
    }
}

impl ToAmount for str {
    fn to_amount(&self) -> Option<Amount> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return None;
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
            .map(Amount::Exact)
            .or_else(|| trimmed.parse::<f64>().ok()?.to_amount())
    }
}

impl ToAmount for String {
    fn to_amount(&self) -> Option<Amount> {
        self.as_str().to_amount()
    }
}

impl ToAmount for serde_json::Value {
    fn to_amount(&self) -> Option<Amount> {
        match self {
            Self::Number(n) => n.to_string().to_amount(),
            Self::String(s) => s.to_amount(),
            _ => None,
        }
    }
}

impl<T: ToAmount> ToAmount for Option<T> {
    fn to_amount(&self) -> Option<Amount> {
        self.as_ref()?.to_amount()
    }
}

impl<T: ToAmount + ?Sized> ToAmount for &T {
    fn to_amount(&self) -> Option<Amount> {
        (**self).to_amount()
    }
}

/// Format `amount` as a currency string.
///
/// Defaults to Indian Rupees in the `en-IN` locale. The amount is rounded
/// half away from zero to two fractional digits. Returns an empty string
/// when `amount` is not a finite number.
///
/// ```
/// use orderflow_core::{CurrencyCode, Locale, format_currency};
///
/// assert_eq!(format_currency(1234.5, None, None), "₹1,234.50");
/// assert_eq!(format_currency(123456.78, None, None), "₹1,23,456.78");
/// assert_eq!(
///     format_currency("123456.78", Some(CurrencyCode::USD), Some(Locale::EnUs)),
///     "$123,456.78"
/// );
/// assert_eq!(format_currency("abc", None, None), "");
/// ```
#[must_use]
pub fn format_currency<A: ToAmount>(
    amount: A,
    currency: Option<CurrencyCode>,
    locale: Option<Locale>,
) -> String {
    let (negative, digits) = match amount.to_amount() {
        Some(Amount::Exact(value)) => exact_digits(value),
        Some(Amount::Float(value)) => float_digits(value),
        None => return String::new(),
    };
    let currency = currency.unwrap_or_default();
    let locale = locale.unwrap_or_default();

    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!(
        "{sign}{symbol}{integer}.{fraction}",
        sign = if negative { "-" } else { "" },
        symbol = currency.symbol(),
        integer = group_digits(integer, locale.grouping()),
    )
}

/// Sign and unsigned `integer.fraction` digits of a decimal amount.
fn exact_digits(value: Decimal) -> (bool, String) {
    let mut rounded =
        value.round_dp_with_strategy(FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);
    rounded.rescale(FRACTION_DIGITS);
    (negative, rounded.to_string())
}

/// Sign and unsigned digits of a float too large for `Decimal`.
fn float_digits(value: f64) -> (bool, String) {
    let digits = format!("{:.2}", value.abs());
    let negative = value.is_sign_negative() && digits.bytes().any(|b| matches!(b, b'1'..=b'9'));
    (negative, digits)
}

/// Insert group separators into a run of ASCII digits.
fn group_digits(digits: &str, grouping: Grouping) -> String {
    let mut reversed = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in digits.chars().rev().enumerate() {
        let boundary = match grouping {
            Grouping::Thousands => i > 0 && i % 3 == 0,
            Grouping::Indian => i == 3 || (i > 3 && (i - 3) % 2 == 0),
        };
        if boundary {
            reversed.push(',');
        }
        reversed.push(ch);
    }
    reversed.chars().rev().collect()
}
