//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use orderflow_core::{Locale, format_date, format_date_time};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Short date, e.g. `05 Jan, 2024`.
///
/// Usage in templates: `{{ joined|short_date(shell.scope.locale) }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn short_date(
    value: impl Display,
    _env: &dyn askama::Values,
    locale: &Locale,
) -> askama::Result<String> {
    Ok(format_date(value.to_string(), Some(*locale)))
}

/// Short date with hour and minute, e.g. `05 Jan, 2024, 02:30 pm`.
///
/// Usage in templates: `{{ seen|short_datetime(shell.scope.locale) }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn short_datetime(
    value: impl Display,
    _env: &dyn askama::Values,
    locale: &Locale,
) -> askama::Result<String> {
    Ok(format_date_time(value.to_string(), Some(*locale)))
}
