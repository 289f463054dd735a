//! Date and date-time formatting.
//!
//! Values are shown in the wall-clock time they carry: an offset timestamp
//! such as `2024-01-05T14:30:00+05:30` displays as 02:30 pm, and naive
//! values are taken as-is. Epoch milliseconds are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

use super::locale::Locale;

/// Patterns tried, in order, for text without an offset.
const NAIVE_DATE_TIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A value that may resolve to a calendar date and time.
pub trait ToDateTime {
    /// Resolve to a wall-clock date-time, or `None` when not a valid date.
    fn to_date_time(&self) -> Option<NaiveDateTime>;
}

impl ToDateTime for str {
    fn to_date_time(&self) -> Option<NaiveDateTime> {
        let text = self.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(parsed.naive_local());
        }

        NAIVE_DATE_TIME_PATTERNS
            .iter()
            .find_map(|pattern| NaiveDateTime::parse_from_str(text, pattern).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()?
                    .and_hms_opt(0, 0, 0)
            })
    }
}

impl ToDateTime for String {
    fn to_date_time(&self) -> Option<NaiveDateTime> {
        self.as_str().to_date_time()
    }
}

/// Milliseconds since the Unix epoch.
impl ToDateTime for i64 {
    fn to_date_time(&self) -> Option<NaiveDateTime> {
        DateTime::from_timestamp_millis(*self).map(|dt| dt.naive_utc())
    }
}

/// Milliseconds since the Unix epoch; fractional milliseconds are dropped.
impl ToDateTime for f64 {
    #[allow(clippy::cast_possible_truncation)] // range-checked just above
    fn to_date_time(&self) -> Option<NaiveDateTime> {
        if !self.is_finite() || self.abs() > 8.64e15 {
            return None;
        }
        (self.trunc() as i64).to_date_time()
    }
}

impl ToDateTime for NaiveDate {
    fn to_date_time(&self) -> Option<NaiveDateTime> {
        self.and_hms_opt(0, 0, 0)
    }
}

impl ToDateTime for NaiveDateTime {
    fn to_date_time(&self) -> Option<NaiveDateTime> {
        Some(*self)
    }
}

impl<Tz: TimeZone> ToDateTime for DateTime<Tz> {
    fn to_date_time(&self) -> Option<NaiveDateTime> {
        Some(self.naive_local())
    }
}

impl ToDateTime for serde_json::Value {
    fn to_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Self::String(s) => s.to_date_time(),
            Self::Number(n) => n
                .as_i64()
                .map_or_else(|| n.as_f64()?.to_date_time(), |ms| ms.to_date_time()),
            _ => None,
        }
    }
}

impl<T: ToDateTime> ToDateTime for Option<T> {
    fn to_date_time(&self) -> Option<NaiveDateTime> {
        self.as_ref()?.to_date_time()
    }
}

impl<T: ToDateTime + ?Sized> ToDateTime for &T {
    fn to_date_time(&self) -> Option<NaiveDateTime> {
        (**self).to_date_time()
    }
}

/// Format `value` as a short date (`05 Jan, 2024` in `en-IN`).
///
/// Returns an empty string when `value` does not resolve to a valid date.
///
/// ```
/// use orderflow_core::{Locale, format_date};
///
/// assert_eq!(format_date("2024-01-05", None), "05 Jan, 2024");
/// assert_eq!(format_date("2024-01-05", Some(Locale::EnUs)), "Jan 05, 2024");
/// assert_eq!(format_date("2024-02-30", None), "");
/// ```
#[must_use]
pub fn format_date<T: ToDateTime>(value: T, locale: Option<Locale>) -> String {
    let locale = locale.unwrap_or_default();
    value
        .to_date_time()
        .map(|dt| dt.format(locale.date_pattern()).to_string())
        .unwrap_or_default()
}

/// Format `value` as a short date followed by hour and minute.
///
/// The output always starts with what [`format_date`] returns for the same
/// value. Returns an empty string when `value` does not resolve to a valid
/// date.
///
/// ```
/// use orderflow_core::{Locale, format_date_time};
///
/// assert_eq!(format_date_time("2024-01-05 09:05", None), "05 Jan, 2024, 09:05 am");
/// assert_eq!(format_date_time("2024-01-05 21:05", Some(Locale::EnGb)), "05 Jan 2024, 21:05");
/// ```
#[must_use]
pub fn format_date_time<T: ToDateTime>(value: T, locale: Option<Locale>) -> String {
    let locale = locale.unwrap_or_default();
    value
        .to_date_time()
        .map(|dt| {
            format!(
                "{}, {}",
                dt.format(locale.date_pattern()),
                dt.format(locale.time_pattern())
            )
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    #[test]
    fn test_date_only_text() {
        assert_eq!(format_date("2024-01-05", None), "05 Jan, 2024");
        assert_eq!(format_date(" 2024-12-31 ", None), "31 Dec, 2024");
    }

    #[test]
    fn test_invalid_text_is_empty() {
        assert_eq!(format_date("not-a-date", None), "");
        assert_eq!(format_date("", None), "");
        assert_eq!(format_date_time("not-a-date", None), "");
        assert_eq!(format_date_time("2024-13-01", None), "");
    }

    #[test]
    fn test_offset_text_keeps_wall_clock() {
        assert_eq!(
            format_date_time("2024-01-05T23:45:10.123456+05:30", None),
            "05 Jan, 2024, 11:45 pm"
        );
        assert_eq!(format_date_time("2024-01-05T00:15:00Z", None), "05 Jan, 2024, 12:15 am");
    }

    #[test]
    fn test_date_time_extends_date() {
        for input in ["2024-01-05", "2024-07-19T18:02:00+05:30", "2023-03-01 07:30:00"] {
            let date = format_date(input, None);
            let date_time = format_date_time(input, None);
            assert!(!date.is_empty());
            assert!(date_time.starts_with(&date), "{date_time} should start with {date}");
            assert!(date_time.len() > date.len());
        }
    }

    #[test]
    fn test_epoch_millis() {
        // 2024-01-05T10:00:00Z
        assert_eq!(format_date_time(1_704_448_800_000_i64, None), "05 Jan, 2024, 10:00 am");
        assert_eq!(format_date(1_704_448_800_000.9_f64, None), "05 Jan, 2024");
        assert_eq!(format_date(f64::NAN, None), "");
        assert_eq!(format_date(i64::MAX, None), "");
    }

    #[test]
    fn test_chrono_values() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 5, 13, 0, 0).single();
        assert_eq!(format_date_time(utc, None), "05 Jan, 2024, 01:00 pm");

        let ist = FixedOffset::east_opt(19_800)
            .and_then(|tz| tz.with_ymd_and_hms(2024, 1, 5, 13, 0, 0).single());
        assert_eq!(format_date_time(ist, Some(Locale::EnGb)), "05 Jan 2024, 13:00");

        assert_eq!(format_date(None::<NaiveDate>, None), "");
    }

    #[test]
    fn test_json_values() {
        assert_eq!(format_date(serde_json::json!("2024-01-05"), None), "05 Jan, 2024");
        assert_eq!(format_date(serde_json::json!(1_704_448_800_000_i64), None), "05 Jan, 2024");
        assert_eq!(format_date(serde_json::json!({"date": "2024-01-05"}), None), "");
    }
}
