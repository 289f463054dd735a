//! Locale-aware display formatting.
//!
//! Every formatter here is total: input that does not describe a finite
//! amount or a real calendar date yields an empty string, never a panic or
//! an error.
//!
//! ```
//! use orderflow_core::format::{format_currency, format_date, format_date_time};
//!
//! assert_eq!(format_currency(1000.0, None, None), "₹1,000.00");
//! assert_eq!(format_currency(f64::NAN, None, None), "");
//! assert_eq!(format_date("2024-01-05", None), "05 Jan, 2024");
//! assert_eq!(format_date_time("2024-01-05T14:30:00+05:30", None), "05 Jan, 2024, 02:30 pm");
//! ```

mod currency;
mod date;
mod locale;

pub use currency::{Amount, ToAmount, format_currency};
pub use date::{ToDateTime, format_date, format_date_time};
pub use locale::{Locale, UnknownLocale};
