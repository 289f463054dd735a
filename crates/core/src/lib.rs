//! Orderflow Core - Shared types and formatting.
//!
//! This crate provides the pieces used by every Orderflow Rust component:
//! - `staff` - Staff panel (guarded dashboard for staff and owners)
//! - `cli` - Command-line tools for migrations and formatter checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, roles with capability sets, currency codes
//! - [`format`] - Locale-aware currency and date formatting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod format;
pub mod types;

pub use format::{Locale, format_currency, format_date, format_date_time};
pub use types::*;
