//! Core types for Orderflow.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod currency;
pub mod id;
pub mod role;

pub use currency::{CurrencyCode, UnknownCurrency};
pub use id::*;
pub use role::{Capability, Role};
