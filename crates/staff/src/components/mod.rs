//! Reusable page components.

pub mod bottom_nav;
pub mod stat_card;

pub use bottom_nav::{NAV_ITEMS, NavItem};
pub use stat_card::{StatCard, StatCardTemplate, StatIcon, StatValue, Trend, TrendTone};
