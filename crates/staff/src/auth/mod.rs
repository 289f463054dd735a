//! Staff authentication.
//!
//! # Architecture
//!
//! - [`AuthStore`] - per-session `watch` channel holding the [`AuthSnapshot`]
//! - [`AuthRegistry`] - `moka` cache of live stores keyed by session
//! - [`AuthService`] - login, logout, restore and refresh against the backend
//!
//! Pages and guard streams depend only on [`SnapshotProvider`]; the service
//! is the single writer.

pub mod registry;
pub mod service;
pub mod store;

pub use registry::AuthRegistry;
pub use service::{AuthError, AuthService};
pub use store::{AuthSnapshot, AuthStore, SnapshotProvider, TokenRotation};
