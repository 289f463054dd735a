//! HTTP middleware and extractors for the staff panel.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Route protection is done per handler with the [`RequireStaff`] extractor.

pub mod auth;
pub mod session;

pub use auth::{RequireStaff, StaffContext, StaffRejection};
pub use session::create_session_layer;
