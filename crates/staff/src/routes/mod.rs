//! HTTP route handlers for the staff panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//!
//! # Auth (email/password against the Orderflow backend)
//! GET  /login                  - Login page
//! POST /login                  - Sign in
//! POST /logout                 - Sign out
//!
//! # Staff (guarded)
//! GET  /staff                  - Dashboard with today's stats
//! GET  /staff/profile          - Profile
//! GET  /staff/guard/events     - Guard event stream (SSE)
//!
//! # API (guarded, status codes instead of redirects)
//! GET  /api/staff/me           - Signed-in staff member
//! ```
//!
//! `/health`, `/health/ready` and `/static` are mounted in `main.rs`.

use axum::Router;

use crate::state::AppState;

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod guard;
pub mod home;
pub mod profile;

/// Build the staff panel router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(home::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(profile::router())
        .merge(guard::router())
        .merge(api::router())
}
