//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions with strict
//! cookie settings (SameSite=Strict, 12hr inactivity expiry).

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StaffConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "of_staff_session";

/// Session expiry time in seconds (12 hours, one shift plus overtime).
pub const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Create the session layer around `store`.
///
/// The store is built by [`crate::db::session_store`]; its table must exist
/// (see `of-cli migrate sessions`).
#[must_use]
pub fn create_session_layer(
    store: PostgresStore,
    config: &StaffConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
