//! Database access for the staff panel.
//!
//! # Database: session storage only
//!
//! The staff panel keeps no business data; orders, menus and analytics all
//! live behind the Orderflow backend API. `PostgreSQL` only backs the
//! `tower-sessions` store in the `staff` schema.
//!
//! # Migrations
//!
//! The session table is created by the store's own migration, run via:
//! ```bash
//! cargo run -p orderflow-cli -- migrate sessions
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

/// Schema holding the session table.
pub const SESSION_SCHEMA: &str = "staff";

/// Session table name.
pub const SESSION_TABLE: &str = "session";

/// Errors from session store setup.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Schema or table name rejected by the store.
    #[error("invalid session store name: {0}")]
    InvalidName(String),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Build the session store in `staff.session`.
///
/// # Errors
///
/// Returns `SessionStoreError::InvalidName` if the store rejects the
/// schema or table name.
pub fn session_store(pool: &PgPool) -> Result<PostgresStore, SessionStoreError> {
    PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .map_err(SessionStoreError::InvalidName)?
        .with_table_name(SESSION_TABLE)
        .map_err(SessionStoreError::InvalidName)
}

/// Create the session schema and table if they do not exist.
///
/// # Errors
///
/// Returns an error if the store cannot be built or the migration fails.
pub async fn migrate_sessions(pool: &PgPool) -> Result<(), SessionStoreError> {
    session_store(pool)?.migrate().await?;
    Ok(())
}
