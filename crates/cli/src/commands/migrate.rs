//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! of-cli migrate sessions
//! ```
//!
//! # Environment Variables
//!
//! - `STAFF_DATABASE_URL` - `PostgreSQL` connection string for the staff
//!   panel (falls back to `DATABASE_URL`)

use orderflow_staff::db::{self, SESSION_SCHEMA, SESSION_TABLE, SessionStoreError};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session store migration failed.
    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),
}

/// Read the staff database URL, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, MigrationError> {
    std::env::var("STAFF_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("STAFF_DATABASE_URL"))
}

/// Create the session schema and table used by the staff panel.
///
/// # Errors
///
/// Returns an error if the URL is missing, the database is unreachable,
/// or the store's migration fails.
pub async fn sessions() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    tracing::info!("Connecting to staff database...");
    let pool = db::create_pool(&database_url()?).await?;

    tracing::info!(
        schema = SESSION_SCHEMA,
        table = SESSION_TABLE,
        "Running session store migration..."
    );
    db::migrate_sessions(&pool).await?;

    tracing::info!("Session store migration complete!");
    Ok(())
}
