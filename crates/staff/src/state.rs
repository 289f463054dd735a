//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::auth::{AuthRegistry, AuthService};
use crate::backend::{BackendClient, BackendError};
use crate::config::StaffConfig;
use crate::middleware::session::SESSION_EXPIRY_SECONDS;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the session database pool and the auth service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StaffConfig,
    pool: PgPool,
    auth: AuthService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StaffConfig, pool: PgPool) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let registry = AuthRegistry::new(Duration::from_secs(SESSION_EXPIRY_SECONDS.unsigned_abs()));
        let auth = AuthService::new(backend, registry);

        Ok(Self {
            inner: Arc::new(AppStateInner { config, pool, auth }),
        })
    }

    /// Get a reference to the staff panel configuration.
    #[must_use]
    pub fn config(&self) -> &StaffConfig {
        &self.inner.config
    }

    /// Get a reference to the session database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        self.inner.auth.backend()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::shell::tests::test_config;

    /// State whose pool never connects and whose backend is unreachable.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn test_state() -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/orderflow_staff_test")
            .unwrap();
        AppState::new(test_config(), pool).unwrap()
    }
}
