//! Live auth stores, one per browser session.

use std::time::Duration;

use moka::future::Cache;

use super::store::AuthStore;
use crate::models::AuthKey;

/// Upper bound on concurrently tracked sessions.
const MAX_SESSIONS: u64 = 10_000;

/// In-memory registry of [`AuthStore`]s keyed by the session's [`AuthKey`].
///
/// Entries idle out with the session itself; a session that comes back after
/// its store was evicted gets a fresh store restored from its tokens.
#[derive(Clone)]
pub struct AuthRegistry {
    stores: Cache<AuthKey, AuthStore>,
}

impl AuthRegistry {
    /// Create a registry whose entries expire after `idle` without access.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        let stores = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(idle)
            .build();
        Self { stores }
    }

    /// Look up the store for `key`.
    pub async fn get(&self, key: AuthKey) -> Option<AuthStore> {
        self.stores.get(&key).await
    }

    /// Look up the store for `key`, creating it with `init` if absent.
    ///
    /// Returns the store and whether this call created it. Concurrent
    /// callers for the same key share one store and only one of them sees
    /// `true`.
    pub async fn get_or_insert_with(
        &self,
        key: AuthKey,
        init: impl FnOnce() -> AuthStore,
    ) -> (AuthStore, bool) {
        let entry = self.stores.entry(key).or_insert_with(async { init() }).await;
        let created = entry.is_fresh();
        (entry.into_value(), created)
    }

    /// Drop the store for `key`.
    pub async fn remove(&self, key: AuthKey) {
        self.stores.invalidate(&key).await;
    }
}
