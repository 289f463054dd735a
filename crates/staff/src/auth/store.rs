//! Per-session authentication state.
//!
//! An [`AuthStore`] is the single writer of one session's [`AuthSnapshot`].
//! Readers (request extractors, guard event streams) only ever see the
//! snapshot through [`SnapshotProvider`].

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, watch};

use crate::models::{CurrentUser, SessionTokens};

/// What the authentication provider currently knows about the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthSnapshot {
    /// Signed-in user, if any.
    pub user: Option<CurrentUser>,
    /// A login, restore or token refresh is in flight.
    pub is_loading: bool,
}

impl AuthSnapshot {
    /// Nobody signed in, nothing in flight.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            user: None,
            is_loading: false,
        }
    }

    /// `user` signed in, nothing in flight.
    #[must_use]
    pub const fn signed_in(user: CurrentUser) -> Self {
        Self {
            user: Some(user),
            is_loading: false,
        }
    }

    /// Resolution in flight; `user` is the last known user, if any.
    #[must_use]
    pub const fn loading(user: Option<CurrentUser>) -> Self {
        Self {
            user,
            is_loading: true,
        }
    }
}

/// Read-only access to an authentication snapshot.
pub trait SnapshotProvider: Send + Sync {
    /// The current snapshot.
    fn snapshot(&self) -> AuthSnapshot;

    /// A receiver notified whenever the snapshot changes.
    fn subscribe(&self) -> watch::Receiver<AuthSnapshot>;
}

/// The last token refresh of a session: the access token it replaced and
/// the pair the backend issued for it.
#[derive(Debug, Clone)]
pub struct TokenRotation {
    pub replaced: String,
    pub tokens: SessionTokens,
}

/// Authentication state for one browser session.
///
/// Cheap to clone; clones share the same channel and refresh lock.
#[derive(Debug, Clone)]
pub struct AuthStore {
    tx: Arc<watch::Sender<AuthSnapshot>>,
    rotation: Arc<Mutex<Option<TokenRotation>>>,
}

impl AuthStore {
    /// Create a store holding `initial`.
    #[must_use]
    pub fn new(initial: AuthSnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx: Arc::new(tx),
            rotation: Arc::new(Mutex::new(None)),
        }
    }

    /// A store for a session with no tokens.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::new(AuthSnapshot::signed_out())
    }

    /// A store for a session whose tokens are still being verified.
    #[must_use]
    pub fn restoring(cached_user: Option<CurrentUser>) -> Self {
        Self::new(AuthSnapshot::loading(cached_user))
    }

    /// Mark a resolution as in flight. Returns whether anything changed.
    pub fn begin_loading(&self) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.is_loading {
                return false;
            }
            snapshot.is_loading = true;
            true
        })
    }

    /// Clear the in-flight flag, keeping the current user.
    pub fn finish_loading(&self) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if !snapshot.is_loading {
                return false;
            }
            snapshot.is_loading = false;
            true
        })
    }

    /// Publish a signed-in user and clear the in-flight flag.
    pub fn sign_in(&self, user: CurrentUser) {
        self.tx.send_replace(AuthSnapshot::signed_in(user));
    }

    /// Publish the signed-out state.
    pub fn sign_out(&self) {
        self.tx.send_replace(AuthSnapshot::signed_out());
    }

    /// Take the session's refresh lock.
    ///
    /// Refresh tokens are single use, so one refresh runs at a time per
    /// session. The guarded value is the last rotation, which lets a caller
    /// that waited reuse its result instead of spending the old token again.
    pub async fn lock_refresh(&self) -> MutexGuard<'_, Option<TokenRotation>> {
        self.rotation.lock().await
    }
}

impl SnapshotProvider for AuthStore {
    fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orderflow_core::Role;

    use super::*;
    use crate::models::user::tests::user_with_role;

    #[test]
    fn test_restoring_keeps_cached_user() {
        let user = user_with_role(Role::Staff);
        let store = AuthStore::restoring(Some(user.clone()));
        let snapshot = store.snapshot();
        assert!(snapshot.is_loading);
        assert_eq!(snapshot.user, Some(user));
    }

    #[tokio::test]
    async fn test_begin_loading_notifies_once() {
        let store = AuthStore::signed_in_for_test(Role::RestaurantOwner);
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        assert!(store.begin_loading());
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(!store.begin_loading());
        assert!(!rx.has_changed().unwrap());

        assert!(store.finish_loading());
        let snapshot = rx.borrow_and_update().clone();
        assert!(!snapshot.is_loading);
        assert!(snapshot.user.is_some());
    }

    #[tokio::test]
    async fn test_sign_out_reaches_subscribers() {
        let store = AuthStore::signed_in_for_test(Role::Staff);
        let mut rx = store.subscribe();

        store.sign_out();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), AuthSnapshot::signed_out());
    }

    #[tokio::test]
    async fn test_refresh_lock_is_shared_by_clones() {
        let store = AuthStore::signed_in_for_test(Role::Staff);
        let clone = store.clone();

        let mut rotation = store.lock_refresh().await;
        *rotation = Some(TokenRotation {
            replaced: "a1".to_string(),
            tokens: SessionTokens {
                access: "a2".to_string(),
                refresh: "r2".to_string(),
            },
        });
        assert!(clone.rotation.try_lock().is_err());
        drop(rotation);

        let seen = clone.lock_refresh().await;
        assert_eq!(seen.as_ref().map(|r| r.tokens.access.as_str()), Some("a2"));
    }

    #[test]
    fn test_sign_in_clears_loading() {
        let store = AuthStore::restoring(None);
        store.sign_in(user_with_role(Role::Staff));
        let snapshot = store.snapshot();
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.user.map(|u| u.role), Some(Role::Staff));
    }

    impl AuthStore {
        fn signed_in_for_test(role: Role) -> Self {
            Self::new(AuthSnapshot::signed_in(user_with_role(role)))
        }
    }
}
