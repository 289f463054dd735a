//! Login, logout, session restore and token refresh.

use std::future::Future;

use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use super::registry::AuthRegistry;
use super::store::{AuthStore, SnapshotProvider, TokenRotation};
use crate::backend::{BackendClient, BackendError};
use crate::models::{AuthKey, CurrentUser, SessionTokens, session_keys};

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Backend API call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The session holds no usable tokens; the visitor is signed out.
    #[error("Signed out")]
    SignedOut,
}

/// Drives every [`AuthStore`] transition.
///
/// The session is the durable record (token pair, last known user, store
/// key); the store is the live view pages and guard streams observe.
#[derive(Clone)]
pub struct AuthService {
    backend: BackendClient,
    registry: AuthRegistry,
}

impl AuthService {
    #[must_use]
    pub const fn new(backend: BackendClient, registry: AuthRegistry) -> Self {
        Self { backend, registry }
    }

    /// Backend API client.
    #[must_use]
    pub const fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// Live auth stores keyed by session.
    #[must_use]
    pub const fn registry(&self) -> &AuthRegistry {
        &self.registry
    }

    /// Find or create the auth store for `session`.
    ///
    /// A session that holds tokens but has no live store gets a store in the
    /// loading state and a background task that verifies the tokens with the
    /// backend. Visitors who never signed in get a detached signed-out
    /// store, so anonymous traffic creates no session rows.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be read or written.
    pub async fn resolve(&self, session: &Session) -> Result<AuthStore, AuthError> {
        let tokens = session.get::<SessionTokens>(session_keys::TOKENS).await?;
        let has_tokens = tokens.is_some();

        let key = match session.get::<AuthKey>(session_keys::AUTH_KEY).await? {
            Some(key) => key,
            None if has_tokens => assign_key(session).await?,
            None => return Ok(AuthStore::signed_out()),
        };

        let cached_user = if has_tokens {
            session.get::<CurrentUser>(session_keys::CURRENT_USER).await?
        } else {
            None
        };

        let (store, created) = self
            .registry
            .get_or_insert_with(key, || {
                if has_tokens {
                    AuthStore::restoring(cached_user)
                } else {
                    AuthStore::signed_out()
                }
            })
            .await;

        if created && has_tokens {
            tracing::debug!(auth_key = %key, "Restoring session from stored tokens");
            self.spawn_restore(session.clone(), store.clone());
        }

        Ok(store)
    }

    /// Look up an existing live store without creating one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be read.
    pub async fn existing(&self, session: &Session) -> Result<Option<AuthStore>, AuthError> {
        let Some(key) = session.get::<AuthKey>(session_keys::AUTH_KEY).await? else {
            return Ok(None);
        };
        Ok(self.registry.get(key).await)
    }

    /// Sign in with email and password.
    ///
    /// The session id is cycled on success. Any failure leaves the store
    /// signed out and the session without tokens, so the two never disagree.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Backend(BackendError::InvalidCredentials(_))` if
    /// the backend rejects the credentials.
    #[instrument(skip(self, session, password), fields(email = %email))]
    pub async fn login(
        &self,
        session: &Session,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser, AuthError> {
        let key = match session.get::<AuthKey>(session_keys::AUTH_KEY).await? {
            Some(key) => key,
            None => assign_key(session).await?,
        };
        let (store, _) = self
            .registry
            .get_or_insert_with(key, AuthStore::signed_out)
            .await;
        store.begin_loading();

        let result = async {
            let (tokens, user) = self.backend.login(email, password).await?.into_parts();
            session.cycle_id().await?;
            session.insert(session_keys::TOKENS, &tokens).await?;
            session.insert(session_keys::CURRENT_USER, &user).await?;
            Ok::<_, AuthError>(user)
        }
        .await;

        match result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, role = %user.role, "Staff login");
                store.sign_in(user.clone());
                Ok(user)
            }
            Err(e) => {
                store.sign_out();
                if let Err(clear) = clear_tokens(session).await {
                    tracing::warn!(error = %clear, "Failed to clear tokens after failed login");
                }
                Err(e)
            }
        }
    }

    /// Sign out: blacklist the refresh token (best effort) and clear the
    /// session.
    ///
    /// Only an existing store is signed out; logout never creates a store,
    /// so it cannot start a restore that would race the token removal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be modified.
    #[instrument(skip_all)]
    pub async fn logout(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(tokens) = session.get::<SessionTokens>(session_keys::TOKENS).await? {
            if let Err(e) = self.backend.logout(&tokens.access, &tokens.refresh).await {
                tracing::warn!(error = %e, "Backend logout failed, clearing local session anyway");
            }
        }

        if let Some(store) = self.existing(session).await? {
            store.sign_out();
        }
        clear_tokens(session).await?;
        session.cycle_id().await?;
        Ok(())
    }

    /// Run a backend call with the session's access token.
    ///
    /// On `401` the refresh token is exchanged once (the store shows
    /// loading meanwhile) and the call is retried. Concurrent calls of one
    /// session share a single refresh. If the refresh token is rejected too,
    /// the session is cleared and `AuthError::SignedOut` is returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SignedOut` when no valid tokens remain, or the
    /// backend error of the call.
    pub async fn with_access<T, F, Fut>(
        &self,
        session: &Session,
        store: &AuthStore,
        op: F,
    ) -> Result<T, AuthError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let tokens = session
            .get::<SessionTokens>(session_keys::TOKENS)
            .await?
            .ok_or(AuthError::SignedOut)?;

        match op(tokens.access.clone()).await {
            Err(e) if e.is_unauthorized() => {}
            other => return other.map_err(AuthError::from),
        }

        let tokens = self.refresh_tokens(session, store, tokens).await?;

        match op(tokens.access).await {
            Err(e) if e.is_unauthorized() => {
                self.forget(session, store).await?;
                Err(AuthError::SignedOut)
            }
            other => other.map_err(AuthError::from),
        }
    }

    /// Replace `stale` with a fresh token pair.
    ///
    /// Runs under the store's refresh lock. A caller that waited on another
    /// refresh of the same tokens takes its result instead of spending the
    /// rotated-out refresh token.
    async fn refresh_tokens(
        &self,
        session: &Session,
        store: &AuthStore,
        stale: SessionTokens,
    ) -> Result<SessionTokens, AuthError> {
        let mut rotation = store.lock_refresh().await;

        match session.get::<SessionTokens>(session_keys::TOKENS).await? {
            None => return Err(AuthError::SignedOut),
            Some(current) if current.access != stale.access => return Ok(current),
            Some(_) => {}
        }
        if let Some(done) = rotation.as_ref().filter(|r| r.replaced == stale.access) {
            session.insert(session_keys::TOKENS, &done.tokens).await?;
            return Ok(done.tokens.clone());
        }

        tracing::debug!("Access token rejected, refreshing");
        let _loading = Loading::begin(store);

        let tokens = match self.backend.refresh(&stale.refresh).await {
            Ok(refreshed) => stale.clone().refreshed(refreshed.access, refreshed.refresh),
            Err(e) if e.is_unauthorized() => {
                tracing::info!("Refresh token rejected, signing out");
                self.forget(session, store).await?;
                return Err(AuthError::SignedOut);
            }
            Err(e) => return Err(e.into()),
        };

        *rotation = Some(TokenRotation {
            replaced: stale.access,
            tokens: tokens.clone(),
        });
        session.insert(session_keys::TOKENS, &tokens).await?;
        Ok(tokens)
    }

    /// Sign the store out and drop the session's tokens.
    async fn forget(&self, session: &Session, store: &AuthStore) -> Result<(), AuthError> {
        store.sign_out();
        clear_tokens(session).await?;
        Ok(())
    }

    fn spawn_restore(&self, session: Session, store: AuthStore) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.restore(&session, &store).await {
                tracing::warn!(error = %e, "Session restore failed");
            }
        });
    }

    /// Verify stored tokens with `/api/auth/me/` and publish the result.
    async fn restore(&self, session: &Session, store: &AuthStore) -> Result<(), AuthError> {
        let backend = &self.backend;
        let result = self
            .with_access(session, store, |access| async move { backend.me(&access).await })
            .await;

        match result {
            Ok(user) => {
                // A logout that landed meanwhile already signed the store out;
                // saving now would write the old tokens back.
                if !store.snapshot().is_loading {
                    return Ok(());
                }
                session.insert(session_keys::CURRENT_USER, &user).await?;
                session.save().await?;
                store.sign_in(user);
                Ok(())
            }
            Err(AuthError::SignedOut) => {
                session.save().await?;
                Ok(())
            }
            Err(e) => {
                // Backend unreachable: trust the last known user until the
                // next call proves otherwise.
                match session.get::<CurrentUser>(session_keys::CURRENT_USER).await? {
                    Some(user) if store.snapshot().is_loading => store.sign_in(user),
                    Some(_) => {}
                    None => store.sign_out(),
                }
                Err(e)
            }
        }
    }
}

/// Marks a store as loading for as long as it lives.
///
/// Only the guard that set the flag clears it, so a restore that is already
/// loading keeps its state. Dropping on any exit path, cancellation
/// included, means the store cannot be left loading.
struct Loading<'a> {
    store: &'a AuthStore,
    began: bool,
}

impl<'a> Loading<'a> {
    fn begin(store: &'a AuthStore) -> Self {
        let began = store.begin_loading();
        Self { store, began }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        if self.began {
            self.store.finish_loading();
        }
    }
}

/// Give the session a fresh auth store key.
async fn assign_key(session: &Session) -> Result<AuthKey, AuthError> {
    let key = AuthKey::new(uuid::Uuid::new_v4());
    session.insert(session_keys::AUTH_KEY, key).await?;
    Ok(key)
}

async fn clear_tokens(session: &Session) -> Result<(), AuthError> {
    session
        .remove::<SessionTokens>(session_keys::TOKENS)
        .await?;
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::{Json, Router, routing::post};
    use orderflow_core::Role;
    use serde_json::{Value, json};
    use tower_sessions::MemoryStore;
    use url::Url;

    use super::*;
    use crate::auth::AuthSnapshot;
    use crate::config::BackendConfig;
    use crate::models::user::tests::user_with_role;

    fn service_at(base: &str) -> AuthService {
        let backend = BackendClient::new(&BackendConfig {
            api_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        AuthService::new(backend, AuthRegistry::new(Duration::from_secs(60)))
    }

    fn service() -> AuthService {
        // Nothing listens on the discard port; backend calls fail fast.
        service_at("http://127.0.0.1:9/")
    }

    /// Serve a backend that accepts the refresh token `refresh` once,
    /// answering with `a2`/`r2` after `delay`, and rejects every later
    /// refresh as blacklisted. Returns the service and the refresh count.
    async fn rotating_backend(delay: Duration) -> (AuthService, Arc<AtomicUsize>) {
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&refreshes);
        let app = Router::new().route(
            "/api/auth/token/refresh/",
            post(move |Json(body): Json<Value>| {
                let counter = Arc::clone(&counter);
                async move {
                    tokio::time::sleep(delay).await;
                    let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
                    if first && body["refresh"] == "refresh" {
                        (StatusCode::OK, Json(json!({"access": "a2", "refresh": "r2"})))
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"detail": "Token is blacklisted"})),
                        )
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (service_at(&format!("http://{addr}/")), refreshes)
    }

    /// A backend call that only accepts the refreshed access token.
    async fn call_with(access: String) -> Result<String, BackendError> {
        if access == "a2" {
            Ok(access)
        } else {
            Err(BackendError::Unauthorized)
        }
    }

    fn signed_in_store() -> AuthStore {
        AuthStore::new(AuthSnapshot::signed_in(user_with_role(Role::Staff)))
    }

    async fn stored_tokens(session: &Session) -> Option<SessionTokens> {
        session
            .get::<SessionTokens>(session_keys::TOKENS)
            .await
            .unwrap()
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    async fn signed_in_session() -> Session {
        let session = session();
        session
            .insert(
                session_keys::TOKENS,
                SessionTokens {
                    access: "access".to_string(),
                    refresh: "refresh".to_string(),
                },
            )
            .await
            .unwrap();
        session
            .insert(session_keys::CURRENT_USER, user_with_role(Role::Staff))
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_anonymous_visitor_gets_detached_store() {
        let service = service();
        let session = session();

        let store = service.resolve(&session).await.unwrap();
        assert!(!store.snapshot().is_loading);
        assert!(store.snapshot().user.is_none());
        assert!(
            session
                .get::<AuthKey>(session_keys::AUTH_KEY)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_session_with_tokens_starts_restoring() {
        let service = service();
        let session = signed_in_session().await;

        let store = service.resolve(&session).await.unwrap();
        let snapshot = store.snapshot();
        // Either still restoring or already fell back to the cached user.
        assert_eq!(snapshot.user.map(|u| u.role), Some(Role::Staff));

        let again = service.resolve(&session).await.unwrap();
        let rx = again.subscribe();
        store.sign_out();
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_with_access_returns_success_without_refresh() {
        let service = service();
        let session = signed_in_session().await;
        let store = AuthStore::signed_out();
        let calls = AtomicUsize::new(0);

        let value = service
            .with_access(&session, &store, |access| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, BackendError>(access.len()) }
            })
            .await
            .unwrap();

        assert_eq!(value, "access".len());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!store.snapshot().is_loading);
    }

    #[tokio::test]
    async fn test_with_access_without_tokens_is_signed_out() {
        let service = service();
        let store = AuthStore::signed_out();

        let err = service
            .with_access(&session(), &store, |_| async { Ok::<_, BackendError>(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SignedOut));
    }

    #[tokio::test]
    async fn test_unreachable_refresh_keeps_session() {
        let service = service();
        let session = signed_in_session().await;
        let store = signed_in_store();

        let err = service
            .with_access(&session, &store, |_| async {
                Err::<(), _>(BackendError::Unauthorized)
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Backend(ref e) if e.is_unavailable()));
        assert!(!store.snapshot().is_loading);
        assert!(store.snapshot().user.is_some());
        assert!(
            session
                .get::<SessionTokens>(session_keys::TOKENS)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_with_access_refreshes_and_retries() {
        let (service, refreshes) = rotating_backend(Duration::ZERO).await;
        let session = signed_in_session().await;
        let store = signed_in_store();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        let value = service
            .with_access(&session, &store, call_with)
            .await
            .unwrap();

        assert_eq!(value, "a2");
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
        let tokens = stored_tokens(&session).await.unwrap();
        assert_eq!(tokens.access, "a2");
        assert_eq!(tokens.refresh, "r2");

        // Went through loading and came back with the same user.
        assert!(rx.has_changed().unwrap());
        assert!(!store.snapshot().is_loading);
        assert!(store.snapshot().user.is_some());
    }

    #[tokio::test]
    async fn test_parallel_calls_share_one_refresh() {
        let (service, refreshes) = rotating_backend(Duration::from_millis(50)).await;
        let session = signed_in_session().await;
        let store = signed_in_store();

        let (first, second) = tokio::join!(
            service.with_access(&session, &store, call_with),
            service.with_access(&session, &store, call_with),
        );

        assert_eq!(first.unwrap(), "a2");
        assert_eq!(second.unwrap(), "a2");
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
        assert!(store.snapshot().user.is_some());
        assert!(!store.snapshot().is_loading);
        assert_eq!(stored_tokens(&session).await.unwrap().refresh, "r2");
    }

    #[tokio::test]
    async fn test_stale_request_reuses_last_rotation() {
        let (service, refreshes) = rotating_backend(Duration::ZERO).await;
        let sessions = Arc::new(MemoryStore::default());
        let first = Session::new(None, Arc::clone(&sessions), None);
        first
            .insert(
                session_keys::TOKENS,
                SessionTokens {
                    access: "access".to_string(),
                    refresh: "refresh".to_string(),
                },
            )
            .await
            .unwrap();
        first.save().await.unwrap();

        // A second request loaded the session before the first one refreshed.
        let second = Session::new(first.id(), Arc::clone(&sessions), None);
        assert_eq!(stored_tokens(&second).await.unwrap().access, "access");

        let store = signed_in_store();
        service.with_access(&first, &store, call_with).await.unwrap();
        let value = service.with_access(&second, &store, call_with).await.unwrap();

        assert_eq!(value, "a2");
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
        assert!(store.snapshot().user.is_some());
        assert_eq!(stored_tokens(&second).await.unwrap().refresh, "r2");
    }

    #[tokio::test]
    async fn test_cancelled_refresh_clears_loading() {
        let (service, _) = rotating_backend(Duration::from_secs(5)).await;
        let session = signed_in_session().await;
        let store = signed_in_store();

        let cancelled = tokio::time::timeout(
            Duration::from_millis(100),
            service.with_access(&session, &store, call_with),
        )
        .await;

        assert!(cancelled.is_err());
        assert!(!store.snapshot().is_loading);
        assert!(store.snapshot().user.is_some());
    }

    #[tokio::test]
    async fn test_rejected_refresh_signs_out() {
        let (service, refreshes) = rotating_backend(Duration::ZERO).await;
        let session = signed_in_session().await;
        session
            .insert(
                session_keys::TOKENS,
                SessionTokens {
                    access: "access".to_string(),
                    refresh: "revoked".to_string(),
                },
            )
            .await
            .unwrap();
        let store = signed_in_store();

        let err = service
            .with_access(&session, &store, call_with)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::SignedOut));
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(store.snapshot(), AuthSnapshot::signed_out());
        assert!(stored_tokens(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_store() {
        let service = service();
        let session = signed_in_session().await;
        let key = assign_key(&session).await.unwrap();
        let (store, _) = service
            .registry
            .get_or_insert_with(key, || {
                AuthStore::new(AuthSnapshot::signed_in(user_with_role(
                    Role::RestaurantOwner,
                )))
            })
            .await;

        service.logout(&session).await.unwrap();

        assert!(store.snapshot().user.is_none());
        assert!(
            session
                .get::<SessionTokens>(session_keys::TOKENS)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_failed_login_signs_store_out() {
        let service = service();
        let session = session();

        let err = service
            .login(&session, "ravi@spicegarden.in", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Backend(_)));

        let store = service.existing(&session).await.unwrap().unwrap();
        assert!(!store.snapshot().is_loading);
        assert!(store.snapshot().user.is_none());
    }

    #[tokio::test]
    async fn test_failed_login_over_signed_in_session_drops_tokens() {
        let service = service();
        let session = signed_in_session().await;
        let key = assign_key(&session).await.unwrap();
        let (store, _) = service
            .registry
            .get_or_insert_with(key, signed_in_store)
            .await;

        service
            .login(&session, "ravi@spicegarden.in", "wrong")
            .await
            .unwrap_err();

        assert_eq!(store.snapshot(), AuthSnapshot::signed_out());
        assert!(stored_tokens(&session).await.is_none());
        assert!(
            session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .unwrap()
                .is_none()
        );
    }
}
