//! Guard event stream.
//!
//! Guarded pages load `/static/guard.js`, which subscribes here with the
//! state the page was rendered in. The stream follows the visitor's auth
//! store and tells the page when to replace its location (`navigate`) or
//! to reload because the loading placeholder can now show content
//! (`ready`).

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    Router,
    extract::Query,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::auth::SnapshotProvider;
use crate::guard::{GuardState, Navigation, StaffGuard};
use crate::shell::Shell;
use crate::state::AppState;

/// Query parameters for the event stream.
#[derive(Debug, Deserialize)]
pub struct GuardEventsQuery {
    /// Guard state the page was rendered in.
    pub rendered: Option<String>,
}

/// Instruction for a guarded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardEvent {
    /// Replace the current location.
    Navigate(Navigation),
    /// Authorization resolved; reload to render the content.
    Ready,
}

impl GuardEvent {
    fn into_sse(self) -> Event {
        match self {
            Self::Navigate(navigation) => Event::default().event("navigate").data(navigation.path()),
            Self::Ready => Event::default().event("ready").data("authorized"),
        }
    }
}

/// Build the guard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/staff/guard/events", get(events))
}

/// Follow `provider` through `guard`.
///
/// The current snapshot is observed first, then every published change.
/// Navigation is yielded only on entry into a redirect state, so a page
/// receives at most one `navigate` per entry. `ready` goes only to a page
/// that was rendered as the loading placeholder, once; pages already showing
/// content ride out token refreshes untouched. The stream holds `provider`
/// and ends if its channel closes.
pub fn guard_events<P>(provider: P, mut guard: StaffGuard) -> impl Stream<Item = GuardEvent>
where
    P: SnapshotProvider + 'static,
{
    let mut awaiting_content = guard.state() == Some(GuardState::Loading);
    stream! {
        let mut rx = provider.subscribe();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            let decision = guard.observe(&snapshot);
            tracing::debug!(state = %decision.state, entered = decision.entered, "Guard observed");

            if let Some(navigation) = decision.navigation {
                yield GuardEvent::Navigate(navigation);
            } else if awaiting_content && decision.state == GuardState::Authorized {
                awaiting_content = false;
                yield GuardEvent::Ready;
            }

            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Stream guard events for the visitor's session.
///
/// GET /staff/guard/events?rendered=<state>
async fn events(
    shell: Shell,
    Query(query): Query<GuardEventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let guard = match query.rendered.as_deref().map(str::parse::<GuardState>) {
        Some(Ok(state)) => StaffGuard::resume(state),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Ignoring rendered state");
            StaffGuard::new()
        }
        None => StaffGuard::new(),
    };

    let stream = guard_events(shell.store().clone(), guard).map(|event| Ok(event.into_sse()));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::pin::pin;
    use std::time::Duration;

    use orderflow_core::Role;

    use super::*;
    use crate::auth::{AuthSnapshot, AuthStore};
    use crate::models::user::tests::user_with_role;

    async fn next_event<S: Stream<Item = GuardEvent>>(
        stream: &mut std::pin::Pin<&mut S>,
    ) -> Option<GuardEvent> {
        tokio::time::timeout(Duration::from_millis(200), stream.next())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn test_loading_page_gets_ready_then_navigates_on_logout() {
        let store = AuthStore::new(AuthSnapshot::loading(None));
        let mut events = pin!(guard_events(store.clone(), StaffGuard::resume(GuardState::Loading)));

        // Still loading: nothing to do.
        assert_eq!(next_event(&mut events).await, None);

        store.sign_in(user_with_role(Role::Staff));
        assert_eq!(next_event(&mut events).await, Some(GuardEvent::Ready));

        store.sign_out();
        assert_eq!(
            next_event(&mut events).await,
            Some(GuardEvent::Navigate(Navigation::Login))
        );
    }

    #[tokio::test]
    async fn test_redirect_is_emitted_once_per_entry() {
        let store = AuthStore::new(AuthSnapshot::signed_in(user_with_role(Role::Staff)));
        let mut events = pin!(guard_events(
            store.clone(),
            StaffGuard::resume(GuardState::Authorized)
        ));

        store.sign_out();
        assert_eq!(
            next_event(&mut events).await,
            Some(GuardEvent::Navigate(Navigation::Login))
        );

        // Same classified state again: no second redirect.
        store.sign_out();
        assert_eq!(next_event(&mut events).await, None);

        // Leave through loading and come back: one more.
        store.begin_loading();
        assert_eq!(next_event(&mut events).await, None);
        store.finish_loading();
        assert_eq!(
            next_event(&mut events).await,
            Some(GuardEvent::Navigate(Navigation::Login))
        );
    }

    #[tokio::test]
    async fn test_token_refresh_leaves_rendered_content_alone() {
        let store = AuthStore::new(AuthSnapshot::signed_in(user_with_role(Role::Staff)));
        let mut events = pin!(guard_events(
            store.clone(),
            StaffGuard::resume(GuardState::Authorized)
        ));

        store.begin_loading();
        assert_eq!(next_event(&mut events).await, None);
        store.finish_loading();
        assert_eq!(next_event(&mut events).await, None);
    }

    #[tokio::test]
    async fn test_ready_is_sent_once() {
        let store = AuthStore::new(AuthSnapshot::loading(None));
        let mut events = pin!(guard_events(store.clone(), StaffGuard::resume(GuardState::Loading)));

        store.sign_in(user_with_role(Role::RestaurantOwner));
        assert_eq!(next_event(&mut events).await, Some(GuardEvent::Ready));

        store.begin_loading();
        store.finish_loading();
        assert_eq!(next_event(&mut events).await, None);
    }

    #[tokio::test]
    async fn test_forbidden_role_navigates_to_root() {
        let store = AuthStore::new(AuthSnapshot::loading(None));
        let mut events = pin!(guard_events(store.clone(), StaffGuard::new()));
        assert_eq!(next_event(&mut events).await, None);

        store.sign_in(user_with_role(Role::Customer));
        assert_eq!(
            next_event(&mut events).await,
            Some(GuardEvent::Navigate(Navigation::Root))
        );
    }

    #[tokio::test]
    async fn test_fresh_guard_acts_on_current_snapshot() {
        let store = AuthStore::signed_out();
        let mut events = pin!(guard_events(store, StaffGuard::new()));
        assert_eq!(
            next_event(&mut events).await,
            Some(GuardEvent::Navigate(Navigation::Login))
        );
    }
}
