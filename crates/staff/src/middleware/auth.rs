//! Staff route protection.
//!
//! [`RequireStaff`] runs the staff guard once per request. One request is one
//! render, so the guard starts fresh and any redirect state it lands in is an
//! entry edge.

use askama::Template;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::auth::AuthStore;
use crate::error::set_sentry_user;
use crate::filters;
use crate::guard::{GuardState, GuardView, Navigation, StaffGuard};
use crate::models::CurrentUser;
use crate::shell::Shell;
use crate::state::AppState;

/// Everything a guarded handler needs about the signed-in staff member.
#[derive(Debug, Clone)]
pub struct StaffContext {
    pub user: CurrentUser,
    pub shell: Shell,
    pub session: Session,
}

impl StaffContext {
    /// The visitor's auth store.
    #[must_use]
    pub const fn store(&self) -> &AuthStore {
        self.shell.store()
    }
}

/// Extractor that requires a user whose role may enter the staff panel.
///
/// - While authentication is resolving, renders the loading page.
/// - Signed out: `303` to `/login`.
/// - Signed in without staff access: `303` to `/`.
///
/// API requests (`/api/...`) get `503`, `401` and `403` instead.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireStaff(staff): RequireStaff,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", staff.user.display_name())
/// }
/// ```
pub struct RequireStaff(pub StaffContext);

/// Error returned when the staff guard does not authorize the request.
#[derive(Debug)]
pub enum StaffRejection {
    /// Authentication still resolving (HTML requests).
    Loading(Box<Shell>),
    /// Replace the location (HTML requests).
    Redirect(Navigation),
    /// Authentication still resolving (API requests).
    Unavailable,
    /// Not signed in (API requests).
    Unauthorized,
    /// Signed in without staff access (API requests).
    Forbidden,
}

/// Loading placeholder shown while the session is being verified.
#[derive(Template)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {
    pub shell: Shell,
}

impl IntoResponse for StaffRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Loading(shell) => {
                let template = LoadingTemplate {
                    shell: shell.guarded(GuardState::Loading),
                };
                (
                    [(header::CACHE_CONTROL, "no-store")],
                    Html(
                        template
                            .render()
                            .unwrap_or_else(|_| String::from("Loading…")),
                    ),
                )
                    .into_response()
            }
            Self::Redirect(navigation) => Redirect::to(navigation.path()).into_response(),
            Self::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::RETRY_AFTER, "1")],
                "Authentication in progress",
            )
                .into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => {
                (StatusCode::FORBIDDEN, "Staff access required").into_response()
            }
        }
    }
}

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = StaffRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let shell = Shell::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        let is_api = parts.uri.path().starts_with("/api/");

        let decision = StaffGuard::new().observe(&shell.auth);
        tracing::debug!(state = %decision.state, path = %shell.path, "Staff guard");

        match decision.view {
            GuardView::Content => {
                let user = shell.auth.user.clone();
                let session = shell.session().cloned();
                let (Some(user), Some(session)) = (user, session) else {
                    return Err(rejection(Navigation::Login, is_api));
                };
                set_sentry_user(user.id, Some(&user.email));
                Ok(Self(StaffContext {
                    user,
                    shell: shell.guarded(GuardState::Authorized),
                    session,
                }))
            }
            GuardView::Placeholder if is_api => Err(StaffRejection::Unavailable),
            GuardView::Placeholder => Err(StaffRejection::Loading(Box::new(shell))),
            GuardView::Nothing => Err(rejection(
                decision.navigation.unwrap_or(Navigation::Login),
                is_api,
            )),
        }
    }
}

const fn rejection(navigation: Navigation, is_api: bool) -> StaffRejection {
    match (navigation, is_api) {
        (navigation, false) => StaffRejection::Redirect(navigation),
        (Navigation::Login, true) => StaffRejection::Unauthorized,
        (Navigation::Root, true) => StaffRejection::Forbidden,
    }
}
