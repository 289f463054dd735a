//! Authentication route handlers.
//!
//! Email/password login against the Orderflow backend, and logout.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use orderflow_core::Capability;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::auth::AuthError;
use crate::backend::BackendError;
use crate::error::{AppError, clear_sentry_user};
use crate::filters;
use crate::guard::{GuardState, Navigation};
use crate::models::CurrentUser;
use crate::shell::Shell;
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub shell: Shell,
    pub error: Option<String>,
    pub email: String,
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

/// Where a signed-in user lands.
fn landing(user: &CurrentUser) -> &'static str {
    if user.can(Capability::StaffPanel) {
        "/staff"
    } else {
        Navigation::Root.path()
    }
}

fn render(template: &LoginTemplate, status: StatusCode) -> Response {
    (
        status,
        Html(
            template
                .render()
                .unwrap_or_else(|_| String::from("Error rendering template")),
        ),
    )
        .into_response()
}

/// Render the login page.
///
/// GET /login
async fn login_page(shell: Shell) -> Response {
    if GuardState::classify(&shell.auth) == GuardState::Authorized {
        return Redirect::to("/staff").into_response();
    }

    let template = LoginTemplate {
        shell: shell.titled("Sign in"),
        error: None,
        email: String::new(),
    };
    render(&template, StatusCode::OK)
}

/// Sign in and redirect, or re-render the form with the backend's message.
///
/// POST /login
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    shell: Shell,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_string();

    let message = match state.auth().login(&session, &email, &form.password).await {
        Ok(user) => return Ok(Redirect::to(landing(&user)).into_response()),
        Err(AuthError::Backend(BackendError::InvalidCredentials(message))) => message,
        Err(AuthError::Backend(e)) if e.is_unavailable() => {
            tracing::warn!(error = %e, "Backend unreachable during login");
            "Orderflow is unreachable right now. Try again in a moment.".to_string()
        }
        Err(e) => return Err(e.into()),
    };

    let template = LoginTemplate {
        shell: shell.titled("Sign in"),
        error: Some(message),
        email,
    };
    Ok(render(&template, StatusCode::UNAUTHORIZED))
}

/// Logout and clear session.
///
/// POST /logout
#[instrument(skip_all)]
async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect, AppError> {
    state.auth().logout(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to(Navigation::Login.path()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orderflow_core::Role;

    use super::*;
    use crate::auth::AuthSnapshot;
    use crate::models::user::tests::user_with_role;
    use crate::shell::tests::shell_with;

    #[test]
    fn test_landing_by_role() {
        assert_eq!(landing(&user_with_role(Role::Staff)), "/staff");
        assert_eq!(landing(&user_with_role(Role::RestaurantOwner)), "/staff");
        assert_eq!(landing(&user_with_role(Role::Customer)), "/");
        assert_eq!(landing(&user_with_role(Role::PlatformAdmin)), "/");
    }

    #[test]
    fn test_login_form_keeps_email_and_shows_error() {
        let template = LoginTemplate {
            shell: shell_with("/login", AuthSnapshot::signed_out()).titled("Sign in"),
            error: Some("No active account found with the given credentials".to_string()),
            email: "ravi@spicegarden.in".to_string(),
        };
        let html = template.render().unwrap();
        assert!(html.contains("No active account found"));
        assert!(html.contains(r#"value="ravi@spicegarden.in""#));
        assert!(!html.contains("guard.js"));
    }

    #[test]
    fn test_failed_login_rerenders_with_401() {
        let template = LoginTemplate {
            shell: shell_with("/login", AuthSnapshot::signed_out()),
            error: Some("Invalid".to_string()),
            email: String::new(),
        };
        let response = render(&template, StatusCode::UNAUTHORIZED);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
