//! Landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, routing::get};
use orderflow_core::Capability;

use crate::filters;
use crate::shell::Shell;
use crate::state::AppState;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub shell: Shell,
    pub can_enter_staff: bool,
}

/// Build the landing router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// GET /
async fn index(shell: Shell) -> HomeTemplate {
    let can_enter_staff = shell
        .auth
        .user
        .as_ref()
        .is_some_and(|user| user.can(Capability::StaffPanel));
    HomeTemplate {
        shell,
        can_enter_staff,
    }
}
