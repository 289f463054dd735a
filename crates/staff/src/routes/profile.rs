//! Staff profile page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, routing::get};

use crate::components::{NAV_ITEMS, NavItem};
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::CurrentUser;
use crate::shell::Shell;
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "staff/profile.html")]
pub struct ProfileTemplate {
    pub shell: Shell,
    pub user: CurrentUser,
    pub nav_items: &'static [NavItem],
    pub permissions: Vec<&'static str>,
}

/// Build the profile router.
pub fn router() -> Router<AppState> {
    Router::new().route("/staff/profile", get(show))
}

/// GET /staff/profile
async fn show(RequireStaff(staff): RequireStaff) -> ProfileTemplate {
    let permissions = staff.user.permission_labels();
    ProfileTemplate {
        shell: staff.shell.titled("Profile"),
        user: staff.user,
        nav_items: NAV_ITEMS,
        permissions,
    }
}
