//! JSON endpoints for staff clients.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::middleware::RequireStaff;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Body of `GET /api/staff/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: CurrentUser,
    pub display_name: String,
    pub permissions: Vec<&'static str>,
}

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/staff/me", get(me))
}

/// The signed-in staff member.
///
/// GET /api/staff/me
async fn me(RequireStaff(staff): RequireStaff) -> Json<MeResponse> {
    Json(MeResponse {
        display_name: staff.user.display_name(),
        permissions: staff.user.permission_labels(),
        user: staff.user,
    })
}
