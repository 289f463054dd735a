//! Staff dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use orderflow_core::{Capability, format_currency};
use tracing::instrument;

use crate::auth::AuthError;
use crate::backend::{BackendError, DashboardStats, HourlyOrders};
use crate::components::{NAV_ITEMS, NavItem, StatCard, StatIcon, Trend};
use crate::filters;
use crate::guard::Navigation;
use crate::middleware::{RequireStaff, StaffContext};
use crate::models::CurrentUser;
use crate::shell::{SessionScope, Shell};
use crate::state::AppState;

const TREND_PERIOD: &str = "vs yesterday";

/// One bar of the orders-by-hour chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourBar {
    pub label: String,
    pub count: u32,
    /// Bar height as a percentage of the busiest hour.
    pub height: u32,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "staff/dashboard.html")]
pub struct DashboardTemplate {
    pub shell: Shell,
    pub user: CurrentUser,
    pub nav_items: &'static [NavItem],
    pub cards: Vec<StatCard>,
    pub orders_by_hour: Vec<HourBar>,
    pub can_view_analytics: bool,
    pub error_message: Option<String>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/staff", get(index))
}

/// Render the dashboard.
///
/// GET /staff
///
/// Stats failures render the page with an inline message. Only a session
/// whose tokens are gone leaves the page, for the login form.
#[instrument(skip_all)]
async fn index(State(state): State<AppState>, RequireStaff(staff): RequireStaff) -> Response {
    let StaffContext {
        user,
        shell,
        session,
    } = staff;
    let can_view_analytics = user.can(Capability::ViewAnalytics);

    let mut cards = Vec::new();
    let mut orders_by_hour = Vec::new();
    let mut error_message = None;

    if can_view_analytics {
        match user.restaurant_id {
            Some(restaurant) => {
                let backend = state.backend();
                let result = state
                    .auth()
                    .with_access(&session, shell.store(), |access| async move {
                        backend.dashboard_stats(&access, restaurant).await
                    })
                    .await;

                match result {
                    Ok(stats) => {
                        cards = stat_cards(&stats, shell.scope);
                        orders_by_hour = hour_bars(&stats.orders_by_hour);
                    }
                    Err(AuthError::SignedOut) => {
                        return Redirect::to(Navigation::Login.path()).into_response();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to load dashboard stats");
                        error_message = Some(stats_error_message(&e).to_string());
                    }
                }
            }
            None => {
                error_message = Some("No restaurant is linked to this account yet.".to_string());
            }
        }
    }

    DashboardTemplate {
        shell: shell.titled("Dashboard"),
        user,
        nav_items: NAV_ITEMS,
        cards,
        orders_by_hour,
        can_view_analytics,
        error_message,
    }
    .into_response()
}

/// Cards for today's stats, in display order.
#[must_use]
pub fn stat_cards(stats: &DashboardStats, scope: SessionScope) -> Vec<StatCard> {
    let money = |amount| format_currency(amount, Some(scope.currency), Some(scope.locale));
    let trend = |percent| Trend::from_percent(percent).map(|t| t.with_label(TREND_PERIOD));

    vec![
        StatCard::new("Active Orders", stats.active_orders, StatIcon::ActiveOrders),
        StatCard::new("Today's Orders", stats.today_orders, StatIcon::Orders)
            .with_trend(trend(stats.orders_trend)),
        StatCard::new("Today's Revenue", money(stats.today_revenue), StatIcon::Revenue)
            .with_trend(trend(stats.revenue_trend)),
        StatCard::new("Completed Today", stats.completed_orders, StatIcon::Completed),
        StatCard::new("Cash", money(stats.cash_revenue), StatIcon::Cash),
        StatCard::new("Online", money(stats.online_revenue), StatIcon::Online),
    ]
}

/// Bars for the hours that saw orders, scaled to the busiest hour.
#[must_use]
pub fn hour_bars(hours: &[HourlyOrders]) -> Vec<HourBar> {
    let busiest = hours.iter().map(|h| h.count).max().unwrap_or(0);
    if busiest == 0 {
        return Vec::new();
    }

    let mut bars: Vec<HourBar> = hours
        .iter()
        .filter(|h| h.count > 0)
        .map(|h| HourBar {
            label: format!("{:02}:00", h.hour),
            count: h.count,
            height: bar_height(h.count, busiest),
        })
        .collect();
    bars.sort_by(|a, b| a.label.cmp(&b.label));
    bars
}

/// Percentage of `busiest`, computed wide so large counts cannot overflow.
fn bar_height(count: u32, busiest: u32) -> u32 {
    let percent = u64::from(count) * 100 / u64::from(busiest);
    u32::try_from(percent).unwrap_or(100)
}

fn stats_error_message(error: &AuthError) -> &'static str {
    match error {
        AuthError::Backend(BackendError::NotFound(_)) => "Restaurant not found.",
        AuthError::Backend(BackendError::Forbidden(_)) => {
            "You don't have access to this restaurant's analytics."
        }
        AuthError::Backend(e) if e.is_unavailable() => {
            "Orderflow is unreachable right now. Stats will be back shortly."
        }
        _ => "Couldn't load today's stats.",
    }
}
