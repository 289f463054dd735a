//! Request and response bodies for the backend API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CurrentUser, SessionTokens};

/// Request body for `POST /api/auth/login/`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for the refresh and logout endpoints.
#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response from `POST /api/auth/login/`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: CurrentUser,
}

impl LoginResponse {
    /// Split into the token pair and the user.
    #[must_use]
    pub fn into_parts(self) -> (SessionTokens, CurrentUser) {
        (
            SessionTokens {
                access: self.access,
                refresh: self.refresh,
            },
            self.user,
        )
    }
}

/// Response from `POST /api/auth/token/refresh/`.
///
/// `refresh` is only present when the backend rotates refresh tokens.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Error body returned by the backend.
///
/// DRF views answer with `detail`, custom views with `message` or `error`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.detail.or(self.message).or(self.error)
    }
}

/// Orders placed during one hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HourlyOrders {
    pub hour: u8,
    pub count: u32,
}

/// Response from `GET /api/analytics/dashboard/`.
///
/// Counts cover the restaurant's current day unless noted; trends are
/// percentage changes against the previous day.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    /// Orders not yet completed or cancelled, any day.
    pub active_orders: u32,
    pub pending_orders: u32,
    pub today_orders: u32,
    pub completed_orders: u32,
    pub today_pending: u32,
    pub today_revenue: Decimal,
    pub cash_revenue: Decimal,
    pub online_revenue: Decimal,
    pub orders_trend: f64,
    pub revenue_trend: f64,
    pub orders_by_hour: Vec<HourlyOrders>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_stats_from_backend_floats() {
        let stats: DashboardStats = serde_json::from_value(serde_json::json!({
            "active_orders": 4,
            "pending_orders": 4,
            "today_orders": 18,
            "completed_orders": 12,
            "today_pending": 3,
            "today_revenue": 12450.5,
            "cash_revenue": 4200.0,
            "online_revenue": 8250.5,
            "orders_trend": 12.5,
            "revenue_trend": -3.2,
            "orders_by_hour": [{"hour": 13, "count": 7}]
        }))
        .unwrap();

        assert_eq!(stats.today_orders, 18);
        assert_eq!(stats.today_revenue, Decimal::new(124_505, 1));
        assert!((stats.revenue_trend + 3.2).abs() < f64::EPSILON);
        assert_eq!(stats.orders_by_hour, vec![HourlyOrders { hour: 13, count: 7 }]);
    }

    #[test]
    fn test_dashboard_stats_missing_fields_default() {
        let stats: DashboardStats =
            serde_json::from_value(serde_json::json!({"today_orders": 2})).unwrap();
        assert_eq!(stats.today_orders, 2);
        assert_eq!(stats.today_revenue, Decimal::ZERO);
        assert!(stats.orders_by_hour.is_empty());
    }

    #[test]
    fn test_error_body_precedence() {
        let body: ErrorBody = serde_json::from_value(serde_json::json!({
            "error": "Restaurant not found.",
            "detail": "No active account found with the given credentials"
        }))
        .unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("No active account found with the given credentials")
        );
        assert_eq!(ErrorBody::default().into_message(), None);
    }
}
