//! The signed-in account.

use serde::{Deserialize, Serialize};

use orderflow_core::{Capability, RestaurantId, Role, UserId};

/// Account returned by the backend's `/api/auth/me/` and login endpoints.
///
/// Timestamps are kept as the backend sends them (ISO 8601 with the
/// restaurant's offset) and formatted at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Full name as computed by the backend.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub date_joined: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub restaurant_id: Option<RestaurantId>,
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub restaurant_slug: Option<String>,
    /// Staff may settle cash payments at the table.
    #[serde(default)]
    pub can_collect_cash: bool,
    /// Staff may override order status transitions.
    #[serde(default)]
    pub can_override_orders: bool,
    /// Staff may toggle menu item availability.
    #[serde(default)]
    pub can_manage_stock: bool,
}

impl CurrentUser {
    /// Name to greet the user by.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = self.name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    /// Whether the user's role grants `capability`.
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        self.role.has(capability)
    }

    /// Labels for the per-staff permission flags that are switched on.
    #[must_use]
    pub fn permission_labels(&self) -> Vec<&'static str> {
        [
            (self.can_collect_cash, "Collect cash"),
            (self.can_override_orders, "Override orders"),
            (self.can_manage_stock, "Manage stock"),
        ]
        .into_iter()
        .filter_map(|(enabled, label)| enabled.then_some(label))
        .collect()
    }
}
