//! User roles and the capabilities they grant.
//!
//! Authorization checks ask a [`Role`] whether it holds a [`Capability`]
//! instead of comparing role names, so adding a role only touches
//! [`Role::capabilities`].

use serde::{Deserialize, Serialize};

/// Role of an Orderflow account, as reported by the backend.
///
/// Unknown role strings deserialize to [`Role::Customer`], which holds no
/// capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Operates the whole platform across restaurants.
    PlatformAdmin,
    /// Owns one or more restaurants.
    RestaurantOwner,
    /// Works the floor or kitchen of a restaurant.
    Staff,
    /// Diner ordering through a table QR code.
    #[default]
    #[serde(other)]
    Customer,
}

/// Something a role is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Enter the staff panel.
    StaffPanel,
    /// Read restaurant analytics (dashboard stats).
    ViewAnalytics,
    /// Administer every restaurant on the platform.
    PlatformAdministration,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 4] = [
        Self::PlatformAdmin,
        Self::RestaurantOwner,
        Self::Staff,
        Self::Customer,
    ];

    /// Capabilities granted to this role.
    #[must_use]
    pub const fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::PlatformAdmin => &[Capability::PlatformAdministration],
            Self::RestaurantOwner => &[Capability::StaffPanel, Capability::ViewAnalytics],
            Self::Staff => &[Capability::StaffPanel],
            Self::Customer => &[],
        }
    }

    /// Whether this role holds `capability`.
    #[must_use]
    pub fn has(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Wire name used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlatformAdmin => "platform_admin",
            Self::RestaurantOwner => "restaurant_owner",
            Self::Staff => "staff",
            Self::Customer => "customer",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PlatformAdmin => "Platform Admin",
            Self::RestaurantOwner => "Restaurant Owner",
            Self::Staff => "Restaurant Staff",
            Self::Customer => "Customer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "platform_admin" => Ok(Self::PlatformAdmin),
            "restaurant_owner" => Ok(Self::RestaurantOwner),
            "staff" => Ok(Self::Staff),
            "customer" => Ok(Self::Customer),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
