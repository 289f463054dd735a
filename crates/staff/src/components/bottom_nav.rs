//! Bottom navigation for authorized staff pages.

/// One entry in the bottom navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
    /// Sprite id in `/static/icons.svg`.
    pub icon: &'static str,
}

/// Entries shown to every authorized staff member, in display order.
pub const NAV_ITEMS: &[NavItem] = &[
    NavItem {
        href: "/staff",
        label: "Dashboard",
        icon: "home",
    },
    NavItem {
        href: "/staff/profile",
        label: "Profile",
        icon: "user",
    },
];
