//! Staff route guard.
//!
//! Classifies an [`AuthSnapshot`] into one of four states and decides what a
//! staff page shows:
//!
//! | State             | Condition                                  | View        | Navigation |
//! |-------------------|--------------------------------------------|-------------|------------|
//! | `Loading`         | `is_loading`                               | placeholder | none       |
//! | `Unauthenticated` | not loading, no user                       | nothing     | `/login`   |
//! | `Forbidden`       | user without the staff-panel capability    | nothing     | `/`        |
//! | `Authorized`      | user with the staff-panel capability       | content     | none       |
//!
//! Navigation is edge-triggered: [`StaffGuard::observe`] emits it only when a
//! redirect state is entered, never while it persists.

use orderflow_core::Capability;
use serde::Serialize;

use crate::auth::AuthSnapshot;

/// Classified authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    Loading,
    Unauthenticated,
    Forbidden,
    Authorized,
}

/// What a guarded page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardView {
    /// Loading placeholder.
    Placeholder,
    /// Nothing; a navigation is under way.
    Nothing,
    /// The staff content with bottom navigation.
    Content,
}

/// Replace-navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    Login,
    Root,
}

impl Navigation {
    /// Path to replace the current location with.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Root => "/",
        }
    }
}

impl GuardState {
    /// Wire name, as used by the guard event stream.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::Authorized => "authorized",
        }
    }

    /// Classify a snapshot.
    ///
    /// Loading wins over everything else, whatever the user value.
    #[must_use]
    pub fn classify(snapshot: &AuthSnapshot) -> Self {
        if snapshot.is_loading {
            return Self::Loading;
        }
        match &snapshot.user {
            None => Self::Unauthenticated,
            Some(user) if user.can(Capability::StaffPanel) => Self::Authorized,
            Some(_) => Self::Forbidden,
        }
    }

    /// View rendered in this state.
    #[must_use]
    pub const fn view(self) -> GuardView {
        match self {
            Self::Loading => GuardView::Placeholder,
            Self::Unauthenticated | Self::Forbidden => GuardView::Nothing,
            Self::Authorized => GuardView::Content,
        }
    }

    /// Navigation owed on entering this state.
    #[must_use]
    pub const fn redirect(self) -> Option<Navigation> {
        match self {
            Self::Unauthenticated => Some(Navigation::Login),
            Self::Forbidden => Some(Navigation::Root),
            Self::Loading | Self::Authorized => None,
        }
    }
}

impl std::fmt::Display for GuardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GuardState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loading" => Ok(Self::Loading),
            "unauthenticated" => Ok(Self::Unauthenticated),
            "forbidden" => Ok(Self::Forbidden),
            "authorized" => Ok(Self::Authorized),
            other => Err(format!("unknown guard state: {other}")),
        }
    }
}

/// Outcome of one [`StaffGuard::observe`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardDecision {
    pub state: GuardState,
    pub view: GuardView,
    /// Whether this observation entered `state` (it differs from the last).
    pub entered: bool,
    /// Set only on entry into a redirect state.
    pub navigation: Option<Navigation>,
}

/// Edge-triggered guard holding the previously classified state.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaffGuard {
    previous: Option<GuardState>,
}

impl StaffGuard {
    /// A guard that has observed nothing yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { previous: None }
    }

    /// A guard that already acted on `state`, e.g. because the page was
    /// rendered in it.
    #[must_use]
    pub const fn resume(state: GuardState) -> Self {
        Self {
            previous: Some(state),
        }
    }

    /// Last classified state.
    #[must_use]
    pub const fn state(&self) -> Option<GuardState> {
        self.previous
    }

    /// Classify `snapshot` and transition.
    pub fn observe(&mut self, snapshot: &AuthSnapshot) -> GuardDecision {
        let state = GuardState::classify(snapshot);
        let entered = self.previous != Some(state);
        self.previous = Some(state);

        GuardDecision {
            state,
            view: state.view(),
            entered,
            navigation: if entered { state.redirect() } else { None },
        }
    }
}
