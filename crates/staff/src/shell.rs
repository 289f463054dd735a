//! Root page shell.
//!
//! Every page template receives a [`Shell`]: page metadata, the analytics
//! script, the visitor's authentication snapshot and their session scope.
//! `templates/base.html` renders it into the document head.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use orderflow_core::{CurrencyCode, Locale};
use tower_sessions::Session;

use crate::auth::{AuthSnapshot, AuthStore, SnapshotProvider};
use crate::config::StaffConfig;
use crate::guard::GuardState;
use crate::models::{AuthKey, session_keys};
use crate::state::AppState;

/// Document metadata, declared once for the whole panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub title: &'static str,
    pub description: &'static str,
    /// Zoom is disabled: the panel runs on shared tablets at the pass.
    pub viewport: &'static str,
}

impl PageMeta {
    pub const DEFAULT: Self = Self {
        title: "Orderflow",
        description: "Restaurant QR ordering: live orders, tables and takings for your staff.",
        viewport: "width=device-width, initial-scale=1, maximum-scale=1, user-scalable=no",
    };
}

impl Default for PageMeta {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-visitor session scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionScope {
    /// Key of the visitor's live auth store, once they have one.
    pub key: Option<AuthKey>,
    pub locale: Locale,
    pub currency: CurrencyCode,
}

/// Root shell handed to every page template.
#[derive(Debug, Clone)]
pub struct Shell {
    pub meta: PageMeta,
    /// Heading for this page; the document title appends the panel name.
    pub heading: Option<String>,
    pub analytics_src: Option<String>,
    pub auth: AuthSnapshot,
    pub scope: SessionScope,
    /// Request path, for active navigation items.
    pub path: String,
    /// Guard state the page was rendered in, for the guard event script.
    pub guard: Option<GuardState>,
    store: AuthStore,
    session: Option<Session>,
}

impl Shell {
    /// Build the shell for one request.
    #[must_use]
    pub fn new(
        config: &StaffConfig,
        path: impl Into<String>,
        store: AuthStore,
        session: Option<Session>,
        key: Option<AuthKey>,
    ) -> Self {
        Self {
            meta: PageMeta::DEFAULT,
            heading: None,
            analytics_src: config.analytics_script_url.clone(),
            auth: store.snapshot(),
            scope: SessionScope {
                key,
                locale: config.display.locale,
                currency: config.display.currency,
            },
            path: path.into(),
            guard: None,
            store,
            session,
        }
    }

    /// Set the page heading.
    #[must_use]
    pub fn titled(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    /// Record the guard state the page is rendered in.
    #[must_use]
    pub fn guarded(mut self, state: GuardState) -> Self {
        self.guard = Some(state);
        self
    }

    /// Text for the `<title>` element.
    #[must_use]
    pub fn document_title(&self) -> String {
        match &self.heading {
            Some(heading) => format!("{heading} · {}", self.meta.title),
            None => self.meta.title.to_string(),
        }
    }

    /// The visitor's auth store.
    #[must_use]
    pub const fn store(&self) -> &AuthStore {
        &self.store
    }

    /// The visitor's session, when the session layer is installed.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether `href` is the current section.
    #[must_use]
    pub fn is_active(&self, href: &str) -> bool {
        if href == "/staff" {
            self.path == "/staff" || self.path == "/staff/"
        } else {
            self.path == href || self.path.starts_with(&format!("{href}/"))
        }
    }
}

impl FromRequestParts<AppState> for Shell {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().cloned();

        let (store, key) = match &session {
            Some(session) => match state.auth().resolve(session).await {
                Ok(store) => {
                    let key = session
                        .get::<AuthKey>(session_keys::AUTH_KEY)
                        .await
                        .ok()
                        .flatten();
                    (store, key)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to resolve auth store");
                    (AuthStore::signed_out(), None)
                }
            },
            None => (AuthStore::signed_out(), None),
        };

        Ok(Self::new(state.config(), parts.uri.path(), store, session, key))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::StaffConfig;

    /// Minimal configuration for rendering tests.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn test_config() -> StaffConfig {
        StaffConfig::from_lookup(|key| match key {
            "STAFF_DATABASE_URL" => Some("postgres://localhost/orderflow_staff_test".to_string()),
            "STAFF_BASE_URL" => Some("http://localhost:3002".to_string()),
            "ORDERFLOW_API_URL" => Some("http://127.0.0.1:9".to_string()),
            "ANALYTICS_SCRIPT_URL" => Some("https://plausible.io/js/script.js".to_string()),
            _ => None,
        })
        .unwrap()
    }

    /// A shell for `path` showing `snapshot`.
    pub(crate) fn shell_with(path: &str, snapshot: AuthSnapshot) -> Shell {
        Shell::new(&test_config(), path, AuthStore::new(snapshot), None, None)
    }

    #[test]
    fn test_meta_disables_zoom() {
        let shell = shell_with("/", AuthSnapshot::signed_out());
        assert!(shell.meta.viewport.contains("maximum-scale=1"));
        assert!(shell.meta.viewport.contains("user-scalable=no"));
        assert_eq!(shell.document_title(), "Orderflow");
        assert_eq!(shell.titled("Dashboard").document_title(), "Dashboard · Orderflow");
    }

    #[test]
    fn test_scope_follows_config() {
        let shell = shell_with("/", AuthSnapshot::signed_out());
        assert_eq!(shell.scope.locale, Locale::EnIn);
        assert_eq!(shell.scope.currency, CurrencyCode::INR);
        assert_eq!(
            shell.analytics_src.as_deref(),
            Some("https://plausible.io/js/script.js")
        );
    }

    #[test]
    fn test_active_section() {
        let shell = shell_with("/staff/profile", AuthSnapshot::signed_out());
        assert!(shell.is_active("/staff/profile"));
        assert!(!shell.is_active("/staff"));

        let shell = shell_with("/staff", AuthSnapshot::signed_out());
        assert!(shell.is_active("/staff"));
        assert!(!shell.is_active("/staff/profile"));
    }
}
