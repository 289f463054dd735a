//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

orderflow_core::define_id!(AuthKey);

/// Backend JWT pair issued at login.
///
/// Implements `Debug` manually to redact both tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Short-lived bearer token for API calls.
    pub access: String,
    /// Long-lived token exchanged for a new access token.
    pub refresh: String,
}

impl SessionTokens {
    /// Apply a refresh response. The backend may rotate the refresh token.
    #[must_use]
    pub fn refreshed(self, access: String, refresh: Option<String>) -> Self {
        Self {
            access,
            refresh: refresh.unwrap_or(self.refresh),
        }
    }
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the per-session auth store key.
    pub const AUTH_KEY: &str = "auth_key";

    /// Key for the backend token pair.
    pub const TOKENS: &str = "auth_tokens";

    /// Key for the last known current user.
    pub const CURRENT_USER: &str = "current_user";
}
