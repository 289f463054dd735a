//! Orderflow backend API client.
//!
//! Talks to the Django backend that owns users, restaurants and orders.
//!
//! # Authentication
//!
//! - Email/password login returns an access/refresh JWT pair
//! - Every other call sends the access token as a bearer token
//! - An expired access token surfaces as [`BackendError::Unauthorized`];
//!   callers refresh and retry (see [`crate::auth::AuthService`])

pub mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{DashboardStats, HourlyOrders, LoginResponse, RefreshResponse};

use thiserror::Error;

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, body decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Login rejected.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Access token missing, expired or revoked.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
}

impl BackendError {
    /// Whether the error means the access token is no longer accepted.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Whether the backend could not be reached or answered with a 5xx.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}
