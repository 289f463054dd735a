//! Unified error handling for the staff panel.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use orderflow_core::UserId;
use thiserror::Error;

use crate::auth::AuthError;
use crate::backend::BackendError;

/// Application-level error type for the staff panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Backend API call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::Backend(e)) | Self::Backend(e) => backend_status(e),
            Self::Auth(AuthError::SignedOut) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::Session(_)) | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn backend_status(error: &BackendError) -> StatusCode {
    match error {
        BackendError::Unauthorized | BackendError::InvalidCredentials(_) => {
            StatusCode::UNAUTHORIZED
        }
        BackendError::Forbidden(_) => StatusCode::FORBIDDEN,
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
        BackendError::Http(_) | BackendError::Url(_) | BackendError::Status { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // A session that lost its tokens starts over at the login page.
        if matches!(self, Self::Auth(AuthError::SignedOut)) {
            return Redirect::to("/login").into_response();
        }

        let status = self.status();
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Staff request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
                "Orderflow is unreachable right now".to_string()
            }
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Set the Sentry user context for a signed-in staff member.
pub fn set_sentry_user(user_id: UserId, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use axum::http::header;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Backend(BackendError::Forbidden("owner only".to_string()));
        assert!(err.to_string().starts_with("Backend error:"));
        assert!(err.to_string().contains("owner only"));
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Backend(BackendError::NotFound("test".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Backend(BackendError::Unauthorized))),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Forbidden("owner only".to_string()))),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                message: "maintenance".to_string(),
            })),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Status {
                status: reqwest::StatusCode::IM_A_TEAPOT,
                message: "teapot".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_signed_out_redirects_to_login() {
        let response = AppError::Auth(AuthError::SignedOut).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }
}
