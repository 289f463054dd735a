//! Orderflow backend HTTP client.

use std::sync::Arc;

use orderflow_core::RestaurantId;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::BackendError;
use super::types::{
    DashboardStats, ErrorBody, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse,
};
use crate::config::BackendConfig;
use crate::models::CurrentUser;

const LOGIN_PATH: &str = "api/auth/login/";
const ME_PATH: &str = "api/auth/me/";
const REFRESH_PATH: &str = "api/auth/token/refresh/";
const LOGOUT_PATH: &str = "api/auth/logout/";
const DASHBOARD_PATH: &str = "api/analytics/dashboard/";

/// Orderflow backend API client.
///
/// Stateless apart from the connection pool: tokens are passed per call so
/// one client serves every session.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("orderflow-staff/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(path)?)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange email and password for a token pair and the user profile.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidCredentials` if the backend rejects the
    /// credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, BackendError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&LoginRequest { email, password });

        match send_json(request).await {
            Err(BackendError::Unauthorized) => Err(BackendError::InvalidCredentials(
                "No active account found with the given credentials".to_string(),
            )),
            Err(BackendError::Status { status, message })
                if status == StatusCode::BAD_REQUEST =>
            {
                Err(BackendError::InvalidCredentials(message))
            }
            other => other,
        }
    }

    /// Fetch the profile of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` if the access token is not accepted.
    #[instrument(skip_all)]
    pub async fn me(&self, access: &str) -> Result<CurrentUser, BackendError> {
        let request = self
            .inner
            .client
            .get(self.endpoint(ME_PATH)?)
            .bearer_auth(access);
        send_json(request).await
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` if the refresh token is expired or
    /// blacklisted.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh: &str) -> Result<RefreshResponse, BackendError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(REFRESH_PATH)?)
            .json(&RefreshRequest { refresh });
        send_json(request).await
    }

    /// Blacklist the refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend does not acknowledge the logout.
    #[instrument(skip_all)]
    pub async fn logout(&self, access: &str, refresh: &str) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(LOGOUT_PATH)?)
            .bearer_auth(access)
            .json(&RefreshRequest { refresh });
        check_status(request.send().await?).await?;
        Ok(())
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    /// Fetch today's dashboard stats for a restaurant the user owns.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the restaurant does not belong to
    /// the user.
    #[instrument(skip(self, access), fields(restaurant = %restaurant))]
    pub async fn dashboard_stats(
        &self,
        access: &str,
        restaurant: RestaurantId,
    ) -> Result<DashboardStats, BackendError> {
        let mut url = self.endpoint(DASHBOARD_PATH)?;
        url.query_pairs_mut()
            .append_pair("restaurant", &restaurant.to_string());

        let request = self.inner.client.get(url).bearer_auth(access);
        send_json(request).await
    }
}

/// Send a request and decode a JSON success body.
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
    let response = check_status(request.send().await?).await?;
    Ok(response.json().await?)
}

/// Map non-success statuses to `BackendError`.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                text
            }
        });

    tracing::debug!(%status, %message, "Backend returned error status");

    Err(status_error(status, message))
}

fn status_error(status: StatusCode, message: String) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
        StatusCode::FORBIDDEN => BackendError::Forbidden(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        _ => BackendError::Status { status, message },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            api_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoints_join_under_base() {
        let client = client("https://api.orderflow.app/");
        assert_eq!(
            client.endpoint(LOGIN_PATH).unwrap().as_str(),
            "https://api.orderflow.app/api/auth/login/"
        );
        assert_eq!(
            client.endpoint(REFRESH_PATH).unwrap().as_str(),
            "https://api.orderflow.app/api/auth/token/refresh/"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::UNAUTHORIZED, String::new()).is_unauthorized());
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "Owner only".to_string()),
            BackendError::Forbidden(m) if m == "Owner only"
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "Restaurant not found.".to_string()),
            BackendError::NotFound(_)
        ));

        let bad_gateway = status_error(StatusCode::BAD_GATEWAY, "upstream".to_string());
        assert!(bad_gateway.is_unavailable());
        assert_eq!(bad_gateway.to_string(), "HTTP 502 Bad Gateway: upstream");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unavailable() {
        // Port 9 (discard) on localhost is closed in test environments.
        let client = client("http://127.0.0.1:9/");
        let err = client.me("token").await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
