//! Certificate service API client split into focused submodules.
//!
//! The `ApiClient` struct and its methods are organized by domain:
//! - [`auth`] - Session login and token handling
//! - [`certificates`] - Certificate CRUD, PDF fetching, roster upload
//! - [`groups`] - Course group management
//! - [`users`] - User account management

mod auth;
mod certificates;
mod groups;
mod users;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use certificates::DeleteOutcome;
pub use users::UserUpdate;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Client for the certificate service REST API (cloneable - shared state is Arc-wrapped)
///
/// One instance holds one session: [`login`](ApiClient::login) stores the
/// bearer token, and every subsequent call attaches it. The client is cheap to
/// clone; clones share the session token.
#[derive(Clone)]
pub struct ApiClient {
    /// Underlying HTTP client (connection pooling, timeout)
    http: reqwest::Client,
    /// Normalized base URL without trailing slash
    base_url: String,
    /// Bearer token for the current session, if logged in
    token: Arc<tokio::sync::RwLock<Option<String>>>,
}

/// Error body shape the backend uses for all failures
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    /// Create a client from the API configuration
    ///
    /// Validates the base URL up front so a typo fails here rather than on the
    /// first request.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| Error::Config {
            message: format!("invalid api.base_url '{}': {}", base_url, e),
            key: Some("api.base_url".to_string()),
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: Arc::new(tokio::sync::RwLock::new(None)),
        })
    }

    /// Build the absolute URL for an API path
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Restore a previously saved session token
    ///
    /// Useful when the embedding application persists sessions across
    /// restarts instead of logging in every time.
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    /// The current session token, if logged in
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Drop the current session token
    pub async fn logout(&self) {
        *self.token.write().await = None;
        tracing::info!("Session token cleared");
    }

    /// Get the session token or fail with an authentication error
    pub(crate) async fn require_token(&self) -> Result<String> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::Auth("no session token; call login first".to_string()))
    }

    /// Start an authenticated request to an API path
    pub(crate) async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder> {
        let token = self.require_token().await?;
        Ok(self
            .http
            .request(method, self.endpoint(path))
            .bearer_auth(token))
    }

    /// Turn a non-2xx response into an error, decoding the backend's
    /// `{"error": "..."}` body when present
    pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let fallback = format!("server error: {}", status.as_u16());
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => fallback,
        };

        Err(Error::from_status(status.as_u16(), message))
    }

    /// Send an authenticated request with no body and decode a JSON response
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<T> {
        let response = self.request(method, path).await?.send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Send an authenticated request with a JSON body and decode a JSON response
    pub(crate) async fn send_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.request(method, path).await?.json(body).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}
