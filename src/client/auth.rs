//! Session login against the certificate service.

use super::ApiClient;
use crate::error::Result;
use crate::types::User;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    user: User,
    token: String,
}

impl ApiClient {
    /// Authenticate and store the session token
    ///
    /// On success the returned bearer token is kept inside the client and
    /// attached to every subsequent request. Returns the authenticated user so
    /// callers can gate functionality on [`crate::types::Role`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cert_desk::client::ApiClient;
    /// use cert_desk::config::ApiConfig;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::new(&ApiConfig::default())?;
    /// let user = client.login("admin", "secret").await?;
    /// if user.role.is_admin() {
    ///     // show user and group management
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let response = self
            .http
            .post(self.endpoint("auth/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let response = Self::check(response).await?;
        let body: LoginResponse = response.json().await?;

        *self.token.write().await = Some(body.token);
        tracing::info!(username = %body.user.username, role = ?body.user.role, "Logged in");

        Ok(body.user)
    }
}
