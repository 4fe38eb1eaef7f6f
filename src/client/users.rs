//! User account management.

use super::ApiClient;
use crate::error::Result;
use crate::types::{Role, User};
use reqwest::Method;
use serde::Serialize;

#[derive(Serialize)]
struct CreateUserRequest<'a> {
    username: &'a str,
    password: &'a str,
    role: Role,
}

/// Fields to change on an existing user account
///
/// Password and role are optional: omitting the password keeps the current
/// one, and role must be omitted when a user edits their own account (the
/// backend rejects self-service role changes).
#[derive(Clone, Debug, Serialize)]
pub struct UserUpdate {
    /// New login name
    pub username: String,
    /// New password, if it should change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// New role, if it should change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl ApiClient {
    /// List all user accounts
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.fetch_json(Method::GET, "users").await
    }

    /// Create a user account
    pub async fn create_user(&self, username: &str, password: &str, role: Role) -> Result<User> {
        let created: User = self
            .send_json(
                Method::POST,
                "users",
                &CreateUserRequest {
                    username,
                    password,
                    role,
                },
            )
            .await?;
        tracing::info!(username = %created.username, role = ?created.role, "User created");
        Ok(created)
    }

    /// Update a user account
    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User> {
        let updated: User = self
            .send_json(Method::PUT, &format!("users/{id}"), update)
            .await?;
        tracing::info!(username = %updated.username, "User updated");
        Ok(updated)
    }

    /// Delete a user account
    pub async fn delete_user(&self, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("users/{id}"))
            .await?
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(id = id, "User deleted");
        Ok(())
    }
}
