//! Course group management.

use super::ApiClient;
use crate::error::Result;
use crate::types::{Group, GroupDraft};
use reqwest::Method;

impl ApiClient {
    /// List all course groups
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        self.fetch_json(Method::GET, "groups").await
    }

    /// Create a course group
    ///
    /// The group code is derived by the backend from the level, start date and
    /// time slot of the draft.
    pub async fn create_group(&self, draft: &GroupDraft) -> Result<Group> {
        let created: Group = self.send_json(Method::POST, "groups", draft).await?;
        tracing::info!(group_code = %created.group_code, "Group created");
        Ok(created)
    }

    /// Update an existing course group
    pub async fn update_group(&self, id: &str, draft: &GroupDraft) -> Result<Group> {
        let updated: Group = self
            .send_json(Method::PUT, &format!("groups/{id}"), draft)
            .await?;
        tracing::info!(group_code = %updated.group_code, "Group updated");
        Ok(updated)
    }

    /// Delete a course group
    pub async fn delete_group(&self, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("groups/{id}"))
            .await?
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(id = id, "Group deleted");
        Ok(())
    }
}
