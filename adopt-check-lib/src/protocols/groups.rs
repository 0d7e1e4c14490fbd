//! Group role lookups against the groups API.

use crate::error::AdoptCheckError;
use serde::Deserialize;

/// Response body of `GET /v1/users/{id}/groups/roles`.
#[derive(Debug, Default, Deserialize)]
pub struct GroupRolesResponse {
    #[serde(default)]
    pub data: Vec<GroupMembership>,
}

/// One group the user belongs to, with their role in it.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupMembership {
    #[serde(default)]
    pub group: Option<GroupRef>,

    #[serde(default)]
    pub role: Option<RoleRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupRef {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleRef {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub rank: Option<u32>,
}

impl GroupRolesResponse {
    /// The membership entry for `group_id`, if present.
    pub fn find_group(&self, group_id: u64) -> Option<&GroupMembership> {
        self.data
            .iter()
            .find(|m| m.group.as_ref().and_then(|g| g.id) == Some(group_id))
    }
}

/// HTTP client for the group roles endpoint.
#[derive(Clone)]
pub struct GroupsClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GroupsClient {
    /// Create a client that shares `http_client`'s connection pool.
    pub fn new<S: Into<String>>(http_client: reqwest::Client, base_url: S) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Full URL of the roles endpoint for `user_id`.
    pub fn endpoint(&self, user_id: u64) -> String {
        format!(
            "{}/v1/users/{}/groups/roles",
            self.base_url.trim_end_matches('/'),
            user_id
        )
    }

    /// Fetch every group `user_id` holds a role in.
    pub async fn roles(&self, user_id: u64) -> Result<GroupRolesResponse, AdoptCheckError> {
        let url = self.endpoint(user_id);
        tracing::debug!(%url, user_id, "fetching group roles");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Whether `user_id` holds any role in `group_id`.
    pub async fn is_member(&self, user_id: u64, group_id: u64) -> Result<bool, AdoptCheckError> {
        let roles = self.roles(user_id).await?;

        match roles.find_group(group_id) {
            Some(membership) => {
                let role = membership.role.as_ref().and_then(|r| r.name.as_deref());
                tracing::trace!(user_id, group_id, role, "member of target group");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
