//! Username resolution against the users API.
//!
//! The users API resolves a batch of usernames to numeric user IDs with a
//! single POST. We always send a batch of one so that each check stays
//! independent of the others.

use crate::error::AdoptCheckError;
use serde::{Deserialize, Serialize};

/// Path of the username lookup endpoint, relative to the users API base.
pub const USERNAMES_PATH: &str = "/v1/usernames/users";

#[derive(Debug, Serialize)]
struct UsernamesRequest<'a> {
    usernames: [&'a str; 1],
    #[serde(rename = "excludeBannedUsers")]
    exclude_banned_users: bool,
}

/// Response body of the username lookup endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct UsernamesResponse {
    #[serde(default)]
    pub data: Vec<ResolvedUser>,
}

/// One matched user in a lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedUser {
    #[serde(default)]
    pub id: u64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "requestedUsername")]
    pub requested_username: Option<String>,
}

/// HTTP client for the username lookup endpoint.
#[derive(Clone)]
pub struct UsersClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl UsersClient {
    /// Create a client that shares `http_client`'s connection pool.
    pub fn new<S: Into<String>>(http_client: reqwest::Client, base_url: S) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Full URL of the lookup endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), USERNAMES_PATH)
    }

    /// Resolve `username` to its numeric ID.
    ///
    /// Returns `Ok(None)` when the API has no match for the name.
    ///
    /// # Errors
    ///
    /// Returns `AdoptCheckError` on connection failures, non-success HTTP
    /// statuses and malformed JSON.
    pub async fn lookup(&self, username: &str) -> Result<Option<u64>, AdoptCheckError> {
        let url = self.endpoint();
        let body = UsernamesRequest {
            usernames: [username],
            exclude_banned_users: false,
        };

        tracing::debug!(%url, username, "resolving username");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        tracing::trace!(username, body = %String::from_utf8_lossy(&bytes), "lookup response");

        let parsed: UsernamesResponse = serde_json::from_slice(&bytes)?;
        Ok(first_user_id(&parsed))
    }
}

/// ID of the first match, treating a zero ID as no match.
pub fn first_user_id(response: &UsernamesResponse) -> Option<u64> {
    response.data.first().map(|u| u.id).filter(|&id| id != 0)
}
