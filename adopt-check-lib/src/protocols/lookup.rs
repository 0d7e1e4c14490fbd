//! The lookup client used by workers.
//!
//! Wraps the users and groups endpoints behind two calls that never fail:
//! every error is logged and folded into a sentinel value. No call is ever
//! retried.

use crate::error::AdoptCheckError;
use crate::protocols::{GroupsClient, UsersClient};
use crate::types::CheckConfig;
use std::future::Future;
use std::time::Duration;

/// Shared, read-only client for both lookup steps.
///
/// Cloning is cheap: clones share one connection pool.
#[derive(Clone)]
pub struct LookupClient {
    users: UsersClient,
    groups: GroupsClient,
    group_id: u64,
    timeout: Duration,
}

impl LookupClient {
    /// Build a client from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns `AdoptCheckError::NetworkError` if the HTTP client cannot be
    /// constructed (e.g. TLS backend initialisation fails).
    pub fn with_config(config: &CheckConfig) -> Result<Self, AdoptCheckError> {
        // Buffer over the per-call timeout
        let http_timeout = config.timeout.saturating_add(Duration::from_secs(2));
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(http_timeout)
            .pool_max_idle_per_host(config.threads)
            .build()
            .map_err(|e| {
                AdoptCheckError::network_with_source("Failed to create HTTP client", e.to_string())
            })?;

        Ok(Self {
            users: UsersClient::new(http_client.clone(), config.users_api_url.clone()),
            groups: GroupsClient::new(http_client, config.groups_api_url.clone()),
            group_id: config.group_id,
            timeout: config.timeout,
        })
    }

    /// The group membership is tested against.
    pub fn group_id(&self) -> u64 {
        self.group_id
    }

    /// Step 1: resolve a username to its numeric ID.
    ///
    /// `None` means "not found", whether the API had no match or the call
    /// itself failed.
    pub async fn resolve_user_id(&self, username: &str) -> Option<u64> {
        match self
            .bounded("username lookup", self.users.lookup(username))
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(username, error = %e, "username lookup failed");
                None
            }
        }
    }

    /// Step 2: test whether `user_id` belongs to the target group.
    ///
    /// `None` is the "unknown" sentinel: the call failed, which says nothing
    /// about membership.
    pub async fn is_group_member(&self, user_id: u64) -> Option<bool> {
        match self
            .bounded(
                "group roles lookup",
                self.groups.is_member(user_id, self.group_id),
            )
            .await
        {
            Ok(member) => Some(member),
            Err(e) => {
                tracing::debug!(user_id, error = %e, "group roles lookup failed");
                None
            }
        }
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T, AdoptCheckError>
    where
        F: Future<Output = Result<T, AdoptCheckError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AdoptCheckError::timeout(operation, self.timeout)),
        }
    }
}
