//! Per-user membership checks and the worker pool that runs them.
//!
//! This module provides the `MembershipChecker` that turns a username into a
//! `CheckResult`, plus the streaming entry point that runs many checks with
//! bounded concurrency.

use crate::concurrent::ConcurrentProcessor;
use crate::error::AdoptCheckError;
use crate::protocols::LookupClient;
use crate::types::{CheckConfig, CheckResult, API_ERROR, USER_NOT_FOUND};
use futures::future::FutureExt;
use futures::stream::{Stream, StreamExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

/// Checks usernames against the target group.
///
/// # Example
///
/// ```rust,no_run
/// use adopt_check_lib::{CheckConfig, MembershipChecker};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = MembershipChecker::with_config(CheckConfig::default())?;
///     let result = checker.check_user("builderman").await;
///     println!("{}: member={} error={:?}", result.username, result.is_member, result.error);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct MembershipChecker {
    config: CheckConfig,
    client: LookupClient,
}

impl MembershipChecker {
    /// Create a checker with the given configuration.
    pub fn with_config(config: CheckConfig) -> Result<Self, AdoptCheckError> {
        let client = LookupClient::with_config(&config)?;
        Ok(Self { config, client })
    }

    /// Get the configuration for this checker.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check a single username.
    ///
    /// Never fails: lookup failures become "User not found" or "API error",
    /// and a panic inside the check is recorded as the row's error message.
    pub async fn check_user(&self, username: &str) -> CheckResult {
        contain_panic(username, self.run_check(username)).await
    }

    async fn run_check(&self, username: &str) -> CheckResult {
        let mut result = CheckResult::pending(username);

        let Some(user_id) = self.client.resolve_user_id(username).await else {
            result.error = Some(USER_NOT_FOUND.to_string());
            return result;
        };
        result.user_id = Some(user_id);

        match self.client.is_group_member(user_id).await {
            Some(member) => result.is_member = member,
            None => {
                result.error = Some(API_ERROR.to_string());
                return result;
            }
        }

        // Per-worker pacing, only once membership is known
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }

        result
    }

    /// Check usernames concurrently, yielding results in completion order.
    ///
    /// At most `config.threads` checks are in flight. Every username yields
    /// exactly one result, duplicates included.
    pub fn check_users_stream<'a>(
        &'a self,
        usernames: &'a [String],
    ) -> Pin<Box<dyn Stream<Item = CheckResult> + Send + 'a>> {
        let processor = ConcurrentProcessor::new(self.config.threads);
        tracing::debug!(
            users = usernames.len(),
            workers = processor.max_concurrency(),
            "starting checks"
        );
        Box::pin(processor.process_unordered(usernames.iter(), move |name| self.check_user(name)))
    }

    /// Check usernames concurrently and collect every result.
    ///
    /// Results are in completion order, not input order.
    pub async fn check_users(&self, usernames: &[String]) -> Vec<CheckResult> {
        self.check_users_stream(usernames).collect().await
    }
}

/// Run `check`, turning a panic into a result for `username` that carries
/// the panic message as its error.
async fn contain_panic<F>(username: &str, check: F) -> CheckResult
where
    F: Future<Output = CheckResult>,
{
    match AssertUnwindSafe(check).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::warn!(username, %message, "check panicked");
            CheckResult {
                error: Some(message),
                ..CheckResult::pending(username)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked".to_string()
    }
}
