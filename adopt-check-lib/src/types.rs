//! Core data types for membership checking.
//!
//! This module defines the per-user result, the run counters and the
//! configuration shared by the lookup client and the worker pool.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Group ID of the Adopt Me community group.
pub const ADOPT_ME_GROUP_ID: u64 = 5596394;

/// Base URL of the username resolution API.
pub const DEFAULT_USERS_API_URL: &str = "https://users.roblox.com";

/// Base URL of the group roles API.
pub const DEFAULT_GROUPS_API_URL: &str = "https://groups.roblox.com";

/// Browser-like User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Error text recorded when a username cannot be resolved to an ID.
pub const USER_NOT_FOUND: &str = "User not found";

/// Error text recorded when the group roles call fails.
pub const API_ERROR: &str = "API error";

/// Result of checking one username.
///
/// After a check completes either `user_id` is set and `is_member` is
/// meaningful, or `error` is set (`user_id` may still be present when the
/// membership call failed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The username as loaded from the input file
    pub username: String,

    /// Numeric user ID, if the name resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,

    /// Whether the user belongs to the target group
    pub is_member: bool,

    /// Why the check could not produce an answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    /// A fresh result for `username` with nothing determined yet.
    pub fn pending<S: Into<String>>(username: S) -> Self {
        Self {
            username: username.into(),
            user_id: None,
            is_member: false,
            error: None,
        }
    }

    /// Whether this result carries an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate counters for a run.
///
/// Only the consumption loop mutates these, once per consumed result, so
/// every field is monotonically non-decreasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub checked: usize,
    pub found: usize,
    pub errors: usize,
}

impl RunCounters {
    /// Fold one consumed result into the counters.
    pub fn record(&mut self, result: &CheckResult) {
        if result.is_member {
            self.found += 1;
        }
        if result.is_error() {
            self.errors += 1;
        }
        self.checked += 1;
    }

    /// Share of `total` that was found in the group, as a percentage.
    pub fn found_percentage(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.found as f64 / total as f64 * 100.0
        }
    }
}

/// Configuration options for a checking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Maximum number of concurrent checks
    /// Default: 10, Range: 1-100
    pub threads: usize,

    /// Pause a worker takes after each answered check
    /// Default: 100 milliseconds
    #[serde(skip)]
    pub delay: Duration,

    /// Timeout for each individual HTTP request
    /// Default: 10 seconds
    #[serde(skip)]
    pub timeout: Duration,

    /// The group membership is tested against
    pub group_id: u64,

    /// Base URL of the users API (name → ID)
    pub users_api_url: String,

    /// Base URL of the groups API (ID → group roles)
    pub groups_api_url: String,

    /// User-Agent header for all requests
    pub user_agent: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            threads: 10,
            delay: Duration::from_millis(100),
            timeout: Duration::from_secs(10),
            group_id: ADOPT_ME_GROUP_ID,
            users_api_url: DEFAULT_USERS_API_URL.to_string(),
            groups_api_url: DEFAULT_GROUPS_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CheckConfig {
    /// Set the number of concurrent workers.
    ///
    /// Automatically capped to 1..=100 to prevent resource exhaustion.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.clamp(1, 100);
        self
    }

    /// Set the per-worker pause after each answered check.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check membership of a different group.
    pub fn with_group_id(mut self, group_id: u64) -> Self {
        self.group_id = group_id;
        self
    }

    /// Point the client at different API hosts (mirrors, test servers).
    pub fn with_endpoints<U: Into<String>, G: Into<String>>(
        mut self,
        users_api_url: U,
        groups_api_url: G,
    ) -> Self {
        self.users_api_url = users_api_url.into();
        self.groups_api_url = groups_api_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(is_member: bool, error: Option<&str>) -> CheckResult {
        CheckResult {
            username: "someone".to_string(),
            user_id: Some(1),
            is_member,
            error: error.map(String::from),
        }
    }

    #[test]
    fn test_counters_record() {
        let mut counters = RunCounters::default();
        counters.record(&result(true, None));
        counters.record(&result(false, None));
        counters.record(&result(false, Some(API_ERROR)));

        assert_eq!(counters.checked, 3);
        assert_eq!(counters.found, 1);
        assert_eq!(counters.errors, 1);
        assert!(counters.errors <= counters.checked);
    }

    #[test]
    fn test_found_percentage() {
        let counters = RunCounters {
            checked: 2,
            found: 1,
            errors: 0,
        };
        assert_eq!(format!("{:.1}", counters.found_percentage(2)), "50.0");
        assert_eq!(counters.found_percentage(0), 0.0);
    }

    #[test]
    fn test_config_defaults() {
        let config = CheckConfig::default();
        assert_eq!(config.threads, 10);
        assert_eq!(config.delay, Duration::from_millis(100));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.group_id, 5596394);
    }

    #[test]
    fn test_with_threads_clamps() {
        assert_eq!(CheckConfig::default().with_threads(0).threads, 1);
        assert_eq!(CheckConfig::default().with_threads(500).threads, 100);
        assert_eq!(CheckConfig::default().with_threads(20).threads, 20);
    }
}
