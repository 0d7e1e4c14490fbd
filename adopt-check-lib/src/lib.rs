//! # Adopt Check Library
//!
//! Batch-verifies whether user accounts belong to a group (by default the
//! Adopt Me community group) and records one CSV row per user.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adopt_check_lib::{load_usernames, CheckConfig, MembershipChecker, ResultSink, RunCounters};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let usernames = load_usernames("players.csv")?;
//!     let checker = MembershipChecker::with_config(CheckConfig::default())?;
//!     let mut sink = ResultSink::create("adopt_me_results.csv")?;
//!     let mut counters = RunCounters::default();
//!
//!     let mut results = checker.check_users_stream(&usernames);
//!     while let Some(result) = results.next().await {
//!         sink.write_result(&result)?;
//!         counters.record(&result);
//!     }
//!     println!("found {} of {}", counters.found, counters.checked);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Input loading**: plain lists or delimited tables with a username column
//! - **Lookups**: username → user ID → group roles, failures become sentinels
//! - **Worker pool**: bounded concurrency, results in completion order
//! - **Output**: rows flushed as they arrive, so partial runs stay usable

pub use checker::MembershipChecker;
pub use concurrent::ConcurrentProcessor;
pub use config::{
    load_env_config, load_env_config_from, parse_timeout_string, validate_delay,
    validate_threads, ApiConfig, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
    MAX_DELAY_SECS, MAX_TIMEOUT,
};
pub use error::AdoptCheckError;
pub use input::{detect_format, load_usernames, parse_usernames, InputFormat, USERNAME_COLUMNS};
pub use output::{format_row, ResultSink, OUTPUT_HEADER};
pub use progress::{format_short_duration, ProgressSnapshot, ProgressTracker};
pub use protocols::LookupClient;
pub use types::{
    CheckConfig, CheckResult, RunCounters, ADOPT_ME_GROUP_ID, API_ERROR, DEFAULT_GROUPS_API_URL,
    DEFAULT_USERS_API_URL, DEFAULT_USER_AGENT, USER_NOT_FOUND,
};

// Public modules
pub mod protocols;

// Internal modules - these are not part of the public API
mod checker;
mod concurrent;
mod config;
mod error;
mod input;
mod output;
mod progress;
mod types;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, AdoptCheckError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
