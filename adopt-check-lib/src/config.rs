//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `AC_*`
//! environment variables, and merging them with proper precedence rules.

use crate::error::AdoptCheckError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest accepted per-check delay, in seconds.
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Largest accepted per-request timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// threads = 20
/// delay = 0.05
/// timeout = "10s"
/// output = "results.csv"
///
/// [api]
/// group_id = 5596394
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Remote service settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Default worker count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    /// Default per-worker delay, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,

    /// Default request timeout (as string, e.g., "10s", "1m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Default output file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Remote endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager;

impl ConfigManager {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `FileError` if the file is missing or unreadable and
    /// `ConfigError` if it is not valid TOML or holds invalid values.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, AdoptCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(AdoptCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AdoptCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            AdoptCheckError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is the lowest, then the home directory, then the current
    /// directory. Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> FileConfig {
        let mut merged_config = FileConfig::default();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "loaded config file");
                    merged_config = self.merge_configs(merged_config, config);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                }
            }
        }

        merged_config
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./adopt-check.toml", "./.adopt-check.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the global configuration file path.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".adopt-check.toml", "adopt-check.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("adopt-check").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower_defaults), Some(higher_defaults)) => Some(DefaultsConfig {
                    threads: higher_defaults.threads.or(lower_defaults.threads),
                    delay: higher_defaults.delay.or(lower_defaults.delay),
                    timeout: higher_defaults.timeout.or(lower_defaults.timeout),
                    output: higher_defaults.output.or(lower_defaults.output),
                }),
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            api: match (lower.api, higher.api) {
                (Some(lower_api), Some(higher_api)) => Some(ApiConfig {
                    users_url: higher_api.users_url.or(lower_api.users_url),
                    groups_url: higher_api.groups_url.or(lower_api.groups_url),
                    group_id: higher_api.group_id.or(lower_api.group_id),
                    user_agent: higher_api.user_agent.or(lower_api.user_agent),
                }),
                (lower_api, higher_api) => higher_api.or(lower_api),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), AdoptCheckError> {
        if let Some(defaults) = &config.defaults {
            if let Some(threads) = defaults.threads {
                validate_threads(threads)?;
            }

            if let Some(delay) = defaults.delay {
                validate_delay(delay)?;
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(AdoptCheckError::config(format!(
                        "Invalid timeout format '{}'. Use format like '10s', '1m', '500ms'",
                        timeout_str
                    )));
                }
            }

            if let Some(output) = &defaults.output {
                if output.trim().is_empty() {
                    return Err(AdoptCheckError::config("Output path cannot be empty"));
                }
            }
        }

        if let Some(api) = &config.api {
            for url in [&api.users_url, &api.groups_url].into_iter().flatten() {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(AdoptCheckError::config(format!(
                        "API URL '{}' must start with http:// or https://",
                        url
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Worker count must be between 1 and 100.
pub fn validate_threads(threads: usize) -> Result<(), AdoptCheckError> {
    if threads == 0 || threads > 100 {
        return Err(AdoptCheckError::config("Threads must be between 1 and 100"));
    }
    Ok(())
}

/// Delay must be a finite number of seconds in `0..=MAX_DELAY_SECS`.
pub fn validate_delay(delay: f64) -> Result<(), AdoptCheckError> {
    if !delay.is_finite() || !(0.0..=MAX_DELAY_SECS).contains(&delay) {
        return Err(AdoptCheckError::config(format!(
            "Delay must be between 0 and {} seconds",
            MAX_DELAY_SECS
        )));
    }
    Ok(())
}

/// Environment variable configuration that mirrors CLI options.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub threads: Option<usize>,
    pub delay: Option<f64>,
    pub timeout: Option<Duration>,
    pub output: Option<String>,
    pub group_id: Option<u64>,
    pub users_url: Option<String>,
    pub groups_url: Option<String>,
    pub config: Option<String>,
}

/// Load configuration from `AC_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Same as [`load_env_config`], reading variables through `lookup`.
pub fn load_env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = lookup("AC_THREADS") {
        match val.trim().parse::<usize>() {
            Ok(threads) if validate_threads(threads).is_ok() => {
                env_config.threads = Some(threads);
            }
            _ => tracing::warn!(value = %val, "invalid AC_THREADS, must be 1-100"),
        }
    }

    if let Some(val) = lookup("AC_DELAY") {
        match val.trim().parse::<f64>() {
            Ok(delay) if validate_delay(delay).is_ok() => env_config.delay = Some(delay),
            _ => tracing::warn!(value = %val, "invalid AC_DELAY, must be 0-3600 seconds"),
        }
    }

    if let Some(val) = lookup("AC_TIMEOUT") {
        match parse_timeout_string(&val) {
            Some(timeout) => env_config.timeout = Some(timeout),
            None => tracing::warn!(value = %val, "invalid AC_TIMEOUT, use '10s', '1m', '500ms'"),
        }
    }

    if let Some(val) = lookup("AC_GROUP_ID") {
        match val.trim().parse::<u64>() {
            Ok(group_id) => env_config.group_id = Some(group_id),
            Err(_) => tracing::warn!(value = %val, "invalid AC_GROUP_ID"),
        }
    }

    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    env_config.output = non_empty("AC_OUTPUT");
    env_config.users_url = non_empty("AC_USERS_API_URL");
    env_config.groups_url = non_empty("AC_GROUPS_API_URL");
    env_config.config = non_empty("AC_CONFIG");

    env_config
}

/// Parse a timeout like "10s", "2m", "500ms" or a bare number of seconds.
///
/// Zero and anything above [`MAX_TIMEOUT`] are rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let parsed = if let Some(ms) = timeout_str.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    };

    // A zero timeout would fail every request
    parsed.filter(|d| !d.is_zero() && *d <= MAX_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("10s"), Some(Duration::from_secs(10)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout_string("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_timeout_string("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("0s"), None);
        assert_eq!(parse_timeout_string("invalid"), None);
    }

    #[test]
    fn test_parse_timeout_string_bounds() {
        assert_eq!(parse_timeout_string("60m"), Some(MAX_TIMEOUT));
        assert_eq!(parse_timeout_string("3601s"), None);
        assert_eq!(parse_timeout_string("18446744073709551615s"), None);
        assert_eq!(parse_timeout_string("18446744073709551615m"), None);
        assert_eq!(parse_timeout_string("18446744073709551615"), None);
    }

    #[test]
    fn test_validate_delay_bounds() {
        assert!(validate_delay(0.0).is_ok());
        assert!(validate_delay(MAX_DELAY_SECS).is_ok());
        assert!(validate_delay(MAX_DELAY_SECS + 1.0).is_err());
        assert!(validate_delay(1e20).is_err());
        assert!(validate_delay(f64::INFINITY).is_err());
        assert!(validate_delay(-0.5).is_err());
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
threads = 20
delay = 0.25
timeout = "15s"
output = "out.csv"

[api]
group_id = 42
groups_url = "http://localhost:8080"
"#,
        );

        let config = ConfigManager::new().load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.threads, Some(20));
        assert_eq!(defaults.delay, Some(0.25));
        assert_eq!(defaults.timeout.as_deref(), Some("15s"));
        assert_eq!(defaults.output.as_deref(), Some("out.csv"));

        let api = config.api.unwrap();
        assert_eq!(api.group_id, Some(42));
        assert_eq!(api.groups_url.as_deref(), Some("http://localhost:8080"));
        assert!(api.users_url.is_none());
    }

    #[test]
    fn test_invalid_threads() {
        let temp_file = write_config("[defaults]\nthreads = 0\n");
        let result = ConfigManager::new().load_file(temp_file.path());
        assert!(matches!(result, Err(AdoptCheckError::ConfigError { .. })));
    }

    #[test]
    fn test_negative_delay_rejected() {
        let temp_file = write_config("[defaults]\ndelay = -1.0\n");
        assert!(ConfigManager::new().load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_bad_url_rejected() {
        let temp_file = write_config("[api]\nusers_url = \"users.example.com\"\n");
        assert!(ConfigManager::new().load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let temp_file = write_config("[defaults\nthreads = ");
        let err = ConfigManager::new().load_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigManager::new()
            .load_file("/no/such/adopt-check.toml")
            .unwrap_err();
        assert!(matches!(err, AdoptCheckError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new();

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                threads: Some(10),
                output: Some("lower.csv".to_string()),
                ..Default::default()
            }),
            api: Some(ApiConfig {
                group_id: Some(1),
                ..Default::default()
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                threads: Some(25),
                delay: Some(0.5),
                ..Default::default()
            }),
            api: None,
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.threads, Some(25)); // Higher wins
        assert_eq!(defaults.delay, Some(0.5));
        assert_eq!(defaults.output.as_deref(), Some("lower.csv")); // Lower preserved
        assert_eq!(merged.api.unwrap().group_id, Some(1));
    }

    #[test]
    fn test_env_config_parsing() {
        let vars: HashMap<&str, &str> = [
            ("AC_THREADS", "15"),
            ("AC_DELAY", "0.2"),
            ("AC_TIMEOUT", "3s"),
            ("AC_GROUP_ID", "99"),
            ("AC_OUTPUT", "env.csv"),
            ("AC_USERS_API_URL", "http://127.0.0.1:1"),
        ]
        .into_iter()
        .collect();

        let env_config = load_env_config_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(env_config.threads, Some(15));
        assert_eq!(env_config.delay, Some(0.2));
        assert_eq!(env_config.timeout, Some(Duration::from_secs(3)));
        assert_eq!(env_config.group_id, Some(99));
        assert_eq!(env_config.output.as_deref(), Some("env.csv"));
        assert_eq!(env_config.users_url.as_deref(), Some("http://127.0.0.1:1"));
        assert!(env_config.groups_url.is_none());
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let vars: HashMap<&str, &str> = [
            ("AC_THREADS", "0"),
            ("AC_DELAY", "1e20"),
            ("AC_TIMEOUT", "soon"),
            ("AC_GROUP_ID", "-5"),
            ("AC_OUTPUT", "   "),
        ]
        .into_iter()
        .collect();

        let env_config = load_env_config_from(|key| vars.get(key).map(|v| v.to_string()));

        assert!(env_config.threads.is_none());
        assert!(env_config.delay.is_none());
        assert!(env_config.timeout.is_none());
        assert!(env_config.group_id.is_none());
        assert!(env_config.output.is_none());
    }
}
