//! Error handling for membership checking operations.
//!
//! This module defines the error type shared by the input loader, the
//! lookup client, the result sink and the configuration layer.

use std::fmt;
use std::time::Duration;

/// Main error type for membership checking operations.
///
/// Per-user failures never surface through this type at the batch level:
/// the lookup client turns them into sentinels and the checker records them
/// in the row's `error` column. What remains here are fatal input/config
/// problems and the typed failures the client works with internally.
#[derive(Debug, Clone)]
pub enum AdoptCheckError {
    /// The input or output file could not be opened, read or written
    FileError { path: String, message: String },

    /// The input file was readable but could not be parsed as a table
    InputError { path: String, message: String },

    /// Network-related errors (connection refused, DNS, reset, etc.)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// The remote API answered with a non-success status
    ApiError {
        endpoint: String,
        message: String,
        status_code: Option<u16>,
    },

    /// JSON parsing errors for API responses
    ParseError { message: String },

    /// Configuration errors (invalid settings, unreadable config file)
    ConfigError { message: String },

    /// A request took longer than the per-request timeout
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl AdoptCheckError {
    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new input parsing error.
    pub fn input<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::InputError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new API error carrying the HTTP status code.
    pub fn api_with_status<E: Into<String>, M: Into<String>>(
        endpoint: E,
        message: M,
        status_code: u16,
    ) -> Self {
        Self::ApiError {
            endpoint: endpoint.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a new parse error.
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl fmt::Display for AdoptCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::InputError { path, message } => {
                write!(f, "Could not parse '{}': {}", path, message)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::ApiError {
                endpoint,
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "API error from {} (HTTP {}): {}", endpoint, code, message)
                } else {
                    write!(f, "API error from {}: {}", endpoint, message)
                }
            }
            Self::ParseError { message } => write!(f, "Parse error: {}", message),
            Self::ConfigError { message } => write!(f, "Configuration error: {}", message),
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for AdoptCheckError {}

impl From<reqwest::Error> for AdoptCheckError {
    fn from(err: reqwest::Error) -> Self {
        // The configured limit isn't known here; `LookupClient` reports
        // its own `Timeout` with the real duration.
        if err.is_timeout() {
            Self::network_with_source("HTTP request timed out", err.to_string())
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else if let Some(status) = err.status() {
            let endpoint = err
                .url()
                .map(|u| u.path().to_string())
                .unwrap_or_else(|| "unknown endpoint".to_string());
            Self::api_with_status(endpoint, err.to_string(), status.as_u16())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdoptCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(format!("JSON parsing failed: {}", err))
    }
}

impl From<csv::Error> for AdoptCheckError {
    fn from(err: csv::Error) -> Self {
        Self::Internal {
            message: format!("CSV error: {}", err),
        }
    }
}

impl From<std::io::Error> for AdoptCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}
