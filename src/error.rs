//! Error types for CommitBoard
//!
//! Defines a single error enum covering all failure modes across the system.
//! Uses thiserror for ergonomic error handling.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for CommitBoard operations
pub type Result<T> = std::result::Result<T, CommitBoardError>;

/// Error type for CommitBoard operations
#[derive(Error, Debug)]
pub enum CommitBoardError {
    /// Configuration errors (load, validation, backend construction).
    /// Surfaced at startup and never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query window with `to` earlier than `from`. Raised before any
    /// backend is queried.
    #[error("Invalid window: 'to' ({to}) is earlier than 'from' ({from})")]
    InvalidWindow {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    /// One specific backend could not be queried (network failure,
    /// backend-side error, timeout). Carries the backend's identity.
    #[error("Backend '{backend}' unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Git library errors
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CommitBoardError {
    /// Wrap any error as a `BackendUnavailable` for the named backend.
    pub fn unavailable(backend: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::BackendUnavailable {
            backend: backend.into(),
            reason: cause.to_string(),
        }
    }
}

impl crate::backends::retry::RetryableError for CommitBoardError {
    fn retry_decision(&self) -> crate::backends::retry::RetryDecision {
        use crate::backends::retry::RetryDecision;
        use std::time::Duration;

        match self {
            CommitBoardError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    RetryDecision::Retry
                } else if let Some(status) = e.status() {
                    match status.as_u16() {
                        429 => RetryDecision::RetryAfter(Duration::from_secs(60)),
                        500..=599 => RetryDecision::Retry,
                        _ => RetryDecision::NoRetry,
                    }
                } else {
                    RetryDecision::NoRetry
                }
            }
            CommitBoardError::Other(msg) => {
                // Errors synthesized from non-2xx responses keep the status
                // text; classify the transient ones.
                if msg.contains("HTTP 429") || msg.contains("rate limit") {
                    RetryDecision::RetryAfter(Duration::from_secs(60))
                } else if msg.contains("HTTP 5") {
                    RetryDecision::Retry
                } else {
                    RetryDecision::NoRetry
                }
            }
            // Everything else is permanent: config problems, invalid
            // windows, parse failures, local git errors.
            _ => RetryDecision::NoRetry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::retry::{RetryDecision, RetryableError};

    #[test]
    fn test_unavailable_carries_identity_and_cause() {
        let err = CommitBoardError::unavailable("work-github", "connection refused");
        match &err {
            CommitBoardError::BackendUnavailable { backend, reason } => {
                assert_eq!(backend, "work-github");
                assert_eq!(reason, "connection refused");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("work-github"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_config_error_is_permanent() {
        let err = CommitBoardError::Config("no sources".to_string());
        assert_eq!(err.retry_decision(), RetryDecision::NoRetry);
    }

    #[test]
    fn test_synthesized_server_error_retries() {
        let err = CommitBoardError::Other("GitHub API error: HTTP 503: upstream".to_string());
        assert_eq!(err.retry_decision(), RetryDecision::Retry);
    }

    #[test]
    fn test_synthesized_rate_limit_backs_off() {
        let err = CommitBoardError::Other("GitLab API error: HTTP 429: slow down".to_string());
        assert!(matches!(err.retry_decision(), RetryDecision::RetryAfter(_)));
    }
}
