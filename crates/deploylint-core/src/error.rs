//! Error types for deploylint

use thiserror::Error;

/// Result type alias using the deploylint Error
pub type Result<T> = std::result::Result<T, Error>;

/// Deploylint error types
#[derive(Error, Debug)]
pub enum Error {
    // === API Errors ===
    #[error("API request failed: {0}")]
    ApiRequest(String),

    #[error("API error ({status}): {message}")]
    ApiStatus { status: u16, message: String },

    #[error("Request timed out after {seconds}s")]
    RequestTimeout { seconds: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    // === Check Errors ===
    #[error("Check failed: {check_id} - {message}")]
    CheckFailed { check_id: String, message: String },

    // === Execution Errors ===
    #[error("Execution aborted: {reason}")]
    ExecutionAborted { reason: String },

    #[error("Run deadline of {seconds}s exceeded")]
    DeadlineExceeded { seconds: u64 },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing required configuration: {key}")]
    MissingConfig { key: String },

    #[error("Invalid regular expression for {key}: {message}")]
    InvalidRegex { key: String, message: String },

    // === Responses ===
    #[error("Parse error: {0}")]
    Parse(String),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ApiRequest(_)
                | Error::RequestTimeout { .. }
                | Error::ApiStatus { status: 500..=599, .. }
                | Error::ApiStatus { status: 429, .. }
        )
    }

    /// Check if this error should stop the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ExecutionAborted { .. }
                | Error::DeadlineExceeded { .. }
                | Error::Configuration(_)
                | Error::MissingConfig { .. }
                | Error::AuthenticationFailed(_)
        )
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::ApiRequest(_) => "API_REQUEST",
            Error::ApiStatus { .. } => "API_STATUS",
            Error::RequestTimeout { .. } => "REQUEST_TIMEOUT",
            Error::AuthenticationFailed(_) => "AUTH_FAILED",
            Error::CheckFailed { .. } => "CHECK_FAILED",
            Error::ExecutionAborted { .. } => "EXECUTION_ABORTED",
            Error::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::MissingConfig { .. } => "MISSING_CONFIG",
            Error::InvalidRegex { .. } => "INVALID_REGEX",
            Error::Parse(_) => "PARSE_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::ApiRequest(String::from("connection reset")).is_retryable());
        assert!(Error::ApiStatus {
            status: 503,
            message: String::from("unavailable")
        }
        .is_retryable());
        assert!(!Error::ApiStatus {
            status: 404,
            message: String::from("not found")
        }
        .is_retryable());
        assert!(!Error::Configuration(String::from("bad config")).is_retryable());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::DeadlineExceeded { seconds: 60 }.is_fatal());
        assert!(!Error::CheckFailed {
            check_id: String::from("DL-SEC-001"),
            message: String::from("boom")
        }
        .is_fatal());
    }
}
