//! Core error types for the studio client.
//!
//! Transport-level failures never surface here; the HTTP client folds them
//! into an [`ApiResponse`](crate::http::ApiResponse) envelope. `CoreError` is
//! what callers see when they opt into typed results, and what the stream
//! coordinator hands to [`JobStreamHandler::on_error`](crate::streaming::JobStreamHandler::on_error).

use serde::{Deserialize, Serialize};
use studio_core_types::ErrorPayload;
use thiserror::Error;

/// Failed API call with its status and structured payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorInfo {
    /// HTTP status code, or 0 when the server was never reached.
    pub status: u16,
    /// Structured error payload from the envelope.
    pub payload: ErrorPayload,
}

impl std::fmt::Display for ApiErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.status == 0 {
            write!(f, "{}", self.payload)
        } else {
            write!(f, "HTTP {}: {}", self.status, self.payload)
        }
    }
}

/// Job-scoped failure reported by the server or the live channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobErrorInfo {
    /// Job ID that failed
    pub job_id: String,
    /// Error message
    pub message: String,
    /// Optional error code
    pub code: Option<String>,
}

impl std::fmt::Display for JobErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job {}: {}", self.job_id, self.message)?;
        if let Some(ref code) = self.code {
            write!(f, " (code: {})", code)?;
        }
        Ok(())
    }
}

/// Unified error enum for the studio core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing failed
    #[error("url parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// HTTP request failed (network layer)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// API call completed with `ok == false`
    #[error("{0}")]
    Api(ApiErrorInfo),

    /// Job operation failed
    #[error("{0}")]
    Job(JobErrorInfo),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Protocol/wire format error
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The operation needs a runtime capability that is not available
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl CoreError {
    /// Create an API error from an envelope's status and payload.
    pub fn api(status: u16, payload: ErrorPayload) -> Self {
        CoreError::Api(ApiErrorInfo { status, payload })
    }

    /// Create a job error.
    pub fn job(job_id: &str, message: &str, code: Option<&str>) -> Self {
        CoreError::Job(JobErrorInfo {
            job_id: job_id.to_string(),
            message: message.to_string(),
            code: code.map(String::from),
        })
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        CoreError::Config(message.into())
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        CoreError::Protocol(message.into())
    }

    /// Check if this is a retryable error (5xx, network).
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Api(info) => info.status == 0 || info.status >= 500,
            CoreError::Http(_) => true,
            _ => false,
        }
    }

    /// Get HTTP status code if this is an HTTP error.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            CoreError::Api(info) if info.status != 0 => Some(info.status),
            CoreError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The structured payload, if this error came from an envelope.
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            CoreError::Api(info) => Some(&info.payload),
            _ => None,
        }
    }
}

/// Result type alias using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = CoreError::api(404, ErrorPayload::new("job_not_found"));
        let msg = format!("{}", err);
        assert!(msg.contains("404"));
        assert!(msg.contains("job_not_found"));
    }

    #[test]
    fn test_network_error_display_has_no_status() {
        let payload = ErrorPayload::network("http://localhost:4020/v1/health", "refused", None);
        let msg = CoreError::api(0, payload).to_string();
        assert!(!msg.contains("HTTP"));
        assert!(msg.contains("network_error"));
    }

    #[test]
    fn test_retryable() {
        assert!(CoreError::api(500, ErrorPayload::http_error("boom")).is_retryable());
        assert!(CoreError::api(0, ErrorPayload::new("network_error")).is_retryable());
        assert!(!CoreError::api(404, ErrorPayload::new("job_not_found")).is_retryable());
        assert!(!CoreError::job("job-1", "job_not_found", None).is_retryable());
    }

    #[test]
    fn test_http_status() {
        let err = CoreError::api(403, ErrorPayload::new("forbidden"));
        assert_eq!(err.http_status(), Some(403));
        assert_eq!(CoreError::api(0, ErrorPayload::new("network_error")).http_status(), None);
        assert_eq!(CoreError::config("missing").http_status(), None);
    }

    #[test]
    fn test_job_error_display() {
        let err = CoreError::job("job-7", "job_not_found", Some("stream"));
        assert_eq!(err.to_string(), "job job-7: job_not_found (code: stream)");
    }
}
