//! Error types for all dashgen crates.

use std::time::Duration;

/// Errors that terminate a streaming session.
///
/// Cancellation is deliberately absent: a cancelled session stops silently
/// and is never reported through this type.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The backend answered with a non-success status.
    ///
    /// `message` comes from the response body's `message` or `error` field
    /// when present, otherwise from the HTTP status text.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Human-readable description.
        message: String,
    },
    /// Network-level failure (connection refused, reset, DNS, ...).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The transport gave up waiting.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// The response body could not be read.
    #[error("response body is not readable: {0}")]
    BodyUnreadable(String),
    /// The request failed local validation or could not be serialized.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl StreamError {
    /// Whether a brand-new attempt with the same request could succeed.
    ///
    /// The streaming layer never retries on its own; this is a hint for the
    /// caller's retry policy.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::BodyUnreadable(_) => true,
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::InvalidRequest(_) => false,
        }
    }

    /// The HTTP status, if this error came from a non-success response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from generation-history storage.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No entry with the given id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A write operation failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_bare_message() {
        let err = StreamError::Http {
            status: 500,
            message: "quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn server_errors_are_retryable() {
        for status in [429, 500, 502, 503, 599] {
            let err = StreamError::Http {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "status {status} should be retryable");
        }
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for status in [400, 401, 403, 404, 422] {
            let err = StreamError::Http {
                status,
                message: String::new(),
            };
            assert!(!err.is_retryable(), "status {status} should not be retryable");
        }
    }

    #[test]
    fn invalid_request_is_terminal() {
        let err = StreamError::InvalidRequest("purpose must not be blank".into());
        assert!(!err.is_retryable());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "invalid request: purpose must not be blank");
    }

    #[test]
    fn transport_failures_are_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(StreamError::Network(Box::new(io)).is_retryable());
        assert!(StreamError::Timeout(Duration::from_secs(5)).is_retryable());
    }
}
