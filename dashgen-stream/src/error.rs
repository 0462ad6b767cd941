//! Internal helpers for mapping HTTP/reqwest failures to [`StreamError`].

use std::time::Duration;

use dashgen_types::StreamError;

/// Map a non-success response to a [`StreamError`].
///
/// The backend reports failures as `{"message": ...}` or `{"error": ...}`.
/// Anything else falls back to the status text.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> StreamError {
    let message = message_from_body(body).unwrap_or_else(|| match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("request failed with status {}", status.as_u16()),
    });
    StreamError::Http {
        status: status.as_u16(),
        message,
    }
}

fn message_from_body(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"].into_iter().find_map(|key| {
        json.get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    })
}

/// Timeouts a transport was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimeoutLimits {
    pub(crate) connect: Duration,
    pub(crate) request: Option<Duration>,
}

impl TimeoutLimits {
    /// The limit a timeout ran into. Connect-phase timeouts hit the connect
    /// limit; anything later hits the whole-request limit.
    pub(crate) fn reported(self, connecting: bool) -> Duration {
        match self.request {
            Some(request) if !connecting => request,
            _ => self.connect,
        }
    }
}

/// Map a [`reqwest::Error`] to a [`StreamError`].
///
/// Timeouts report the configured limit that was exceeded.
pub(crate) fn map_reqwest_error(err: reqwest::Error, limits: TimeoutLimits) -> StreamError {
    if err.is_timeout() {
        StreamError::Timeout(limits.reported(err.is_connect()))
    } else if err.is_body() || err.is_decode() {
        StreamError::BodyUnreadable(err.to_string())
    } else {
        StreamError::Network(Box::new(err))
    }
}
