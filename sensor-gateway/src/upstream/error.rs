//! Upstream transport error types.

use std::time::Duration;

/// Maximum number of upstream body characters kept for diagnostics.
pub(crate) const BODY_SNIPPET_CHARS: usize = 500;

/// Errors from a single outbound request.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Connection, TLS, or IO failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request did not complete within its budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream answered with a non-success status.
    ///
    /// `body` is a truncated snippet for logs; it must not be sent to callers.
    #[error("upstream returned {status}")]
    Status { status: u16, body: String },

    /// The shared concurrency limiter was shut down; no request was sent.
    #[error("upstream concurrency limiter closed")]
    LimiterClosed,

    /// The body could not be decoded.
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl UpstreamError {
    /// Truncated body snippet, if the upstream sent one.
    pub fn body_snippet(&self) -> Option<&str> {
        match self {
            UpstreamError::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout(_))
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Json {
                message: err.to_string(),
            }
        } else {
            UpstreamError::Transport(err)
        }
    }
}

/// Keep at most [`BODY_SNIPPET_CHARS`] characters of an upstream body.
pub(crate) fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}
