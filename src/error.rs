//! Typed failures surfaced by the feed engine

use thiserror::Error;

/// Errors surfaced to the caller by page or moderation fetches
///
/// Per-record decode anomalies are recovered locally and never reach this
/// type; a `FeedError` always means the feed failed to advance and may be
/// retried.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport-level failure (DNS, TLS, timeout, ...)
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The response body was not the shape we expected
    #[error("malformed feed payload: {0}")]
    Payload(String),
}
