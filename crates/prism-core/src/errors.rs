//! Error and retry-classification types for the Prism client.
//!
//! [`PrismError`] covers every failure a client operation can surface:
//! local precondition failures raised before any network traffic, response
//! validation failures, remote rejections, and transport failures.
//!
//! [`RetryPolicy`] is advisory: the SDK itself never retries, but every error
//! can report whether a caller-side retry is worthwhile.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Produced by [`PrismError::retry_policy`] to let callers decide whether to
/// re-invoke an operation. The SDK performs no retries of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying. `None`
    /// means retry immediately or apply the caller's own back-off schedule.
    Retryable {
        /// Minimum back-off before the next attempt.
        after: Option<Duration>,
    },
    /// The operation must not be retried as-is; the caller has to change
    /// something first (connect, authenticate, fix the request).
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Client errors
// ---------------------------------------------------------------------------

/// Errors surfaced by Prism client operations.
///
/// The variants split along the boundaries that matter to callers: failures
/// raised locally before a request is sent ([`NotConnected`],
/// [`NotAuthenticated`]), responses that arrived but did not have the
/// expected shape ([`MissingField`], [`InvalidResponse`]), rejections by the
/// service itself ([`Remote`]), and transport-level failures ([`Network`]).
///
/// [`NotConnected`]: PrismError::NotConnected
/// [`NotAuthenticated`]: PrismError::NotAuthenticated
/// [`MissingField`]: PrismError::MissingField
/// [`InvalidResponse`]: PrismError::InvalidResponse
/// [`Remote`]: PrismError::Remote
/// [`Network`]: PrismError::Network
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum PrismError {
    /// An operation was invoked before `connect`.
    ///
    /// Raised by the prepare guard; no request is sent.
    #[error("not connected: call connect() first")]
    NotConnected,

    /// An operation was invoked before `login` or `set_session`.
    ///
    /// Raised by the prepare guard; no request is sent.
    #[error("not authenticated: call login() or set_session() first")]
    NotAuthenticated,

    /// The client or its transport could not be constructed.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// A response parsed as JSON but lacked a field the operation requires.
    ///
    /// Produced by: `login` when the body carries no session token,
    /// `job_content_exists` when the body carries no existence flag.
    #[error("response is missing expected field '{field}'")]
    MissingField {
        /// Name of the absent field.
        field: String,
    },

    /// A response body could not be interpreted at all.
    ///
    /// Produced when a 2xx body is not valid JSON, or when a typed model
    /// fails to deserialize from an otherwise valid body.
    #[error("invalid response: {message}")]
    InvalidResponse {
        /// Description of what failed to parse.
        message: String,
    },

    /// A local file destined for upload could not be read.
    ///
    /// Raised before any bytes reach the service.
    #[error("upload failed: {message}")]
    Upload {
        /// Description of the local I/O failure.
        message: String,
    },

    /// The service answered with a non-success status or an error body.
    #[error("remote error (status {status}): {message}")]
    Remote {
        /// HTTP status code of the response.
        status: u16,
        /// Error message extracted from the body, or the raw body text.
        message: String,
    },

    /// The request never produced a usable response.
    ///
    /// Wraps transport failures: connection refused, TLS problems, timeouts.
    #[error("network error: {message}")]
    Network {
        /// Stringified transport error.
        message: String,
        /// Whether the failure was a timeout or connect failure.
        timeout: bool,
    },
}

impl PrismError {
    /// Classifies this error for caller-side retry decisions.
    ///
    /// Timeouts, connect failures, HTTP 5xx, and HTTP 429 are retryable;
    /// everything else requires the caller to change state or input first.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            PrismError::Network { timeout: true, .. } => RetryPolicy::Retryable { after: None },
            PrismError::Remote { status, .. } if *status == 429 || *status >= 500 => {
                RetryPolicy::Retryable { after: None }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }
}

impl From<serde_json::Error> for PrismError {
    fn from(error: serde_json::Error) -> Self {
        PrismError::InvalidResponse {
            message: error.to_string(),
        }
    }
}
