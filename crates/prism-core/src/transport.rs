//! Transport port for issuing requests to the Prism service.
//!
//! The domain layer defines *what* it needs from a transport; infrastructure
//! crates define *how* to supply it. Everything above this trait — state
//! guards, URL selection, payload shaping, body interpretation — is pure and
//! testable against an in-memory implementation.
//!
//! Implementations own the wire details: serializing bodies, attaching the
//! session and request-id headers, response validation, and normalizing
//! transport failures into [`PrismError`].

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::{PrismError, SessionToken};

/// Issues single POST requests against the Prism service.
///
/// Each call sends exactly one request and resolves with the validated JSON
/// body, or a [`PrismError`] describing why no usable body was obtained.
/// Implementations must be safe to share across tasks.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// POSTs a JSON body to `url` and returns the validated response body.
    ///
    /// `session`, when present, is attached as the session header.
    async fn post_json(
        &self,
        url: &str,
        body: Value,
        session: Option<&SessionToken>,
    ) -> Result<Value, PrismError>;

    /// Streams the file at `path` to `url` as multipart form data under the
    /// given form `field`, and returns the validated response body.
    async fn post_file(
        &self,
        url: &str,
        field: &str,
        path: &Path,
        session: Option<&SessionToken>,
    ) -> Result<Value, PrismError>;
}
