//! Request and response models for Prism endpoints.
//!
//! The service's response schemas are open: every model keeps the fields the
//! SDK interprets as typed members and passes everything else through verbatim
//! in `extra`, so callers never lose data the service adds later.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use prism_core::{ContentHash, JobHandle, PurchaseToken, Timestamp};

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Instruction for a server-side fetch, posted to `/content/retrieve`.
///
/// The service downloads `url` itself and stores the result as content. Any
/// additional fetch parameters the service understands (method, headers,
/// auth) ride along in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveRequest {
    /// Source URL the service should download.
    pub url: String,

    /// Additional fetch parameters, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RetrieveRequest {
    /// A retrieve request for the given source URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extra: Map::new(),
        }
    }
}

/// Stored-content record returned by `/content/detail`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDetail {
    /// Content-addressed identifier.
    pub hash: ContentHash,

    /// MIME type recorded at ingest.
    #[serde(default)]
    pub mime_type: Option<String>,

    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,

    /// When the content was first stored.
    #[serde(default)]
    pub created: Option<Timestamp>,

    /// Unmodeled response fields, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ingest result returned by `/content/upload` and `/content/retrieve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Content-addressed identifier of the stored file.
    pub hash: ContentHash,

    /// File extension recorded at ingest.
    #[serde(default)]
    pub ext: Option<String>,

    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,

    /// Unmodeled response fields, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Purchase record returned by `/content/purchase`.
///
/// The `token` keys playback URLs built by
/// [`crate::PrismClient::url_purchase`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// Opaque purchase identifier.
    pub token: PurchaseToken,

    /// Extension the purchase was made for.
    #[serde(default)]
    pub ext: Option<String>,

    /// Granted lifetime in seconds.
    #[serde(default)]
    pub life: Option<u64>,

    /// When the purchase expires.
    #[serde(default)]
    pub expires: Option<Timestamp>,

    /// Unmodeled response fields, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PurchaseReceipt {
    /// A receipt with just a token, for callers reconstructing one from
    /// stored state.
    pub fn from_token(token: PurchaseToken) -> Self {
        Self {
            token,
            ext: None,
            life: None,
            expires: None,
            extra: Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Job record returned by `/job/create`, `/job/detail`, and the lifecycle
/// operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetail {
    /// Opaque job identifier.
    pub handle: JobHandle,

    /// Job description as stored by the service.
    #[serde(default)]
    pub description: Option<Value>,

    /// Scheduling priority.
    #[serde(default)]
    pub priority: Option<i32>,

    /// Worker-pool category.
    #[serde(default)]
    pub category: Option<String>,

    /// Lifecycle status reported by the service.
    #[serde(default)]
    pub status: Option<String>,

    /// When the job was created.
    #[serde(default)]
    pub created: Option<Timestamp>,

    /// When the job last changed state.
    #[serde(default)]
    pub updated: Option<Timestamp>,

    /// Unmodeled response fields, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
