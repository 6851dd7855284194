//! Pure URL builders. No network calls.
//!
//! Purchased and static content is served from the CDN domain with
//! protocol-relative URLs; job content downloads go straight to the connected
//! Prism host over HTTPS.

use prism_core::{ContentHash, JobHandle, PurchaseToken};

/// Default basename for purchased-content URLs.
pub const DEFAULT_PURCHASE_NAME: &str = "video";

/// Default basename for static-content URLs.
pub const DEFAULT_STATIC_NAME: &str = "file";

/// Fallback extension when neither the caller nor the receipt supplies one.
pub const DEFAULT_EXTENSION: &str = "bin";

/// Playback URL for a purchase: `//<cdn>/<token>/<name>.<ext>`.
pub fn purchase_url(
    cdn_domain: &str,
    token: &PurchaseToken,
    ext: Option<&str>,
    name: Option<&str>,
) -> String {
    format!(
        "//{}/{}/{}.{}",
        cdn_domain,
        token,
        name.unwrap_or(DEFAULT_PURCHASE_NAME),
        ext.unwrap_or(DEFAULT_EXTENSION),
    )
}

/// Unauthenticated URL for static content:
/// `//<cdn>/static/<hash>/<name>.<ext>`.
pub fn static_url(
    cdn_domain: &str,
    hash: &ContentHash,
    ext: Option<&str>,
    name: Option<&str>,
) -> String {
    format!(
        "//{}/static/{}/{}.{}",
        cdn_domain,
        hash,
        name.unwrap_or(DEFAULT_STATIC_NAME),
        ext.unwrap_or(DEFAULT_EXTENSION),
    )
}

/// Direct download URL for a file produced by a job:
/// `https://<host>:<port>/job/content/download/<handle>/<file>`.
pub fn job_content_download_url(host: &str, port: u16, handle: &JobHandle, file: &str) -> String {
    format!("https://{host}:{port}/job/content/download/{handle}/{file}")
}
