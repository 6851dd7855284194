//! Shared value types for the Prism client domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (extensions are normalized, categories
//! are non-empty) and participate in request construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Job scheduling values
// ---------------------------------------------------------------------------

/// Scheduling priority for a job. Higher values are dispatched first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPriority(i32);

impl JobPriority {
    /// Creates a [`JobPriority`] from a raw integer.
    pub fn new(priority: i32) -> Self {
        Self(priority)
    }

    /// Returns the underlying integer value.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for JobPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Category tag routing a job to a worker pool.
///
/// The service dispatches on this tag; jobs created without an explicit
/// category land in the default `resource` pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobCategory(String);

impl JobCategory {
    /// Creates a [`JobCategory`], returning `None` if the tag is empty.
    pub fn new(category: impl Into<String>) -> Option<Self> {
        let c = category.into();
        if c.is_empty() { None } else { Some(Self(c)) }
    }

    /// Returns the category tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobCategory {
    fn default() -> Self {
        Self("resource".to_string())
    }
}

impl std::fmt::Display for JobCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Purchase values
// ---------------------------------------------------------------------------

/// How long a content purchase stays valid, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseLife(u64);

impl PurchaseLife {
    /// Creates a [`PurchaseLife`] from a duration in seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the lifetime in seconds.
    pub fn as_secs(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PurchaseLife {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}

// ---------------------------------------------------------------------------
// File extensions
// ---------------------------------------------------------------------------

/// A normalized file extension: no leading dot, never empty.
///
/// Extensions select the suffix of CDN playback URLs. When the caller omits
/// one, operations derive it from a source URL via [`FileExtension::from_url`]
/// or fall back to [`FileExtension::default`] (`bin`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileExtension(String);

impl FileExtension {
    /// Creates a [`FileExtension`], stripping any leading dot.
    ///
    /// Returns `None` if the value is empty after normalization.
    pub fn new(ext: impl Into<String>) -> Option<Self> {
        let e = ext.into();
        let e = e.strip_prefix('.').unwrap_or(&e).to_string();
        if e.is_empty() { None } else { Some(Self(e)) }
    }

    /// Derives the extension from the final path segment of a URL.
    ///
    /// Query and fragment parts are ignored; a segment without a dot (or
    /// ending in one) yields `None`.
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or(url);
        let segment = path.rsplit('/').next()?;
        let (stem, ext) = segment.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Self::new(ext)
    }

    /// Returns the extension as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FileExtension {
    fn default() -> Self {
        Self("bin".to_string())
    }
}

impl std::fmt::Display for FileExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
