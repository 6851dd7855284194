//! HTTP client for the Prism content/job service.
//!
//! Wraps Prism's POST/JSON endpoints behind an async method surface:
//! connection setup, session management, content upload/retrieval/purchase,
//! and job lifecycle operations. Every method is one request; there is no
//! caching, no retry loop, and no state beyond the client's own
//! connection/session fields.
//!
//! ## Quick start
//!
//! ```no_run
//! use prism_client::{ClientOptions, PrismClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), prism_core::PrismError> {
//!     let opts = ClientOptions::default().with_credentials("alice", "secret");
//!     let mut client = PrismClient::new(opts)?;
//!
//!     client.connect(None, None);
//!     client.login().await?;
//!
//!     let entry = client.content_upload("clip.mp4").await?;
//!     let detail = client.content_detail(&entry.hash).await?;
//!     println!("stored {} ({} bytes)", detail.hash, detail.size.unwrap_or(0));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate implements the [`prism_core::ApiTransport`]
//! port over reqwest and layers the stateful [`PrismClient`] on top. Domain
//! types and errors live in `prism-core`; tests substitute the transport with
//! an in-memory implementation.

pub mod client;
pub mod models;
pub mod options;
pub mod transport;
pub mod urls;

// Re-export the surface most callers need, plus the core crate itself.
pub use client::{PreparedRequest, PrismClient};
pub use models::{ContentDetail, ContentEntry, JobDetail, PurchaseReceipt, RetrieveRequest};
pub use options::{ClientOptions, DEFAULT_PRISM_PORT};
pub use transport::{HttpTransport, REQUEST_ID_HEADER, SESSION_HEADER};

pub use prism_core;
