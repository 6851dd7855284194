//! Newtype identifiers for opaque wire values.
//!
//! Every value the Prism service hands out and expects back verbatim — session
//! tokens, job handles, content hashes, purchase tokens — is represented as a
//! distinct newtype wrapping a `String`. This prevents accidentally
//! interchanging, for example, a [`ContentHash`] with a [`PurchaseToken`] even
//! though both are opaque strings under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! opaque_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — issued by the service, passed back verbatim
// ---------------------------------------------------------------------------

opaque_id! {
    /// An authentication credential issued by `/user/login`.
    ///
    /// Sent on every authenticated request in the session header. The token
    /// is opaque; the client never inspects or refreshes it — a rejected
    /// token means the caller logs in again.
    SessionToken
}

opaque_id! {
    /// Identifies a server-side job resource.
    ///
    /// Returned by `/job/create` and required by every other job operation.
    JobHandle
}

opaque_id! {
    /// Content-addressed identifier for a stored file.
    ///
    /// Returned by upload/retrieve; the service computes it, the client only
    /// passes it through.
    ContentHash
}

opaque_id! {
    /// Identifies a content purchase, used to build playback URLs.
    PurchaseToken
}

// ---------------------------------------------------------------------------
// Identifiers — generated client-side
// ---------------------------------------------------------------------------

/// Identifies a single outgoing request.
///
/// Generated fresh for every POST and sent in the request-id header;
/// propagated through spans so a client-side failure can be correlated with
/// the service's own logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`RequestId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
