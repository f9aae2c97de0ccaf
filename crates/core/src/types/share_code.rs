//! Opaque wishlist share codes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An opaque share code granting read (and conditionally reserve) access to
/// a wishlist.
///
/// Codes are generated by the backend on demand; the client never inspects
/// their structure. The only client-side concern is that an empty code is
/// never sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareCode(String);

impl ShareCode {
    /// Wrap a backend-issued share code.
    ///
    /// Returns `None` if the input is empty or whitespace, which can only
    /// happen when a share URL was truncated in transit.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            None
        } else {
            Some(Self(code))
        }
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
