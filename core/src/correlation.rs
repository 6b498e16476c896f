//! Correlation ids.
//!
//! A correlation id is minted once per incoming reservation request and carried
//! on every downstream call made for that request, including the invalidations
//! issued after the order commits. Caches use it to remember which key a
//! request touched, so the request can later invalidate "what it read" without
//! re-supplying the key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one logical request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Id used by callers that did not receive one from upstream.
    pub const ANONYMOUS: &'static str = "0";

    /// Wrap an existing id (e.g. one received in a request header)
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The shared id for requests that carry no correlation id.
    ///
    /// Every uncorrelated caller shares this id, so ledger entries recorded
    /// under it overwrite each other.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the shared anonymous id
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_id_is_recognised() {
        assert!(CorrelationId::anonymous().is_anonymous());
        assert!(!CorrelationId::new("17").is_anonymous());
    }

    #[test]
    fn serializes_as_plain_string() {
        #[allow(clippy::unwrap_used)]
        let json = serde_json::to_string(&CorrelationId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
