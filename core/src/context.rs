//! Per-call request context.
//!
//! The context is the explicit out-of-band value passed next to every cache
//! key. It carries the correlation id of the request, the forced-refetch
//! marker used by post-commit invalidations, and any caller credentials that
//! must be forwarded to downstream services.
//!
//! Contexts are immutable values. Marking a call as a forced refetch produces a
//! new context instead of flipping a flag on a shared one, so the marker never
//! leaks into calls that were not invalidations.

use crate::correlation::CorrelationId;
use serde::{Deserialize, Serialize};

/// Values carried on every downstream call made for one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestContext {
    correlation_id: Option<CorrelationId>,
    forced_refetch: bool,
    authorization: Option<String>,
}

impl RequestContext {
    /// Context for a request that has no correlation id (yet).
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            correlation_id: None,
            forced_refetch: false,
            authorization: None,
        }
    }

    /// Context for the request identified by `correlation_id`.
    #[must_use]
    pub const fn for_request(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id: Some(correlation_id),
            forced_refetch: false,
            authorization: None,
        }
    }

    /// Attach a caller credential (forwarded verbatim as `Authorization`).
    #[must_use]
    pub fn with_authorization(mut self, token: impl Into<String>) -> Self {
        self.authorization = Some(token.into());
        self
    }

    /// Same request, marked as a forced refetch.
    ///
    /// Downstream services use the marker to tell "allocate" from
    /// "finalize/recompute" for the same request shape.
    #[must_use]
    pub fn forced_refetch(&self) -> Self {
        Self {
            forced_refetch: true,
            ..self.clone()
        }
    }

    /// Replace the correlation id, keeping everything else.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// The correlation id, if one was assigned
    #[must_use]
    pub const fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    /// The correlation id, or [`CorrelationId::anonymous`] when none was assigned
    #[must_use]
    pub fn correlation_id_or_anonymous(&self) -> CorrelationId {
        self.correlation_id
            .clone()
            .unwrap_or_else(CorrelationId::anonymous)
    }

    /// Whether this call is a forced refetch issued by an invalidation
    #[must_use]
    pub const fn is_forced_refetch(&self) -> bool {
        self.forced_refetch
    }

    /// Caller credential to forward, if any
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
