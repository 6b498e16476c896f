//! Transport-level failures of remote calls.
//!
//! A [`RemoteError`] means the call itself did not produce an envelope. A
//! business failure (an envelope with a failure status) is *not* a
//! `RemoteError`; it travels inside [`crate::envelope::Response`].

use std::time::Duration;
use thiserror::Error;

/// Failure to obtain an envelope from a downstream service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The service could not be reached or the connection broke.
    #[error("{service} unavailable: {message}")]
    Unavailable {
        /// Downstream service name
        service: &'static str,
        /// Transport error text
        message: String,
    },

    /// The call did not complete within its deadline.
    #[error("{service} did not answer within {after:?}")]
    Timeout {
        /// Downstream service name
        service: &'static str,
        /// The deadline that elapsed
        after: Duration,
    },

    /// The service answered with a non-2xx HTTP status.
    #[error("{service} answered HTTP {code}")]
    Status {
        /// Downstream service name
        service: &'static str,
        /// HTTP status code
        code: u16,
    },

    /// The body could not be decoded into the expected envelope.
    #[error("{service} sent an undecodable body: {message}")]
    Decode {
        /// Downstream service name
        service: &'static str,
        /// Decoder error text
        message: String,
    },
}

impl RemoteError {
    /// Name of the service that failed
    #[must_use]
    pub const fn service(&self) -> &'static str {
        match self {
            Self::Unavailable { service, .. }
            | Self::Timeout { service, .. }
            | Self::Status { service, .. }
            | Self::Decode { service, .. } => service,
        }
    }
}
