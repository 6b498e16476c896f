//! The response envelope shared by every downstream service.
//!
//! Each remote call answers `{status, msg, data}`. A failure status must
//! short-circuit the consuming step with the carried message; `data` may be
//! absent even on success, and callers treat a missing required payload as a
//! distinct, fatal condition.

use serde::{Deserialize, Serialize};

/// Outcome flag of a remote call. Encoded on the wire as `1` (success) / `0` (failure).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Status {
    /// The call succeeded
    Success,
    /// The call reported a business failure
    Failure,
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        if code == 1 { Self::Success } else { Self::Failure }
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => 1,
            Status::Failure => 0,
        }
    }
}

/// Response envelope `{status, msg, data}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    /// Success or failure
    pub status: Status,
    /// Human-readable message (the failure reason on failure)
    #[serde(rename = "msg", default)]
    pub message: String,
    /// Payload, absent on failure and sometimes on success
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Response<T> {
    /// Successful response carrying `data`
    #[must_use]
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Successful response without payload
    #[must_use]
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: None,
        }
    }

    /// Failed response
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failure,
            message: message.into(),
            data: None,
        }
    }

    /// Whether the status is [`Status::Success`]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Map the payload, keeping status and message
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            status: self.status,
            message: self.message,
            data: self.data.map(f),
        }
    }
}
