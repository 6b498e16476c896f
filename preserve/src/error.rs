//! Why a reservation did not commit.

use thiserror::Error;
use trainticket_core::envelope::Response;
use trainticket_core::error::RemoteError;
use trainticket_runtime::ReservationOutcomeLabel;

/// A reservation aborted before the order was committed.
///
/// Nothing durable happened, so none of these needs compensation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// A downstream service refused, or a booking rule rejected the request.
    /// Carries the message verbatim.
    #[error("{0}")]
    Business(String),

    /// A payload the reservation cannot do without was absent.
    #[error("{0}")]
    MissingData(&'static str),

    /// A downstream service could not be reached.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl ReservationError {
    /// Failure envelope carrying this error's message
    #[must_use]
    pub fn into_response<T>(self) -> Response<T> {
        Response::failure(self.to_string())
    }

    /// Metric label of this kind of abort
    #[must_use]
    pub const fn outcome_label(&self) -> ReservationOutcomeLabel {
        match self {
            Self::Business(_) | Self::MissingData(_) => ReservationOutcomeLabel::Rejected,
            Self::Remote(_) => ReservationOutcomeLabel::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainticket_core::envelope::Status;

    #[test]
    fn business_message_is_kept_verbatim() {
        let response: Response<()> = ReservationError::Business("Seat Not Enough".to_string()).into_response();
        assert_eq!(response.status, Status::Failure);
        assert_eq!(response.message, "Seat Not Enough");
        assert_eq!(response.data, None);
    }

    #[test]
    fn remote_errors_are_failures_not_rejections() {
        let error = ReservationError::from(RemoteError::Status {
            service: "order",
            code: 500,
        });
        assert_eq!(error.outcome_label(), ReservationOutcomeLabel::Failed);
        assert_eq!(error.to_string(), "order answered HTTP 500");
        assert_eq!(
            ReservationError::MissingData("Station not found").outcome_label(),
            ReservationOutcomeLabel::Rejected
        );
    }
}
