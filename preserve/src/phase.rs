//! Reservation progress, logged at every transition.

use std::fmt;

/// How far a reservation has progressed.
///
/// Phases before [`SagaPhase::OrderCommitted`] can abort without compensation;
/// phases after it never abort.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SagaPhase {
    /// Correlation id minted, nothing called yet
    Init,
    /// The account passed the security check
    SecurityChecked,
    /// The billing contact was found
    ContactsResolved,
    /// The trip has room in the requested class
    CapacityChecked,
    /// A seat was proposed for the correlation id
    SeatSpeculated,
    /// The order is durable
    OrderCommitted,
    /// Assurance attempted (or skipped)
    AssuranceApplied,
    /// Food attempted (or skipped)
    FoodApplied,
    /// Consignment attempted (or skipped)
    ConsignApplied,
    /// Notification attempted
    Notified,
    /// Finished
    Done,
}

impl SagaPhase {
    /// Log label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::SecurityChecked => "security_checked",
            Self::ContactsResolved => "contacts_resolved",
            Self::CapacityChecked => "capacity_checked",
            Self::SeatSpeculated => "seat_speculated",
            Self::OrderCommitted => "order_committed",
            Self::AssuranceApplied => "assurance_applied",
            Self::FoodApplied => "food_applied",
            Self::ConsignApplied => "consign_applied",
            Self::Notified => "notified",
            Self::Done => "done",
        }
    }

    /// Whether the order has been committed by this phase
    #[must_use]
    pub fn is_committed(self) -> bool {
        self >= Self::OrderCommitted
    }
}

impl fmt::Display for SagaPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_splits_the_phases() {
        assert!(!SagaPhase::SeatSpeculated.is_committed());
        assert!(SagaPhase::OrderCommitted.is_committed());
        assert!(SagaPhase::Done.is_committed());
    }
}
