//! Post-commit advisory steps and the message they compose.
//!
//! Once the order is committed every advisory step is attempted regardless of
//! how the others went. Failures are only reported: the message becomes
//! `"Success.But "` followed by each failed step's phrase, in step order.

use std::fmt;

/// Message of a reservation whose advisory steps all succeeded (or were skipped).
pub const SUCCESS_MESSAGE: &str = "Success.";

const PARTIAL_PREFIX: &str = "Success.But ";

/// A best-effort step run after the order is committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdvisoryStep {
    /// Attach an assurance to the order
    Assurance,
    /// Order food for the trip
    Food,
    /// Consign luggage
    Consign,
    /// Notify the account holder
    Notification,
}

impl AdvisoryStep {
    /// Metric and log label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assurance => "assurance",
            Self::Food => "food",
            Self::Consign => "consign",
            Self::Notification => "notification",
        }
    }

    /// Phrase reported in the reservation message when the step fails
    #[must_use]
    pub const fn failure_phrase(self) -> &'static str {
        match self {
            Self::Assurance => "Buy Assurance Fail.",
            Self::Food => "Buy Food Fail.",
            Self::Consign => "Consign Fail.",
            Self::Notification => "Send Notification Fail.",
        }
    }
}

impl fmt::Display for AdvisoryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed advisory steps of one reservation, in the order they ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdvisoryReport {
    failed: Vec<AdvisoryStep>,
}

impl AdvisoryReport {
    /// Record a failed step
    pub fn record_failure(&mut self, step: AdvisoryStep) {
        self.failed.push(step);
    }

    /// Steps that failed
    #[must_use]
    pub fn failed_steps(&self) -> &[AdvisoryStep] {
        &self.failed
    }

    /// Whether every attempted step succeeded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Reservation message: [`SUCCESS_MESSAGE`] or `"Success.But ..."`.
    #[must_use]
    pub fn message(&self) -> String {
        if self.failed.is_empty() {
            return SUCCESS_MESSAGE.to_string();
        }
        let phrases: Vec<&str> = self
            .failed
            .iter()
            .map(|step| step.failure_phrase())
            .collect();
        format!("{PARTIAL_PREFIX}{}", phrases.join(" "))
    }

    /// Consume the report, keeping the failed steps
    #[must_use]
    pub fn into_failed_steps(self) -> Vec<AdvisoryStep> {
        self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report_reads_success() {
        assert_eq!(AdvisoryReport::default().message(), "Success.");
    }

    #[test]
    fn single_failure_matches_legacy_wording() {
        let mut report = AdvisoryReport::default();
        report.record_failure(AdvisoryStep::Food);
        assert_eq!(report.message(), "Success.But Buy Food Fail.");
    }

    #[test]
    fn failures_are_listed_in_step_order() {
        let mut report = AdvisoryReport::default();
        report.record_failure(AdvisoryStep::Assurance);
        report.record_failure(AdvisoryStep::Consign);
        report.record_failure(AdvisoryStep::Notification);

        assert!(!report.is_clean());
        assert_eq!(
            report.message(),
            "Success.But Buy Assurance Fail. Consign Fail. Send Notification Fail."
        );
    }
}
