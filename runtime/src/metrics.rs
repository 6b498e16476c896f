//! Prometheus metrics for the orchestrator.
//!
//! Covers every metric the process emits:
//! - Consistency-checked caches (queries, hits, drift, invalidations)
//! - Reservation outcomes and advisory-step failures
//! - Remote call latency and deadline expiry
//!
//! Caches emit their counters themselves through the `metrics` facade; this
//! module installs the recorder and attaches descriptions.
//!
//! # Example
//!
//! ```rust,no_run
//! use trainticket_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! // Scrape output is available through `server.render()`
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics server.
///
/// Installs the global recorder and renders the scrape output for `addr`.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address the scrape endpoint is announced on (e.g. `0.0.0.0:9090`)
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Describe all metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g. by another test), this logs a
    /// warning and succeeds without a handle.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(
                    addr = %self.addr,
                    "Metrics recorder installed - scrape at http://{}/metrics",
                    self.addr
                );
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this server did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Cache metrics, labelled `cache`
    describe_counter!(
        "cache_queries_total",
        "Cache lookups answered by the authoritative source"
    );
    describe_counter!(
        "cache_hits_total",
        "Cache lookups whose stored value matched the source"
    );
    describe_counter!(
        "cache_cold_misses_total",
        "Cache lookups of keys not yet stored"
    );
    describe_counter!(
        "cache_inconsistencies_total",
        "Cache lookups whose stored value had drifted from the source"
    );
    describe_counter!(
        "cache_invalidations_total",
        "Invalidation requests received by a cache"
    );
    describe_counter!(
        "cache_redundant_invalidations_total",
        "Invalidation requests for correlation ids with nothing remembered"
    );
    describe_counter!(
        "cache_evictions_total",
        "Entries evicted as least recently used"
    );
    describe_counter!(
        "cache_fetch_failures_total",
        "Lookups or forwarded invalidations whose source call failed"
    );

    // Reservation metrics
    describe_counter!(
        "reservations_total",
        "Reservation requests by outcome (success, partial, rejected, failed)"
    );
    describe_counter!(
        "reservation_advisory_failures_total",
        "Post-commit advisory steps that failed, by step"
    );
    describe_counter!(
        "reservation_invalidation_failures_total",
        "Post-commit cache invalidations whose forwarded fetch failed"
    );

    // Remote call metrics, labelled `service`
    describe_histogram!(
        "remote_call_duration_seconds",
        "Time taken by remote calls"
    );
    describe_counter!(
        "remote_call_failures_total",
        "Remote calls that produced no envelope"
    );
    describe_counter!(
        "remote_call_timeouts_total",
        "Remote calls that exceeded their deadline"
    );
}

/// How a reservation request ended, as reported in `reservations_total`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReservationOutcomeLabel {
    /// Committed with every advisory step succeeding
    Success,
    /// Committed with at least one advisory step failing
    Partial,
    /// Rejected by a business rule or missing data before commit
    Rejected,
    /// Aborted by a remote failure
    Failed,
}

impl ReservationOutcomeLabel {
    /// Label value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// Reservation metrics recorder.
pub struct ReservationMetrics;

impl ReservationMetrics {
    /// Record how a reservation ended.
    pub fn record_outcome(outcome: ReservationOutcomeLabel) {
        counter!("reservations_total", "outcome" => outcome.as_str()).increment(1);
    }

    /// Record a failed advisory step.
    pub fn record_advisory_failure(step: &'static str) {
        counter!("reservation_advisory_failures_total", "step" => step).increment(1);
    }

    /// Record a failed post-commit invalidation.
    pub fn record_invalidation_failure(cache: &str) {
        counter!("reservation_invalidation_failures_total", "cache" => cache.to_string()).increment(1);
    }
}

/// Remote call metrics recorder.
pub struct RemoteCallMetrics;

impl RemoteCallMetrics {
    /// Record a completed remote call.
    pub fn record_call(service: &'static str, duration: Duration, succeeded: bool) {
        histogram!("remote_call_duration_seconds", "service" => service).record(duration.as_secs_f64());
        if !succeeded {
            counter!("remote_call_failures_total", "service" => service).increment(1);
        }
    }

    /// Record a deadline expiry.
    pub fn record_timeout(service: &'static str) {
        counter!("remote_call_timeouts_total", "service" => service).increment(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_server_creation() {
        let addr = "127.0.0.1:0".parse().unwrap();
        let server = MetricsServer::new(addr);
        assert!(server.handle().is_none());
        assert!(server.render().is_none());
    }

    #[test]
    fn test_reservation_and_remote_metrics() {
        let addr = "127.0.0.1:0".parse().unwrap();
        let mut server = MetricsServer::new(addr);
        server.start().unwrap();

        ReservationMetrics::record_outcome(ReservationOutcomeLabel::Partial);
        ReservationMetrics::record_advisory_failure("food");
        RemoteCallMetrics::record_call("seat", Duration::from_millis(12), true);
        RemoteCallMetrics::record_timeout("seat");

        // Another test may have installed the recorder first; metrics are
        // still recorded globally in that case.
        if let Some(rendered) = server.render() {
            assert!(rendered.contains("reservations_total"));
            assert!(rendered.contains("reservation_advisory_failures_total"));
            assert!(rendered.contains("remote_call_timeouts_total"));
        }
    }

    #[test]
    fn test_deadline_records_through_installed_recorder() {
        let addr = "127.0.0.1:0".parse().unwrap();
        let mut server = MetricsServer::new(addr);
        server.start().unwrap();

        let answer = tokio_test::block_on(crate::deadline::bounded("route", None, async {
            Ok::<_, trainticket_core::error::RemoteError>(1)
        }));
        assert_eq!(answer, Ok(1));

        if let Some(rendered) = server.render() {
            assert!(rendered.contains("remote_call_duration_seconds"));
        }
    }

    #[test]
    fn outcome_labels_are_stable() {
        assert_eq!(ReservationOutcomeLabel::Success.as_str(), "success");
        assert_eq!(ReservationOutcomeLabel::Partial.as_str(), "partial");
        assert_eq!(ReservationOutcomeLabel::Rejected.as_str(), "rejected");
        assert_eq!(ReservationOutcomeLabel::Failed.as_str(), "failed");
    }
}
