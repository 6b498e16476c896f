//! # Train Ticket Runtime
//!
//! Process-level support shared by the orchestrator's services:
//!
//! - [`metrics`]: Prometheus exporter and the catalogue of every metric the
//!   caches and the reservation saga emit
//! - [`deadline`]: optional per-call deadlines for remote calls
//!
//! Neither module holds business logic; both are wired in by the binaries and
//! by the saga's environment.

pub mod deadline;
pub mod metrics;

pub use deadline::{CallDeadline, bounded};
pub use metrics::{
    MetricsError, MetricsServer, RemoteCallMetrics, ReservationMetrics, ReservationOutcomeLabel,
};
