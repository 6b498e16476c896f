//! # Train Ticket Core
//!
//! Core types and traits shared by every crate of the reservation orchestrator.
//!
//! The orchestrator composes many remote, authoritative services (capacity,
//! pricing, seating, security, contacts, order ledger, food, consign,
//! assurance) into one booking transaction. This crate owns the vocabulary
//! those pieces talk in:
//!
//! - **Envelope**: the `{status, message, data}` shape every remote call returns
//! - **Correlation**: the per-request id that links cached reads with the
//!   invalidations issued later by the same request
//! - **Context**: the explicit out-of-band values carried on every call
//! - **Environment**: injected `Clock` and `IdGenerator`
//! - **Remote**: one port trait per downstream service
//! - **Types**: the domain records exchanged with those services
//!
//! ## Example
//!
//! ```
//! use trainticket_core::context::RequestContext;
//! use trainticket_core::correlation::CorrelationId;
//!
//! let ctx = RequestContext::for_request(CorrelationId::new("42"));
//! let forced = ctx.forced_refetch();
//!
//! assert!(!ctx.is_forced_refetch());
//! assert!(forced.is_forced_refetch());
//! assert_eq!(forced.correlation_id(), ctx.correlation_id());
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
pub use serde::{Deserialize, Serialize};

pub mod context;
pub mod correlation;
pub mod envelope;
pub mod error;
pub mod remote;
pub mod types;

/// Environment module - Dependency injection traits
///
/// All sources of non-determinism the orchestrator needs (wall clock, id
/// minting) are abstracted behind traits and injected, so tests can pin them.
pub mod environment {
    use crate::correlation::CorrelationId;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use uuid::Uuid;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use trainticket_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let _now = clock.now();
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Mints correlation ids and order ids.
    ///
    /// Implementations must be safe to call from many concurrently running
    /// reservations and must never hand out the same id twice.
    pub trait IdGenerator: Send + Sync {
        /// Mint a fresh correlation id
        fn next_id(&self) -> CorrelationId;

        /// Mint a fresh order id
        fn next_order_id(&self) -> Uuid;
    }

    /// Random UUID v4 correlation ids. The production default.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidIdGenerator;

    impl IdGenerator for UuidIdGenerator {
        fn next_id(&self) -> CorrelationId {
            CorrelationId::new(Uuid::new_v4().to_string())
        }

        fn next_order_id(&self) -> Uuid {
            Uuid::new_v4()
        }
    }

    /// Monotonic counter ids (`"1"`, `"2"`, ...).
    ///
    /// Starts at 1 so a minted id never collides with
    /// [`CorrelationId::anonymous`]. Order ids count separately, encoded as
    /// the UUID whose integer value is the count.
    #[derive(Debug, Default)]
    pub struct AtomicIdGenerator {
        counter: AtomicU64,
        orders: AtomicU64,
    }

    impl AtomicIdGenerator {
        /// Create a generator whose first id is `"1"`
        #[must_use]
        pub const fn new() -> Self {
            Self {
                counter: AtomicU64::new(0),
                orders: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for AtomicIdGenerator {
        fn next_id(&self) -> CorrelationId {
            let next = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
            CorrelationId::new(next.to_string())
        }

        fn next_order_id(&self) -> Uuid {
            let next = self.orders.fetch_add(1, Ordering::Relaxed) + 1;
            Uuid::from_u128(u128::from(next))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::environment::{AtomicIdGenerator, IdGenerator, UuidIdGenerator};
    use super::correlation::CorrelationId;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn atomic_generator_starts_after_anonymous_id() {
        let ids = AtomicIdGenerator::new();
        let first = ids.next_id();

        assert_eq!(first.as_str(), "1");
        assert_ne!(first, CorrelationId::anonymous());
        assert_eq!(ids.next_id().as_str(), "2");
    }

    #[test]
    fn atomic_generator_counts_orders_separately() {
        let ids = AtomicIdGenerator::new();
        ids.next_id();

        assert_eq!(ids.next_order_id(), uuid::Uuid::from_u128(1));
        assert_eq!(ids.next_order_id(), uuid::Uuid::from_u128(2));
        assert_eq!(ids.next_id().as_str(), "2");
    }

    #[test]
    fn uuid_generator_produces_distinct_ids() {
        let ids = UuidIdGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }

    #[test]
    fn atomic_generator_is_unique_across_threads() {
        let ids = Arc::new(AtomicIdGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            #[allow(clippy::unwrap_used)]
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate correlation id minted");
            }
        }
        assert_eq!(seen.len(), 2000);
    }
}
