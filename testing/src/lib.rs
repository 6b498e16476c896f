//! # Train Ticket Testing
//!
//! Testing utilities for the reservation orchestrator.
//!
//! This crate provides:
//! - Deterministic implementations of the environment traits (clock, ids)
//! - [`InMemoryRailway`]: every downstream service as an in-memory fake
//! - Fixtures describing a small, consistent railway
//! - proptest strategies for pricing inputs
//!
//! ## Example
//!
//! ```
//! use trainticket_core::context::RequestContext;
//! use trainticket_core::remote::StationService;
//! use trainticket_testing::fixtures;
//!
//! # async fn example() {
//! let railway = fixtures::railway();
//! let answer = railway
//!     .station_id(fixtures::SUZHOU, &RequestContext::anonymous())
//!     .await
//!     .unwrap();
//! assert_eq!(answer.data.as_deref(), Some(fixtures::SUZHOU_ID));
//! # }
//! ```

use chrono::{DateTime, Utc};
use trainticket_core::environment::Clock;

pub mod fixtures;
pub mod railway;

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use trainticket_core::correlation::CorrelationId;
    use trainticket_core::environment::IdGenerator;
    use uuid::Uuid;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use trainticket_testing::mocks::FixedClock;
    /// use trainticket_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable correlation ids: `"<prefix>-1"`, `"<prefix>-2"`, ...
    ///
    /// Order ids are `Uuid::from_u128(1)`, `Uuid::from_u128(2)`, ...
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        prefix: String,
        counter: AtomicU64,
        orders: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Ids prefixed with `prefix`
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                counter: AtomicU64::new(0),
                orders: AtomicU64::new(0),
            }
        }

        /// Number of ids handed out so far
        #[must_use]
        pub fn issued(&self) -> u64 {
            self.counter.load(Ordering::SeqCst)
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new("req")
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> CorrelationId {
            let next = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            CorrelationId::new(format!("{}-{next}", self.prefix))
        }

        fn next_order_id(&self) -> Uuid {
            let next = self.orders.fetch_add(1, Ordering::SeqCst) + 1;
            Uuid::from_u128(u128::from(next))
        }
    }
}

/// Test helpers.
pub mod helpers {
    /// Route `tracing` output through the test harness.
    ///
    /// Honours `RUST_LOG`; safe to call from every test.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// A pricing scenario: cumulative distances, an origin index strictly
    /// before a destination index, and two non-negative rates.
    #[derive(Clone, Debug)]
    pub struct PricingCase {
        /// Cumulative distances of the route's stations
        pub distances: Vec<i32>,
        /// Origin station index
        pub origin: usize,
        /// Destination station index
        pub destination: usize,
        /// Economy rate
        pub basic_rate: f64,
        /// Comfort rate
        pub first_class_rate: f64,
    }

    /// Strategy producing well-formed [`PricingCase`]s.
    pub fn pricing_case() -> impl Strategy<Value = PricingCase> {
        proptest::collection::vec(1i32..500, 2..8)
            .prop_flat_map(|steps| {
                let len = steps.len();
                let distances: Vec<i32> = steps
                    .iter()
                    .scan(0, |total, step| {
                        let current = *total;
                        *total += step;
                        Some(current)
                    })
                    .collect();
                (Just(distances), 0..len - 1)
            })
            .prop_flat_map(|(distances, origin)| {
                let len = distances.len();
                (Just(distances), Just(origin), origin + 1..len, 0.0f64..5.0, 0.0f64..5.0)
            })
            .prop_map(|(distances, origin, destination, basic_rate, first_class_rate)| PricingCase {
                distances,
                origin,
                destination,
                basic_rate,
                first_class_rate,
            })
    }
}

pub use mocks::{FixedClock, SequentialIdGenerator, test_clock};
pub use railway::{InMemoryRailway, RecordedCall};

#[cfg(test)]
mod tests {
    use super::*;
    use trainticket_core::environment::IdGenerator;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn sequential_ids_are_predictable() {
        let ids = SequentialIdGenerator::new("t");
        assert_eq!(ids.next_id().as_str(), "t-1");
        assert_eq!(ids.next_id().as_str(), "t-2");
        assert_eq!(ids.issued(), 2);
        assert_eq!(ids.next_order_id(), uuid::Uuid::from_u128(1));
        assert_eq!(ids.issued(), 2);
    }
}
