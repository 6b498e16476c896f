//! # Train Ticket Preserve
//!
//! The reservation saga: check the account, resolve the contact, check
//! capacity, propose a seat, commit the order, then invalidate the speculative
//! cache entries and run the best-effort add-ons.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use trainticket_core::context::RequestContext;
//! use trainticket_core::types::SeatClass;
//! use trainticket_preserve::{PreserveConfig, PreserveEnvironment, ReservationSaga};
//! use trainticket_testing::fixtures;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let railway = Arc::new(fixtures::railway());
//! let saga = ReservationSaga::new(PreserveEnvironment::from_provider(railway), &PreserveConfig::default())?;
//!
//! let reservation = saga
//!     .preserve(&fixtures::order_request(SeatClass::SecondClass), &RequestContext::anonymous())
//!     .await?;
//! assert_eq!(reservation.message, "Success.");
//! # Ok(())
//! # }
//! ```

pub mod advisory;
pub mod config;
pub mod environment;
pub mod error;
pub mod phase;
pub mod saga;

pub use advisory::{AdvisoryReport, AdvisoryStep};
pub use config::{ConfigError, PreserveConfig};
pub use environment::{PreserveEnvironment, RailwayServices};
pub use error::ReservationError;
pub use phase::SagaPhase;
pub use saga::{ReservationCaches, ReservationOutcome, ReservationSaga, has_room};
