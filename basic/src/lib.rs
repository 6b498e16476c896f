//! # Train Ticket Basic
//!
//! The pricing side of the orchestrator: [`BasicService::query_for_travel`]
//! derives ticket prices from route distances and per-class rates, and
//! [`BasicService::query_for_station_id`] resolves station names. Both read
//! through [`trainticket_cache::ConsistencyCheckedCache`]s keyed by the
//! request's correlation id.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use trainticket_basic::{BasicConfig, BasicEnvironment, BasicService};
//! use trainticket_core::context::RequestContext;
//! use trainticket_testing::fixtures;
//!
//! # async fn example() {
//! let railway = Arc::new(fixtures::railway());
//! let service = BasicService::new(BasicEnvironment::from_provider(railway), &BasicConfig::default());
//!
//! let travel = fixtures::travel(fixtures::starting_time());
//! let answer = service.query_for_travel(&travel, &RequestContext::anonymous()).await;
//! assert!(answer.is_ok());
//! # }
//! ```

pub mod config;
pub mod pricing;
pub mod service;

pub use config::BasicConfig;
pub use pricing::{FALLBACK_PRICES, PricingFault, compute_prices, prices_or_fallback};
pub use service::{BasicEnvironment, BasicService};
