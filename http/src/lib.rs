//! # Train Ticket HTTP
//!
//! Production implementation of the remote ports: one [`HttpGateway`] speaks
//! JSON over HTTP to every railway service, configured by
//! [`ServiceEndpoints`].
//!
//! Correlation travels in the `invalidation_id` header; invalidation calls add
//! `invalidation: true`.
//!
//! ## Example
//!
//! ```no_run
//! use trainticket_http::{HttpGateway, ServiceEndpoints};
//!
//! # fn example() -> Result<(), trainticket_http::ConfigError> {
//! let gateway = HttpGateway::new(&ServiceEndpoints::from_env())?;
//! # let _ = gateway;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod gateway;

pub use config::{ConfigError, ServiceEndpoints};
pub use gateway::{CORRELATION_HEADER, FORCED_REFETCH_HEADER, HttpGateway, with_context_headers};
