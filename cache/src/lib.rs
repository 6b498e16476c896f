//! # Train Ticket Cache
//!
//! A per-process, per-dependency cache that never answers without asking its
//! source. Every lookup fetches; the stored value is compared with the fetched
//! one to detect drift, and each read is remembered under the request's
//! correlation id so the same request can invalidate what it read once its
//! own side effects have made that value obsolete.
//!
//! ## Pieces
//!
//! - [`ConsistencyCheckedCache`]: the cache itself
//! - [`Fetcher`] / [`FnFetcher`]: the authoritative source strategy
//! - [`RecencyArena`]: bounded storage with explicit LRU eviction
//! - [`CorrelationLedger`]: correlation id → last key read
//! - [`CacheMetrics`]: counter snapshot
//!
//! ## Not provided
//!
//! No expiry, no sharing between processes, and no isolation between
//! concurrently running requests. Consistency is scoped to one request.

pub mod arena;
pub mod fetcher;
pub mod ledger;
pub mod metrics;
pub mod store;

pub use arena::RecencyArena;
pub use fetcher::{FetchFuture, Fetcher, FnFetcher};
pub use ledger::CorrelationLedger;
pub use metrics::CacheMetrics;
pub use store::{ConsistencyCheckedCache, Invalidation};
