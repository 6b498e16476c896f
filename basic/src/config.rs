//! Configuration of the pricing service.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use trainticket_runtime::CallDeadline;

/// Default capacity of each pricing cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Pricing service configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicConfig {
    /// Capacity of each cache (`BASIC_CACHE_CAPACITY`, default 100)
    pub cache_capacity: usize,
    /// Deadline of each remote call in milliseconds (`BASIC_CALL_TIMEOUT_MS`, unset = unbounded)
    pub call_timeout_ms: Option<u64>,
}

impl BasicConfig {
    /// Load configuration from environment variables.
    ///
    /// A zero timeout is ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            cache_capacity: env::var("BASIC_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CACHE_CAPACITY),
            call_timeout_ms: env::var("BASIC_CALL_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|millis| *millis > 0),
        }
    }

    /// Override the cache capacity
    #[must_use]
    pub const fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Bound every remote call by `timeout`
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Deadline applied to each remote call
    #[must_use]
    pub const fn call_deadline(&self) -> CallDeadline {
        match self.call_timeout_ms {
            Some(millis) => CallDeadline::after(Duration::from_millis(millis)),
            None => CallDeadline::UNBOUNDED,
        }
    }
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            call_timeout_ms: None,
        }
    }
}
