//! Configuration of the reservation saga.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use trainticket_runtime::CallDeadline;

/// Default capacity of each reservation cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A cache cannot hold zero entries
    #[error("cache capacity must be at least 1")]
    ZeroCapacity,

    /// A zero deadline would fail every call
    #[error("call timeout must be greater than zero (unset it for no deadline)")]
    ZeroTimeout,
}

/// Reservation saga configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreserveConfig {
    /// Capacity of each cache (`PRESERVE_CACHE_CAPACITY`, default 100)
    pub cache_capacity: usize,
    /// Deadline of each remote call in milliseconds (`PRESERVE_CALL_TIMEOUT_MS`, unset = unbounded)
    pub call_timeout_ms: Option<u64>,
}

impl PreserveConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            cache_capacity: env::var("PRESERVE_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CACHE_CAPACITY),
            call_timeout_ms: env::var("PRESERVE_CALL_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
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

    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero capacity or a zero timeout.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if matches!(self.call_timeout_ms, Some(0)) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
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

impl Default for PreserveConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            call_timeout_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded() {
        let config = PreserveConfig::default();
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.call_deadline(), CallDeadline::UNBOUNDED);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn timeout_becomes_deadline() {
        let config = PreserveConfig::default().with_call_timeout(Duration::from_millis(250));
        assert_eq!(
            config.call_deadline(),
            CallDeadline::after(Duration::from_millis(250))
        );
    }

    #[test]
    fn rejects_unusable_values() {
        assert_eq!(
            PreserveConfig::default().with_cache_capacity(0).validate(),
            Err(ConfigError::ZeroCapacity)
        );
        assert_eq!(
            PreserveConfig::default()
                .with_call_timeout(Duration::ZERO)
                .validate(),
            Err(ConfigError::ZeroTimeout)
        );
    }
}
