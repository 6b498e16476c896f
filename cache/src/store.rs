//! The consistency-checked cache.
//!
//! # Read path
//!
//! [`ConsistencyCheckedCache::get_or_insert`] always asks the [`Fetcher`]
//! first; the source is the truth and the store is only used to *detect*
//! drift:
//!
//! | stored value       | counted as        | stored afterwards | returned      |
//! |--------------------|-------------------|-------------------|---------------|
//! | absent             | `cold_misses`     | fetched           | fetched       |
//! | equal to fetched   | `hits`            | unchanged         | stored        |
//! | differs            | `inconsistencies` | fetched           | **stored**    |
//!
//! On an inconsistency the caller still gets the previously stored value;
//! the next read observes the corrected entry.
//!
//! # Invalidation
//!
//! Every successful read remembers `correlation id → key`. A later
//! [`ConsistencyCheckedCache::invalidate`] with the same id removes the entry
//! for the **remembered** key, then (with `forward`) re-fetches the
//! **argument** key so the source can act on it, discarding the answer. The
//! two keys are normally identical; the cache does not check that they are.

use crate::arena::RecencyArena;
use crate::fetcher::Fetcher;
use crate::ledger::CorrelationLedger;
use crate::metrics::{self, CacheMetrics, names};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use trainticket_core::correlation::CorrelationId;

/// Outcome of [`ConsistencyCheckedCache::invalidate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invalidation<K> {
    /// No key was remembered for the correlation id. Nothing changed.
    Redundant,
    /// The remembered key was dropped from the store.
    Effective {
        /// Key remembered for the correlation id (the one removed)
        remembered_key: K,
        /// Whether the key was still stored (it may have been evicted)
        entry_was_present: bool,
    },
}

impl<K> Invalidation<K> {
    /// Whether a remembered key was found
    #[must_use]
    pub const fn is_effective(&self) -> bool {
        matches!(self, Self::Effective { .. })
    }
}

#[derive(Debug)]
struct CacheState<K, V> {
    entries: RecencyArena<K, V>,
    ledger: CorrelationLedger<K>,
    counters: CacheMetrics,
}

/// LRU cache that validates every read against its source and tracks which
/// request read which key.
///
/// Shared between concurrent requests behind an `Arc`. Storage and ledger
/// updates are serialized; the fetch runs without holding the lock.
///
/// # Example
///
/// ```
/// use trainticket_cache::{ConsistencyCheckedCache, FnFetcher};
/// use trainticket_core::correlation::CorrelationId;
///
/// # async fn example() -> Result<(), String> {
/// let cache = ConsistencyCheckedCache::new(
///     "lengths",
///     16,
///     FnFetcher::new(|key: String, _ctx: ()| async move { Ok::<_, String>(key.len()) }),
/// );
///
/// let id = CorrelationId::new("1");
/// assert_eq!(cache.get_or_insert(&id, &"abc".to_string(), &()).await?, 3);
/// assert_eq!(cache.metrics().await.cold_misses, 1);
/// # Ok(())
/// # }
/// ```
pub struct ConsistencyCheckedCache<K, C, V, E> {
    name: String,
    capacity: usize,
    fetcher: Arc<dyn Fetcher<K, C, V, E>>,
    state: Mutex<CacheState<K, V>>,
}

impl<K, C, V, E> Debug for ConsistencyCheckedCache<K, C, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsistencyCheckedCache")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, C, V, E> ConsistencyCheckedCache<K, C, V, E>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    C: Send + Sync + 'static,
    V: Clone + PartialEq + Debug + Send + Sync + 'static,
    E: Display + Send + Sync + 'static,
{
    /// Create a cache named `name` holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    pub fn new<F>(name: impl Into<String>, capacity: usize, fetcher: F) -> Self
    where
        F: Fetcher<K, C, V, E> + 'static,
    {
        Self::with_shared_fetcher(name, capacity, Arc::new(fetcher))
    }

    /// Create a cache over a fetcher that is shared elsewhere.
    pub fn with_shared_fetcher(
        name: impl Into<String>,
        capacity: usize,
        fetcher: Arc<dyn Fetcher<K, C, V, E>>,
    ) -> Self {
        let entries = RecencyArena::new(capacity);
        Self {
            name: name.into(),
            capacity: entries.capacity(),
            fetcher,
            state: Mutex::new(CacheState {
                entries,
                ledger: CorrelationLedger::new(),
                counters: CacheMetrics::default(),
            }),
        }
    }

    /// Cache name, used as the `cache` label of emitted metrics
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of stored entries
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read `key` through the source and reconcile it with the stored value.
    ///
    /// See the module documentation for the outcome table. On success the
    /// key is remembered for `id`. A fetch failure is returned as is and
    /// changes nothing except the `fetch_failures` counter.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error when the source could not answer.
    pub async fn get_or_insert(&self, id: &CorrelationId, key: &K, ctx: &C) -> Result<V, E> {
        let fetched = match self.fetcher.fetch(key, ctx).await {
            Ok(value) => value,
            Err(error) => {
                self.record_fetch_failure(id, key, &error).await;
                return Err(error);
            },
        };

        let mut state = self.state.lock().await;
        state.counters.queries += 1;
        metrics::emit(names::QUERIES, &self.name);

        let returned = match state.entries.peek(key).cloned() {
            None => {
                state.counters.cold_misses += 1;
                metrics::emit(names::COLD_MISSES, &self.name);
                tracing::debug!(cache = %self.name, correlation_id = %id, ?key, "Cold miss");

                if let Some((evicted, _)) = state.entries.insert(key.clone(), fetched.clone()) {
                    state.counters.evictions += 1;
                    metrics::emit(names::EVICTIONS, &self.name);
                    tracing::debug!(cache = %self.name, key = ?evicted, "Evicted least recently used entry");
                }
                fetched
            },
            Some(stored) if stored == fetched => {
                state.counters.hits += 1;
                metrics::emit(names::HITS, &self.name);
                state.entries.touch(key);
                tracing::debug!(cache = %self.name, correlation_id = %id, ?key, "Hit");
                stored
            },
            Some(stored) => {
                state.counters.inconsistencies += 1;
                metrics::emit(names::INCONSISTENCIES, &self.name);
                tracing::warn!(
                    cache = %self.name,
                    correlation_id = %id,
                    ?key,
                    ?stored,
                    ?fetched,
                    "Stored value diverged from source, returning stored value"
                );
                state.entries.insert(key.clone(), fetched);
                stored
            },
        };

        state.ledger.remember(id, key.clone());
        drop(state);

        Ok(returned)
    }

    /// Drop the entry read under `id`, optionally forwarding a fetch of `key`.
    ///
    /// The removed entry is the one *remembered* for `id`, which is not
    /// necessarily `key`. With `forward`, `key` and `ctx` are passed to the
    /// source after the removal and the answer is discarded; the store is not
    /// repopulated.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error when the forwarded fetch fails. The entry
    /// has already been removed at that point.
    pub async fn invalidate(
        &self,
        id: &CorrelationId,
        key: &K,
        ctx: &C,
        forward: bool,
    ) -> Result<Invalidation<K>, E> {
        let outcome = {
            let mut state = self.state.lock().await;
            state.counters.invalidations += 1;
            metrics::emit(names::INVALIDATIONS, &self.name);

            match state.ledger.take(id) {
                None => {
                    state.counters.redundant_invalidations += 1;
                    metrics::emit(names::REDUNDANT_INVALIDATIONS, &self.name);
                    None
                },
                Some(remembered_key) => {
                    let entry_was_present = state.entries.remove(&remembered_key).is_some();
                    Some(Invalidation::Effective {
                        remembered_key,
                        entry_was_present,
                    })
                },
            }
        };

        let Some(outcome) = outcome else {
            tracing::debug!(cache = %self.name, correlation_id = %id, "Redundant invalidation");
            return Ok(Invalidation::Redundant);
        };

        tracing::info!(cache = %self.name, correlation_id = %id, forward, "Invalidated");

        if forward {
            if let Err(error) = self.fetcher.fetch(key, ctx).await {
                self.record_fetch_failure(id, key, &error).await;
                return Err(error);
            }
        }

        Ok(outcome)
    }

    /// Release the ledger entry for `id` without invalidating anything.
    ///
    /// Returns whether a key was remembered.
    pub async fn forget(&self, id: &CorrelationId) -> bool {
        self.state.lock().await.ledger.forget(id)
    }

    /// Snapshot of the counters
    pub async fn metrics(&self) -> CacheMetrics {
        self.state.lock().await.counters
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    /// Whether `key` is stored
    pub async fn contains(&self, key: &K) -> bool {
        self.state.lock().await.entries.contains(key)
    }

    /// Stored value for `key` without fetching or changing recency
    pub async fn peek(&self, key: &K) -> Option<V> {
        self.state.lock().await.entries.peek(key).cloned()
    }

    /// Key remembered for `id`, if any
    pub async fn remembered_key(&self, id: &CorrelationId) -> Option<K> {
        self.state.lock().await.ledger.get(id).cloned()
    }

    /// Number of correlation ids with a remembered key
    pub async fn ledger_len(&self) -> usize {
        self.state.lock().await.ledger.len()
    }

    /// Stored keys from most to least recently used
    pub async fn keys_by_recency(&self) -> Vec<K> {
        self.state.lock().await.entries.keys_by_recency()
    }

    async fn record_fetch_failure(&self, id: &CorrelationId, key: &K, error: &E) {
        self.state.lock().await.counters.fetch_failures += 1;
        metrics::emit(names::FETCH_FAILURES, &self.name);
        tracing::warn!(cache = %self.name, correlation_id = %id, ?key, %error, "Fetch failed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fetcher::FnFetcher;

    fn doubling_cache(capacity: usize) -> ConsistencyCheckedCache<u32, (), u32, String> {
        ConsistencyCheckedCache::new(
            "doubling",
            capacity,
            FnFetcher::new(|key: u32, _ctx: ()| async move { Ok::<_, String>(key * 2) }),
        )
    }

    #[tokio::test]
    async fn capacity_is_clamped() {
        let cache = doubling_cache(0);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.name(), "doubling");
    }

    #[tokio::test]
    async fn hit_promotes_key() {
        let cache = doubling_cache(2);
        let id = CorrelationId::new("1");

        cache.get_or_insert(&id, &1, &()).await.unwrap();
        cache.get_or_insert(&id, &2, &()).await.unwrap();
        cache.get_or_insert(&id, &1, &()).await.unwrap();

        assert_eq!(cache.keys_by_recency().await, vec![1, 2]);
        assert_eq!(cache.metrics().await.hits, 1);
    }

    #[tokio::test]
    async fn forget_releases_ledger_without_counting() {
        let cache = doubling_cache(4);
        let id = CorrelationId::new("9");

        cache.get_or_insert(&id, &3, &()).await.unwrap();
        assert_eq!(cache.remembered_key(&id).await, Some(3));

        assert!(cache.forget(&id).await);
        assert_eq!(cache.ledger_len().await, 0);
        assert_eq!(cache.metrics().await.invalidations, 0);
        assert!(cache.contains(&3).await);
    }

    #[tokio::test]
    async fn invalidation_after_eviction_is_still_effective() {
        let cache = doubling_cache(1);
        let id = CorrelationId::new("1");
        let other = CorrelationId::new("2");

        cache.get_or_insert(&id, &1, &()).await.unwrap();
        cache.get_or_insert(&other, &2, &()).await.unwrap();

        let outcome = cache.invalidate(&id, &1, &(), false).await.unwrap();
        assert_eq!(
            outcome,
            Invalidation::Effective {
                remembered_key: 1,
                entry_was_present: false,
            }
        );
        assert!(cache.contains(&2).await);
    }
}
