//! Behavioural tests of the consistency-checked cache.
//!
//! The source is a shared, mutable map so tests can make it drift between
//! reads, and every fetch is recorded so tests can see what reached it.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use trainticket_cache::{CacheMetrics, ConsistencyCheckedCache, FetchFuture, Fetcher, Invalidation};
use trainticket_core::correlation::CorrelationId;

/// Source of truth the tests can mutate, recording each `(key, ctx)` fetched.
#[derive(Clone, Default)]
struct Source {
    values: Arc<Mutex<HashMap<&'static str, i64>>>,
    calls: Arc<Mutex<Vec<(&'static str, &'static str)>>>,
}

impl Source {
    fn set(&self, key: &'static str, value: i64) {
        self.values.lock().unwrap().insert(key, value);
    }

    fn calls(&self) -> Vec<(&'static str, &'static str)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher<&'static str, &'static str, i64, String> for Source {
    fn fetch<'a>(&'a self, key: &'a &'static str, ctx: &'a &'static str) -> FetchFuture<'a, i64, String> {
        Box::pin(async move {
            self.calls.lock().unwrap().push((*key, *ctx));
            self.values
                .lock()
                .unwrap()
                .get(key)
                .copied()
                .ok_or_else(|| format!("no value for {key}"))
        })
    }
}

type TestCache = ConsistencyCheckedCache<&'static str, &'static str, i64, String>;

fn cache(capacity: usize) -> (TestCache, Source) {
    let source = Source::default();
    (ConsistencyCheckedCache::new("test", capacity, source.clone()), source)
}

fn id(raw: &str) -> CorrelationId {
    CorrelationId::new(raw)
}

#[tokio::test]
async fn unseen_key_returns_fetched_value_as_cold_miss() {
    let (cache, source) = cache(4);
    source.set("a", 1);

    assert_eq!(cache.get_or_insert(&id("1"), &"a", &"ctx").await.unwrap(), 1);

    let metrics = cache.metrics().await;
    assert_eq!(metrics.cold_misses, 1);
    assert_eq!(metrics.queries, 1);
    assert_eq!(metrics.hits, 0);
    assert!(cache.contains(&"a").await);
}

#[tokio::test]
async fn seen_key_with_stable_source_is_a_hit() {
    let (cache, source) = cache(4);
    source.set("a", 1);

    cache.get_or_insert(&id("1"), &"a", &"ctx").await.unwrap();
    assert_eq!(cache.get_or_insert(&id("1"), &"a", &"ctx").await.unwrap(), 1);

    let metrics = cache.metrics().await;
    assert_eq!(metrics.hits, 1);
    assert_eq!(metrics.queries, 2);
    // The source is consulted on every read, hit or not.
    assert_eq!(source.calls().len(), 2);
}

/// A drifted source yields the *previously stored* value once; the next read
/// sees the new one.
#[tokio::test]
async fn inconsistency_returns_stale_value_then_corrects() {
    let (cache, source) = cache(4);
    source.set("a", 1);
    cache.get_or_insert(&id("1"), &"a", &"ctx").await.unwrap();

    source.set("a", 2);
    assert_eq!(cache.get_or_insert(&id("1"), &"a", &"ctx").await.unwrap(), 1);
    assert_eq!(cache.peek(&"a").await, Some(2));
    assert_eq!(cache.get_or_insert(&id("1"), &"a", &"ctx").await.unwrap(), 2);

    let metrics = cache.metrics().await;
    assert_eq!(metrics.inconsistencies, 1);
    assert_eq!(metrics.hits, 1);
}

#[tokio::test]
async fn overflow_evicts_exactly_the_least_recently_used_key() {
    let (cache, source) = cache(2);
    for key in ["a", "b", "c"] {
        source.set(key, 0);
    }
    let req = id("1");

    cache.get_or_insert(&req, &"a", &"ctx").await.unwrap();
    cache.get_or_insert(&req, &"b", &"ctx").await.unwrap();
    // Reading "a" again promotes it, leaving "b" as the victim.
    cache.get_or_insert(&req, &"a", &"ctx").await.unwrap();
    cache.get_or_insert(&req, &"c", &"ctx").await.unwrap();

    assert_eq!(cache.keys_by_recency().await, vec!["c", "a"]);
    assert!(!cache.contains(&"b").await);
    assert_eq!(cache.metrics().await.evictions, 1);
}

#[tokio::test]
async fn unknown_id_invalidation_only_counts_redundant() {
    let (cache, source) = cache(4);
    source.set("a", 1);
    cache.get_or_insert(&id("1"), &"a", &"ctx").await.unwrap();
    let before = cache.metrics().await;

    let outcome = cache.invalidate(&id("unknown"), &"a", &"ctx", true).await.unwrap();

    assert_eq!(outcome, Invalidation::Redundant);
    let after = cache.metrics().await;
    assert_eq!(after.invalidations, before.invalidations + 1);
    assert_eq!(after.redundant_invalidations, before.redundant_invalidations + 1);
    assert!(cache.contains(&"a").await);
    // No forwarded fetch for a redundant invalidation.
    assert_eq!(source.calls().len(), 1);
}

/// The entry removed is the one remembered for the id; the forwarded fetch
/// uses the argument key and context.
#[tokio::test]
async fn invalidation_removes_remembered_key_and_forwards_argument_key() {
    let (cache, source) = cache(4);
    source.set("remembered", 1);
    source.set("argument", 2);
    let req = id("42");

    cache.get_or_insert(&req, &"argument", &"planning").await.unwrap();
    cache.get_or_insert(&req, &"remembered", &"planning").await.unwrap();

    let outcome = cache.invalidate(&req, &"argument", &"forced", true).await.unwrap();

    assert_eq!(
        outcome,
        Invalidation::Effective {
            remembered_key: "remembered",
            entry_was_present: true,
        }
    );
    assert!(!cache.contains(&"remembered").await);
    assert!(cache.contains(&"argument").await);
    assert_eq!(source.calls().last(), Some(&("argument", "forced")));
    assert_eq!(cache.ledger_len().await, 0);
}

#[tokio::test]
async fn forwarded_fetch_does_not_repopulate() {
    let (cache, source) = cache(4);
    source.set("a", 1);
    let req = id("7");
    cache.get_or_insert(&req, &"a", &"ctx").await.unwrap();

    cache.invalidate(&req, &"a", &"forced", true).await.unwrap();

    assert!(cache.is_empty().await);
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test]
async fn second_invalidation_with_same_id_is_redundant() {
    let (cache, source) = cache(4);
    source.set("a", 1);
    let req = id("7");
    cache.get_or_insert(&req, &"a", &"ctx").await.unwrap();

    assert!(cache.invalidate(&req, &"a", &"ctx", false).await.unwrap().is_effective());
    assert_eq!(
        cache.invalidate(&req, &"a", &"ctx", false).await.unwrap(),
        Invalidation::Redundant
    );

    let metrics = cache.metrics().await;
    assert_eq!(metrics.invalidations, 2);
    assert_eq!(metrics.effective_invalidations(), 1);
}

#[tokio::test]
async fn fetch_failure_changes_nothing_but_its_counter() {
    let (cache, source) = cache(4);
    source.set("a", 1);
    let req = id("1");
    cache.get_or_insert(&req, &"a", &"ctx").await.unwrap();

    let error = cache.get_or_insert(&id("2"), &"missing", &"ctx").await.unwrap_err();

    assert_eq!(error, "no value for missing");
    assert_eq!(
        cache.metrics().await,
        CacheMetrics {
            queries: 1,
            cold_misses: 1,
            fetch_failures: 1,
            ..CacheMetrics::default()
        }
    );
    assert_eq!(cache.remembered_key(&id("2")).await, None);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn failed_forward_still_removes_entry() {
    let (cache, source) = cache(4);
    source.set("a", 1);
    let req = id("1");
    cache.get_or_insert(&req, &"a", &"ctx").await.unwrap();

    let result = cache.invalidate(&req, &"missing", &"forced", true).await;

    assert!(result.is_err());
    assert!(!cache.contains(&"a").await);
    assert_eq!(cache.metrics().await.fetch_failures, 1);
}

#[tokio::test]
async fn concurrent_requests_keep_separate_ledger_entries() {
    let (cache, source) = cache(8);
    source.set("a", 1);
    source.set("b", 2);
    let cache = Arc::new(cache);

    let first = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get_or_insert(&id("1"), &"a", &"ctx").await })
    };
    let second = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get_or_insert(&id("2"), &"b", &"ctx").await })
    };
    assert_eq!(first.await.unwrap().unwrap(), 1);
    assert_eq!(second.await.unwrap().unwrap(), 2);

    assert_eq!(cache.remembered_key(&id("1")).await, Some("a"));
    assert_eq!(cache.remembered_key(&id("2")).await, Some("b"));
}

#[derive(Debug, Clone)]
enum Step {
    Read { req: u8, key: usize, value: i64 },
    Invalidate { req: u8, key: usize, forward: bool },
}

const KEYS: [&str; 6] = ["k0", "k1", "k2", "k3", "k4", "k5"];

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0u8..4, 0..KEYS.len(), 0i64..3).prop_map(|(req, key, value)| Step::Read { req, key, value }),
        1 => (0u8..4, 0..KEYS.len(), any::<bool>()).prop_map(|(req, key, forward)| Step::Invalidate { req, key, forward }),
    ]
}

proptest! {
    /// Counter identities and the capacity bound hold after any sequence of
    /// reads (with a drifting source) and invalidations.
    #[test]
    fn counters_stay_consistent(capacity in 1usize..5, steps in proptest::collection::vec(step(), 0..48)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let (cache, source) = cache(capacity);
            for key in KEYS {
                source.set(key, 0);
            }

            let mut fetches = 0usize;
            for step in steps {
                match step {
                    Step::Read { req, key, value } => {
                        source.set(KEYS[key], value);
                        cache.get_or_insert(&id(&req.to_string()), &KEYS[key], &"ctx").await.unwrap();
                        fetches += 1;
                    },
                    Step::Invalidate { req, key, forward } => {
                        let outcome = cache.invalidate(&id(&req.to_string()), &KEYS[key], &"ctx", forward).await.unwrap();
                        if forward && outcome.is_effective() {
                            fetches += 1;
                        }
                    },
                }

                let metrics = cache.metrics().await;
                prop_assert_eq!(metrics.queries, metrics.hits + metrics.cold_misses + metrics.inconsistencies);
                prop_assert!(metrics.redundant_invalidations <= metrics.invalidations);
                prop_assert!(cache.len().await <= capacity);
                prop_assert!(cache.ledger_len().await <= 4);
            }
            prop_assert_eq!(source.calls().len(), fetches);
            Ok(())
        })?;
    }
}
