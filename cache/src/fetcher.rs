//! The authoritative-source strategy a cache wraps.
//!
//! A [`Fetcher`] answers `(key, context) → value | failure`. The cache calls it
//! on every lookup, so it must always talk to the real source; it is never a
//! place to add its own caching.

use std::future::Future;
use std::pin::Pin;

/// Future returned by [`Fetcher::fetch`].
pub type FetchFuture<'a, V, E> = Pin<Box<dyn Future<Output = Result<V, E>> + Send + 'a>>;

/// Authoritative source behind a [`crate::ConsistencyCheckedCache`].
///
/// # Type Parameters
///
/// - `K`: cache key
/// - `C`: per-call context passed through untouched (correlation id, credentials)
/// - `V`: value
/// - `E`: failure of the source, kept distinct from values
pub trait Fetcher<K, C, V, E>: Send + Sync {
    /// Ask the source for the current value of `key`.
    fn fetch<'a>(&'a self, key: &'a K, ctx: &'a C) -> FetchFuture<'a, V, E>;
}

/// Adapter turning an async closure over owned arguments into a [`Fetcher`].
///
/// # Example
///
/// ```
/// use trainticket_cache::{FnFetcher, Fetcher};
///
/// # async fn example() {
/// let fetcher = FnFetcher::new(|key: String, _ctx: ()| async move {
///     Ok::<_, String>(key.len())
/// });
/// let key = "abc".to_string();
/// let len = Fetcher::<String, (), usize, String>::fetch(&fetcher, &key, &()).await;
/// assert_eq!(len, Ok(3));
/// # }
/// ```
pub struct FnFetcher<F> {
    f: F,
}

impl<F> FnFetcher<F> {
    /// Wrap `f`
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<K, C, V, E, F, Fut> Fetcher<K, C, V, E> for FnFetcher<F>
where
    K: Clone + Sync,
    C: Clone + Sync,
    F: Fn(K, C) -> Fut + Send + Sync,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    fn fetch<'a>(&'a self, key: &'a K, ctx: &'a C) -> FetchFuture<'a, V, E> {
        Box::pin((self.f)(key.clone(), ctx.clone()))
    }
}
