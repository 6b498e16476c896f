//! Optional deadlines for remote calls.
//!
//! Every remote call a reservation makes can be bounded. Unbounded is the
//! default; a call that outlives its deadline fails with
//! [`RemoteError::Timeout`] and is treated like any other remote failure of
//! that step. Nothing is retried.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use trainticket_core::error::RemoteError;
//! use trainticket_runtime::deadline::CallDeadline;
//!
//! # async fn example() {
//! let deadline = CallDeadline::after(Duration::from_millis(50));
//! let answer = deadline.run("station", async { Ok::<_, RemoteError>(7) }).await;
//! assert_eq!(answer, Ok(7));
//! # }
//! ```

use crate::metrics::RemoteCallMetrics;
use std::future::Future;
use std::time::{Duration, Instant};
use trainticket_core::error::RemoteError;

/// Deadline applied to a single remote call. `None` means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallDeadline(Option<Duration>);

impl CallDeadline {
    /// No deadline
    pub const UNBOUNDED: Self = Self(None);

    /// Deadline of `duration`
    #[must_use]
    pub const fn after(duration: Duration) -> Self {
        Self(Some(duration))
    }

    /// Build from an optional duration
    #[must_use]
    pub const fn from_option(duration: Option<Duration>) -> Self {
        Self(duration)
    }

    /// Configured duration, `None` when unbounded
    #[must_use]
    pub const fn duration(self) -> Option<Duration> {
        self.0
    }

    /// Run `call` under this deadline.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Timeout`] when the deadline elapses, otherwise
    /// whatever `call` returns.
    pub async fn run<T, F>(self, service: &'static str, call: F) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        bounded(service, self.0, call).await
    }
}

/// Run `call`, failing with [`RemoteError::Timeout`] after `deadline`.
///
/// Records the call's duration for `service` either way.
///
/// # Errors
///
/// Returns [`RemoteError::Timeout`] when the deadline elapses, otherwise
/// whatever `call` returns.
pub async fn bounded<T, F>(
    service: &'static str,
    deadline: Option<Duration>,
    call: F,
) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    let started = Instant::now();

    let result = match deadline {
        None => call.await,
        Some(after) => match tokio::time::timeout(after, call).await {
            Ok(result) => result,
            Err(_) => {
                RemoteCallMetrics::record_timeout(service);
                tracing::warn!(service, ?after, "Remote call exceeded its deadline");
                Err(RemoteError::Timeout { service, after })
            },
        },
    };

    RemoteCallMetrics::record_call(service, started.elapsed(), result.is_ok());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unbounded_call_passes_through() {
        let result = CallDeadline::UNBOUNDED
            .run("route", async { Ok::<_, RemoteError>("r1") })
            .await;
        assert_eq!(result, Ok("r1"));
    }

    #[tokio::test]
    async fn remote_errors_are_not_rewritten() {
        let failure = RemoteError::Status {
            service: "route",
            code: 503,
        };
        let result: Result<(), _> = CallDeadline::after(Duration::from_secs(1))
            .run("route", async { Err(failure.clone()) })
            .await;
        assert_eq!(result, Err(failure));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let deadline = CallDeadline::after(Duration::from_millis(20));
        let result = deadline
            .run("seat", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, RemoteError>(())
            })
            .await;

        assert_eq!(
            result,
            Err(RemoteError::Timeout {
                service: "seat",
                after: Duration::from_millis(20),
            })
        );
    }

    #[test]
    fn default_is_unbounded() {
        assert_eq!(CallDeadline::default(), CallDeadline::UNBOUNDED);
        assert_eq!(CallDeadline::from_option(None).duration(), None);
    }
}
