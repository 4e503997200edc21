//! Bounded wait: race a lookup against a deadline.
//!
//! The lookup runs as its own task. If the deadline elapses first the caller
//! gets the fallback value and the task is detached: it may still finish, but
//! its output is dropped and nothing observes it.

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The deadline elapsed before the lookup finished.
    DeadlineElapsed,
    /// The lookup task panicked or was cancelled.
    LookupAborted,
}

/// Which side of the race produced the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<T> {
    Lookup(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Settled<T> {
    pub fn into_value(self) -> T {
        match self {
            Settled::Lookup(value) | Settled::Fallback { value, .. } => value,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Settled::Fallback { .. })
    }

    #[must_use]
    pub const fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Settled::Lookup(_) => None,
            Settled::Fallback { reason, .. } => Some(*reason),
        }
    }
}

/// Run `lookup` with at most `deadline` to finish.
///
/// `fallback` is called at most once, and only when the lookup did not
/// deliver in time.
pub async fn within_deadline<F, T>(
    lookup: F,
    deadline: Duration,
    fallback: impl FnOnce(FallbackReason) -> T,
) -> Settled<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::spawn(lookup);

    // Dropping the JoinHandle on timeout detaches the task without aborting it.
    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(value)) => Settled::Lookup(value),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "Lookup task aborted; using fallback");
            let reason = FallbackReason::LookupAborted;
            Settled::Fallback {
                value: fallback(reason),
                reason,
            }
        }
        Err(_) => {
            tracing::debug!(
                deadline_ms = deadline.as_millis(),
                "Lookup exceeded deadline; using fallback"
            );
            let reason = FallbackReason::DeadlineElapsed;
            Settled::Fallback {
                value: fallback(reason),
                reason,
            }
        }
    }
}
