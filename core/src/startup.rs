//! Choosing the first screen after launch.
//!
//! The number of registered users decides between registration and sign-in.
//! The count lookup is bounded by [`StartupPolicy::lookup_timeout`]; a slow,
//! failed, or crashed lookup resolves to [`StartupPolicy::fallback`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crewbook_types::{ErrorCode, Resource, StartDestination};

use crate::deadline::{FallbackReason, within_deadline};

/// Source of the registered-user count.
pub trait UserDirectory: Send + Sync + 'static {
    fn user_count(&self) -> impl Future<Output = Resource<usize>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupPolicy {
    pub lookup_timeout: Duration,
    pub fallback: StartDestination,
}

impl StartupPolicy {
    pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(3000);
}

impl Default for StartupPolicy {
    fn default() -> Self {
        Self {
            lookup_timeout: Self::DEFAULT_LOOKUP_TIMEOUT,
            fallback: StartDestination::SignIn,
        }
    }
}

/// What the destination was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionBasis {
    UserCount(usize),
    LookupFailed(ErrorCode),
    LookupPending,
    Fallback(FallbackReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartDecision {
    pub destination: StartDestination,
    pub basis: DecisionBasis,
}

impl StartDecision {
    /// Map a finished count lookup to a destination.
    pub fn from_count(count: Resource<usize>, fallback: StartDestination) -> Self {
        count.fold(
            |users| Self {
                destination: if users > 0 {
                    StartDestination::SignIn
                } else {
                    StartDestination::Register
                },
                basis: DecisionBasis::UserCount(users),
            },
            |failure| {
                tracing::warn!(
                    code = %failure.code(),
                    detail = failure.message(),
                    "User count lookup failed"
                );
                Self {
                    destination: fallback,
                    basis: DecisionBasis::LookupFailed(failure.code()),
                }
            },
            || Self {
                destination: fallback,
                basis: DecisionBasis::LookupPending,
            },
        )
    }

    #[must_use]
    pub const fn used_fallback(&self) -> bool {
        !matches!(self.basis, DecisionBasis::UserCount(_))
    }
}

/// Decide where the app starts, waiting at most `policy.lookup_timeout`.
pub async fn decide_start_destination<D>(
    directory: Arc<D>,
    policy: StartupPolicy,
) -> StartDecision
where
    D: UserDirectory,
{
    let fallback = policy.fallback;
    let lookup = async move {
        let count = directory.user_count().await;
        StartDecision::from_count(count, fallback)
    };

    let decision = within_deadline(lookup, policy.lookup_timeout, |reason| StartDecision {
        destination: fallback,
        basis: DecisionBasis::Fallback(reason),
    })
    .await
    .into_value();

    tracing::info!(
        destination = %decision.destination,
        basis = ?decision.basis,
        "Start destination decided"
    );
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewbook_types::Failure;

    struct Fixed(Resource<usize>);

    impl UserDirectory for Fixed {
        async fn user_count(&self) -> Resource<usize> {
            self.0.clone()
        }
    }

    struct Slow {
        delay: Duration,
        count: usize,
    }

    impl UserDirectory for Slow {
        async fn user_count(&self) -> Resource<usize> {
            tokio::time::sleep(self.delay).await;
            Resource::success(self.count)
        }
    }

    fn policy(fallback: StartDestination) -> StartupPolicy {
        StartupPolicy {
            lookup_timeout: Duration::from_secs(3),
            fallback,
        }
    }

    #[test]
    fn default_policy() {
        let policy = StartupPolicy::default();
        assert_eq!(policy.lookup_timeout, Duration::from_millis(3000));
        assert_eq!(policy.fallback, StartDestination::SignIn);
    }

    #[test]
    fn count_maps_to_destination() {
        let none = StartDecision::from_count(Resource::success(0), StartDestination::SignIn);
        assert_eq!(none.destination, StartDestination::Register);
        assert!(!none.used_fallback());

        let some = StartDecision::from_count(Resource::success(3), StartDestination::Register);
        assert_eq!(some.destination, StartDestination::SignIn);
        assert_eq!(some.basis, DecisionBasis::UserCount(3));
    }

    #[test]
    fn failed_or_pending_count_uses_fallback() {
        let failed = StartDecision::from_count(
            Resource::Failure(Failure::new("db locked").with_code(ErrorCode::StorageError)),
            StartDestination::Register,
        );
        assert_eq!(failed.destination, StartDestination::Register);
        assert_eq!(failed.basis, DecisionBasis::LookupFailed(ErrorCode::StorageError));
        assert!(failed.used_fallback());

        let pending = StartDecision::from_count(Resource::pending(), StartDestination::SignIn);
        assert_eq!(pending.destination, StartDestination::SignIn);
        assert_eq!(pending.basis, DecisionBasis::LookupPending);
    }

    #[tokio::test(start_paused = true)]
    async fn registered_users_go_to_sign_in() {
        let decision = decide_start_destination(
            Arc::new(Fixed(Resource::success(2))),
            policy(StartDestination::Register),
        )
        .await;
        assert_eq!(decision.destination, StartDestination::SignIn);
        assert_eq!(decision.basis, DecisionBasis::UserCount(2));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_directory_goes_to_register() {
        let decision = decide_start_destination(
            Arc::new(Fixed(Resource::success(0))),
            policy(StartDestination::SignIn),
        )
        .await;
        assert_eq!(decision.destination, StartDestination::Register);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookup_uses_fallback() {
        let directory = Slow {
            delay: Duration::from_secs(30),
            count: 0,
        };
        let decision =
            decide_start_destination(Arc::new(directory), policy(StartDestination::SignIn)).await;
        assert_eq!(decision.destination, StartDestination::SignIn);
        assert_eq!(
            decision.basis,
            DecisionBasis::Fallback(FallbackReason::DeadlineElapsed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_just_inside_deadline_counts() {
        let directory = Slow {
            delay: Duration::from_millis(2_900),
            count: 0,
        };
        let decision =
            decide_start_destination(Arc::new(directory), policy(StartDestination::SignIn)).await;
        assert_eq!(decision.destination, StartDestination::Register);
        assert_eq!(decision.basis, DecisionBasis::UserCount(0));
    }
}
