//! The retry policy trait and the eligibility rules shared by its implementations.

use flowgate_error::{ErrorCode, RetryableError};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Observer invoked with the failed error and its attempt number before a retry.
pub type RetryHook = Arc<dyn Fn(&dyn RetryableError, i32) + Send + Sync>;

/// Decides whether a failed call is retried and how long to wait first.
///
/// Policies only classify and compute; they never sleep or run the
/// operation. [`crate::execute`] drives an operation with a policy.
///
/// Attempt numbers start at 1 for the first call. Zero or negative attempt
/// numbers mean "not yet attempted" and never count against the limit.
pub trait RetryPolicy: Send + Sync {
    /// Whether the call that failed on `attempt` with `error` should be retried.
    fn should_retry(&self, error: &dyn RetryableError, attempt: i32) -> bool;

    /// Delay to wait after `attempt` failed, before the next attempt.
    fn delay(&self, attempt: i32) -> Duration;

    /// Total number of attempts this policy allows.
    fn max_attempts(&self) -> u32;

    /// Hook the caller should invoke before each retry, if one is set.
    fn on_retry(&self) -> Option<&RetryHook>;
}

/// Attempt ceiling plus the set of codes worth retrying.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Eligibility {
    max_attempts: u32,
    retryable: BTreeSet<ErrorCode>,
}

impl Eligibility {
    pub(crate) fn new(max_attempts: u32, retryable: impl IntoIterator<Item = ErrorCode>) -> Self {
        Self {
            max_attempts,
            retryable: retryable.into_iter().collect(),
        }
    }

    pub(crate) fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub(crate) fn allows(&self, error: &dyn RetryableError, attempt: i32) -> bool {
        if self.max_attempts == 0 {
            return false;
        }
        if attempt > 0 && attempt.unsigned_abs() >= self.max_attempts {
            return false;
        }
        match error.error_code() {
            Some(code) => code.is_connection_failure() || self.retryable.contains(&code),
            None => false,
        }
    }
}

impl fmt::Debug for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Eligibility")
            .field("max_attempts", &self.max_attempts)
            .field(
                "retryable",
                &self.retryable.iter().map(ToString::to_string).collect::<Vec<_>>(),
            )
            .finish()
    }
}
