//! Drive an async operation under a retry policy.

use crate::RetryPolicy;
use flowgate_error::RetryableError;
use std::fmt::Display;
use std::future::Future;
use tokio_retry2::{Retry, RetryError};
use tracing::{instrument, warn};

/// Run `operation` until it succeeds or `policy` declines another attempt.
///
/// After a failure on attempt `n` the policy's [`RetryPolicy::should_retry`]
/// decides; a retryable failure invokes the policy's `on_retry` hook and then
/// waits [`RetryPolicy::delay`]`(n)` before the next call. The last error is
/// returned once the policy declines.
///
/// # Example
///
/// ```rust,ignore
/// let policy = RetryConfig::default().build()?;
/// let embedding = flowgate_retry::execute(policy.as_ref(), || async {
///     provider.embed(&text).await
/// })
/// .await?;
/// ```
#[instrument(skip_all, fields(max_attempts = policy.max_attempts()))]
pub async fn execute<P, F, Fut, T, E>(policy: &P, mut operation: F) -> Result<T, E>
where
    P: RetryPolicy + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + Display,
{
    let delays = (1..).map(|attempt| policy.delay(attempt));
    let mut attempt = 0;

    Retry::spawn(delays, || {
        attempt += 1;
        let current = attempt;
        let call = operation();
        async move {
            match call.await {
                Ok(value) => Ok(value),
                Err(e) => {
                    if policy.should_retry(&e, current) {
                        warn!(attempt = current, error = %e, "Transient error, will retry");
                        if let Some(hook) = policy.on_retry() {
                            hook(&e, current);
                        }
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    } else {
                        warn!(attempt = current, error = %e, "Giving up");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        }
    })
    .await
}
