//! Constant-delay backoff.

use crate::policy::Eligibility;
use crate::{RetryConfig, RetryHook, RetryPolicy};
use flowgate_error::{ConfigError, RetryableError};
use std::time::Duration;
use tracing::{debug, info};

/// Linear policy: every retry waits the same `delay_ms`.
pub struct LinearRetryPolicy {
    rules: Eligibility,
    delay: Duration,
    on_retry: Option<RetryHook>,
}

impl LinearRetryPolicy {
    /// Create a linear policy from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: &RetryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            max_attempts = config.max_attempts,
            delay_ms = config.delay_ms,
            "Creating linear retry policy"
        );
        Ok(Self {
            rules: Eligibility::new(config.max_attempts, config.codes()),
            delay: Duration::from_millis(config.delay_ms),
            on_retry: None,
        })
    }

    /// Attach a hook for the caller to invoke before each retry.
    pub fn with_on_retry(mut self, hook: RetryHook) -> Self {
        self.on_retry = Some(hook);
        self
    }
}

impl RetryPolicy for LinearRetryPolicy {
    fn should_retry(&self, error: &dyn RetryableError, attempt: i32) -> bool {
        let retry = self.rules.allows(error, attempt);
        debug!(attempt, retry, "Linear retry decision");
        retry
    }

    fn delay(&self, _attempt: i32) -> Duration {
        self.delay
    }

    fn max_attempts(&self) -> u32 {
        self.rules.max_attempts()
    }

    fn on_retry(&self) -> Option<&RetryHook> {
        self.on_retry.as_ref()
    }
}

impl std::fmt::Debug for LinearRetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearRetryPolicy")
            .field("rules", &self.rules)
            .field("delay", &self.delay)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}
