//! Exponential backoff.

use crate::policy::Eligibility;
use crate::{RetryConfig, RetryHook, RetryPolicy};
use flowgate_error::{ConfigError, RetryableError};
use std::time::Duration;
use tokio_retry2::strategy::jitter;
use tracing::{debug, info};

/// Exponential backoff policy.
///
/// The delay after attempt `n` is
/// `min(max_delay_ms, initial_delay_ms * backoff_multiplier^(n - 1))`. With
/// jitter enabled the delay is scaled by a random factor in `[0, 1)`, so it
/// never leaves `[0, max_delay_ms]`.
///
/// # Example
///
/// ```
/// use flowgate_retry::{ExponentialRetryPolicy, RetryConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = ExponentialRetryPolicy::new(&RetryConfig::default()).unwrap();
/// assert_eq!(policy.delay(1), Duration::from_millis(1000));
/// assert_eq!(policy.delay(3), Duration::from_millis(4000));
/// ```
pub struct ExponentialRetryPolicy {
    rules: Eligibility,
    initial_delay_ms: u64,
    max_delay_ms: u64,
    backoff_multiplier: f64,
    jitter: bool,
    on_retry: Option<RetryHook>,
}

impl ExponentialRetryPolicy {
    /// Create an exponential policy from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: &RetryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            max_attempts = config.max_attempts,
            initial_delay_ms = config.initial_delay_ms,
            max_delay_ms = config.max_delay_ms,
            jitter = config.jitter,
            "Creating exponential retry policy"
        );
        Ok(Self {
            rules: Eligibility::new(config.max_attempts, config.codes()),
            initial_delay_ms: config.initial_delay_ms,
            max_delay_ms: config.max_delay_ms,
            backoff_multiplier: config.backoff_multiplier,
            jitter: config.jitter,
            on_retry: None,
        })
    }

    /// Attach a hook for the caller to invoke before each retry.
    pub fn with_on_retry(mut self, hook: RetryHook) -> Self {
        self.on_retry = Some(hook);
        self
    }
}

impl RetryPolicy for ExponentialRetryPolicy {
    fn should_retry(&self, error: &dyn RetryableError, attempt: i32) -> bool {
        let retry = self.rules.allows(error, attempt);
        debug!(attempt, retry, "Exponential retry decision");
        retry
    }

    fn delay(&self, attempt: i32) -> Duration {
        if self.initial_delay_ms == 0 {
            return Duration::ZERO;
        }
        let exponent = attempt.max(1) - 1;
        let max = self.max_delay_ms as f64;
        let millis = (self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent)).min(max);
        let delay = Duration::from_nanos((millis * 1_000_000.0).round() as u64);
        if self.jitter {
            jitter(delay).min(Duration::from_millis(self.max_delay_ms))
        } else {
            delay
        }
    }

    fn max_attempts(&self) -> u32 {
        self.rules.max_attempts()
    }

    fn on_retry(&self) -> Option<&RetryHook> {
        self.on_retry.as_ref()
    }
}

impl std::fmt::Debug for ExponentialRetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExponentialRetryPolicy")
            .field("rules", &self.rules)
            .field("initial_delay_ms", &self.initial_delay_ms)
            .field("max_delay_ms", &self.max_delay_ms)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .field("jitter", &self.jitter)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}
