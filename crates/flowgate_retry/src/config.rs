//! Retry configuration.
//!
//! ```toml
//! [retry]
//! strategy = "exponential"
//! max_attempts = 5
//! initial_delay_ms = 500
//! max_delay_ms = 20000
//! backoff_multiplier = 2.0
//! jitter = true
//! retryable_codes = ["rate_limit", "timeout", "network", "service_unavailable"]
//! ```

use crate::{ExponentialRetryPolicy, LinearRetryPolicy, RetryHook, RetryPolicy};
use derive_setters::Setters;
use flowgate_error::{ConfigError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Backoff shape between attempts.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RetryStrategy {
    /// `initial_delay_ms * backoff_multiplier^(attempt - 1)`, capped at `max_delay_ms`
    #[default]
    Exponential,
    /// Constant `delay_ms`
    Linear,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_retryable_codes() -> Vec<String> {
    ErrorCode::DEFAULT_RETRYABLE
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Retry policy configuration.
///
/// Exponential fields are ignored by the linear strategy and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_")]
pub struct RetryConfig {
    /// Backoff shape (default exponential)
    #[serde(default)]
    pub strategy: RetryStrategy,

    /// Total attempts including the first call (default 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First exponential delay in milliseconds (default 1000)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Exponential delay ceiling in milliseconds (default 30000)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Exponential growth factor (default 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Linear delay in milliseconds (default 1000)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Randomise exponential delays (default false)
    #[serde(default)]
    pub jitter: bool,

    /// Error codes worth retrying (default rate_limit, timeout, network, service_unavailable)
    #[serde(default = "default_retryable_codes")]
    pub retryable_codes: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            strategy: RetryStrategy::default(),
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            delay_ms: default_delay_ms(),
            jitter: false,
            retryable_codes: default_retryable_codes(),
        }
    }
}

impl RetryConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the multiplier is non-finite or below 1.0, if the
    /// initial delay exceeds the ceiling, or if a retryable code is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::new(format!(
                "backoff_multiplier must be a finite number >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ConfigError::new(format!(
                "initial_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            )));
        }
        if self.retryable_codes.iter().any(|code| code.trim().is_empty()) {
            return Err(ConfigError::invalid_field(
                "retryable_codes",
                "must not contain blank codes",
            ));
        }
        Ok(())
    }

    /// Parsed retryable codes.
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.retryable_codes
            .iter()
            .map(|code| ErrorCode::custom(code))
            .collect()
    }

    /// Builds a shared policy for the configured strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn build(&self) -> Result<Arc<dyn RetryPolicy>, ConfigError> {
        self.build_with_hook(None)
    }

    /// Builds a shared policy carrying an `on_retry` hook.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    #[instrument(skip_all, fields(strategy = %self.strategy))]
    pub fn build_with_hook(
        &self,
        on_retry: Option<RetryHook>,
    ) -> Result<Arc<dyn RetryPolicy>, ConfigError> {
        let policy: Arc<dyn RetryPolicy> = match self.strategy {
            RetryStrategy::Exponential => {
                let mut policy = ExponentialRetryPolicy::new(self)?;
                if let Some(hook) = on_retry {
                    policy = policy.with_on_retry(hook);
                }
                Arc::new(policy)
            }
            RetryStrategy::Linear => {
                let mut policy = LinearRetryPolicy::new(self)?;
                if let Some(hook) = on_retry {
                    policy = policy.with_on_retry(hook);
                }
                Arc::new(policy)
            }
        };
        debug!(max_attempts = policy.max_attempts(), "Built retry policy");
        Ok(policy)
    }
}
