//! Configuration structures for rate limiting.
//!
//! Limiters are configured from plain serde structures so they can be loaded
//! from TOML alongside the rest of the Flowgate configuration:
//!
//! ```toml
//! [rate_limit]
//! strategy = "token_bucket"
//! requests_per_minute = 60
//! max_concurrent = 10
//! burst_size = 10
//! ```
//!
//! Every field is optional; omitted fields take the documented defaults.
//! Values are validated when the limiter is built, never at admission time.

use crate::{
    RateLimitError, RateLimitResult, RateLimiter, SlidingWindowLimiter, TokenBucketLimiter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

fn default_requests_per_minute() -> u32 {
    60
}

fn default_max_concurrent() -> u32 {
    10
}

fn default_burst_size() -> u32 {
    10
}

fn default_window_ms() -> u64 {
    60_000
}

/// Token bucket limiter configuration.
///
/// Tokens refill continuously at `requests_per_minute / 60_000` per
/// millisecond up to `burst_size`. Each admitted request consumes one token
/// and one of `max_concurrent` slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBucketConfig {
    /// Refill rate in requests per minute (default 60)
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Maximum simultaneously admitted requests (default 10)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: u32,

    /// Bucket capacity (default 10)
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    /// Length of the observability window counter in milliseconds (default 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl Default for TokenBucketConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            max_concurrent: default_max_concurrent(),
            burst_size: default_burst_size(),
            window_ms: default_window_ms(),
        }
    }
}

impl TokenBucketConfig {
    /// Validates that every limit is non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first zero-valued field.
    pub fn validate(&self) -> RateLimitResult<()> {
        if self.requests_per_minute == 0 {
            return Err(RateLimitError::invalid(
                "requests_per_minute",
                "must be greater than zero",
            ));
        }
        if self.max_concurrent == 0 {
            return Err(RateLimitError::invalid(
                "max_concurrent",
                "must be greater than zero",
            ));
        }
        if self.burst_size == 0 {
            return Err(RateLimitError::invalid("burst_size", "must be greater than zero"));
        }
        if self.window_ms == 0 {
            return Err(RateLimitError::invalid("window_ms", "must be greater than zero"));
        }
        Ok(())
    }
}

/// Sliding window limiter configuration.
///
/// At most `requests_per_minute` requests are admitted within any trailing
/// `window_ms` interval. Concurrency is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidingWindowConfig {
    /// Maximum requests per window (default 60)
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Window length in milliseconds (default 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl Default for SlidingWindowConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            window_ms: default_window_ms(),
        }
    }
}

impl SlidingWindowConfig {
    /// Validates that the limit and window are non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first zero-valued field.
    pub fn validate(&self) -> RateLimitResult<()> {
        if self.requests_per_minute == 0 {
            return Err(RateLimitError::invalid(
                "requests_per_minute",
                "must be greater than zero",
            ));
        }
        if self.window_ms == 0 {
            return Err(RateLimitError::invalid("window_ms", "must be greater than zero"));
        }
        Ok(())
    }
}

/// Limiter configuration tagged by strategy.
///
/// # Example
///
/// ```
/// use flowgate_rate_limit::{RateLimiterConfig, SlidingWindowConfig};
///
/// let config = RateLimiterConfig::SlidingWindow(SlidingWindowConfig {
///     requests_per_minute: 30,
///     window_ms: 60_000,
/// });
/// let limiter = config.build().unwrap();
/// assert_eq!(limiter.state().requests_per_minute, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RateLimiterConfig {
    /// Token bucket with a concurrency cap
    TokenBucket(TokenBucketConfig),
    /// Sliding window of request timestamps
    SlidingWindow(SlidingWindowConfig),
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        RateLimiterConfig::TokenBucket(TokenBucketConfig::default())
    }
}

impl RateLimiterConfig {
    /// Validates the configuration for the selected strategy.
    pub fn validate(&self) -> RateLimitResult<()> {
        match self {
            RateLimiterConfig::TokenBucket(config) => config.validate(),
            RateLimiterConfig::SlidingWindow(config) => config.validate(),
        }
    }

    /// Builds a shared limiter for the selected strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    #[instrument(skip(self))]
    pub fn build(&self) -> RateLimitResult<Arc<dyn RateLimiter>> {
        let limiter: Arc<dyn RateLimiter> = match self {
            RateLimiterConfig::TokenBucket(config) => {
                Arc::new(TokenBucketLimiter::new(config.clone())?)
            }
            RateLimiterConfig::SlidingWindow(config) => {
                Arc::new(SlidingWindowLimiter::new(config.clone())?)
            }
        };
        debug!(strategy = %limiter.state().strategy, "Built rate limiter");
        Ok(limiter)
    }
}
