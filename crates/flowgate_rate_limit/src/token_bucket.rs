//! Token bucket limiter with a concurrency cap.

use crate::gate::{Admission, Gate, MIN_WAIT};
use crate::{RateLimitResult, RateLimitStrategy, RateLimiter, RateLimiterState, TokenBucketConfig};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

const NANOS_PER_MINUTE: f64 = 60_000_000_000.0;

/// Token bucket state.
#[derive(Debug)]
struct TokenBucket {
    requests_per_minute: u32,
    max_concurrent: u32,
    burst_size: u32,
    window: Duration,
    /// Available tokens, always within `[0, burst_size]`
    tokens: f64,
    last_refill: Instant,
    active_requests: u32,
    requests_in_window: u32,
    window_started: Instant,
}

impl TokenBucket {
    fn new(config: &TokenBucketConfig, now: Instant) -> Self {
        Self {
            requests_per_minute: config.requests_per_minute,
            max_concurrent: config.max_concurrent,
            burst_size: config.burst_size,
            window: Duration::from_millis(config.window_ms),
            tokens: f64::from(config.burst_size),
            last_refill: now,
            active_requests: 0,
            requests_in_window: 0,
            window_started: now,
        }
    }
}

impl Admission for TokenBucket {
    fn refresh(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        let refill =
            elapsed.as_nanos() as f64 * f64::from(self.requests_per_minute) / NANOS_PER_MINUTE;
        self.tokens = (self.tokens + refill).min(f64::from(self.burst_size));
        self.last_refill = now;

        if now.saturating_duration_since(self.window_started) >= self.window {
            self.requests_in_window = 0;
            self.window_started = now;
        }
    }

    fn can_admit(&self) -> bool {
        self.tokens >= 1.0 && self.active_requests < self.max_concurrent
    }

    fn admit(&mut self, _now: Instant) {
        self.tokens -= 1.0;
        self.active_requests += 1;
        self.requests_in_window += 1;
    }

    fn revoke(&mut self) {
        self.tokens = (self.tokens + 1.0).min(f64::from(self.burst_size));
        self.active_requests = self.active_requests.saturating_sub(1);
        self.requests_in_window = self.requests_in_window.saturating_sub(1);
    }

    fn release(&mut self) {
        self.active_requests = self.active_requests.saturating_sub(1);
    }

    fn next_opening(&self, _now: Instant) -> Option<Duration> {
        if self.active_requests >= self.max_concurrent {
            return None;
        }
        let missing = (1.0 - self.tokens).max(0.0);
        let nanos = (missing * NANOS_PER_MINUTE / f64::from(self.requests_per_minute)).ceil();
        Some(Duration::from_nanos(nanos as u64).max(MIN_WAIT))
    }

    fn set_limit(&mut self, requests_per_minute: u32) {
        self.requests_per_minute = requests_per_minute;
    }

    fn snapshot(&self, now: Instant, waiting: usize) -> RateLimiterState {
        let window_elapsed = now.saturating_duration_since(self.window_started);
        RateLimiterState {
            strategy: RateLimitStrategy::TokenBucket,
            active_requests: self.active_requests,
            max_concurrent: Some(self.max_concurrent),
            requests_in_window: self.requests_in_window,
            requests_per_minute: self.requests_per_minute,
            window_reset_in: self.window.saturating_sub(window_elapsed),
            waiting,
        }
    }
}

/// Token bucket limiter.
///
/// The bucket starts full, so up to `burst_size` requests are admitted at
/// once; afterwards admissions are paced at `requests_per_minute`. A request
/// additionally needs one of `max_concurrent` slots, returned by
/// [`RateLimiter::release`].
///
/// # Example
///
/// ```
/// use flowgate_rate_limit::{RateLimiter, TokenBucketConfig, TokenBucketLimiter};
///
/// let limiter = TokenBucketLimiter::new(TokenBucketConfig {
///     requests_per_minute: 60,
///     max_concurrent: 2,
///     burst_size: 5,
///     window_ms: 60_000,
/// })
/// .unwrap();
///
/// assert!(limiter.try_acquire());
/// assert!(limiter.try_acquire());
/// assert!(!limiter.try_acquire()); // concurrency cap reached
/// limiter.release();
/// assert!(limiter.try_acquire());
/// ```
pub struct TokenBucketLimiter {
    gate: Gate<TokenBucket>,
}

impl TokenBucketLimiter {
    /// Create a token bucket limiter.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured limit is zero.
    pub fn new(config: TokenBucketConfig) -> RateLimitResult<Self> {
        config.validate()?;
        info!(
            requests_per_minute = config.requests_per_minute,
            max_concurrent = config.max_concurrent,
            burst_size = config.burst_size,
            "Creating token bucket rate limiter"
        );
        Ok(Self {
            gate: Gate::new(TokenBucket::new(&config, Instant::now())),
        })
    }
}

#[async_trait]
impl RateLimiter for TokenBucketLimiter {
    async fn acquire(&self) {
        self.gate.acquire().await;
    }

    fn try_acquire(&self) -> bool {
        self.gate.try_acquire()
    }

    fn release(&self) {
        self.gate.release();
    }

    fn state(&self) -> RateLimiterState {
        self.gate.state()
    }

    fn set_limit(&self, requests_per_minute: u32) {
        self.gate.set_limit(requests_per_minute);
    }
}
