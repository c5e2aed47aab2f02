//! Sliding window limiter.

use crate::gate::{Admission, Gate};
use crate::{
    RateLimitResult, RateLimitStrategy, RateLimiter, RateLimiterState, SlidingWindowConfig,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// Ascending request timestamps within the trailing window.
#[derive(Debug)]
struct SlidingWindow {
    limit: u32,
    window: Duration,
    timestamps: VecDeque<Instant>,
    active_requests: u32,
}

impl Admission for SlidingWindow {
    fn refresh(&mut self, now: Instant) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn can_admit(&self) -> bool {
        self.timestamps.len() < self.limit as usize
    }

    fn admit(&mut self, now: Instant) {
        self.timestamps.push_back(now);
        self.active_requests += 1;
    }

    fn revoke(&mut self) {
        self.timestamps.pop_back();
        self.active_requests = self.active_requests.saturating_sub(1);
    }

    // Timestamps stay put; they age out of the window on their own.
    fn release(&mut self) {
        self.active_requests = self.active_requests.saturating_sub(1);
    }

    fn next_opening(&self, now: Instant) -> Option<Duration> {
        self.timestamps
            .front()
            .map(|&oldest| (oldest + self.window).saturating_duration_since(now))
    }

    fn set_limit(&mut self, requests_per_minute: u32) {
        self.limit = requests_per_minute;
    }

    fn snapshot(&self, now: Instant, waiting: usize) -> RateLimiterState {
        RateLimiterState {
            strategy: RateLimitStrategy::SlidingWindow,
            active_requests: self.active_requests,
            max_concurrent: None,
            requests_in_window: self.timestamps.len() as u32,
            requests_per_minute: self.limit,
            window_reset_in: self.next_opening(now).unwrap_or(Duration::ZERO),
            waiting,
        }
    }
}

/// Sliding window limiter.
///
/// Admits at most `requests_per_minute` requests in any trailing `window_ms`
/// interval. Concurrency is unbounded; [`RateLimiter::release`] only lowers
/// the active count.
pub struct SlidingWindowLimiter {
    gate: Gate<SlidingWindow>,
}

impl SlidingWindowLimiter {
    /// Create a sliding window limiter.
    ///
    /// # Errors
    ///
    /// Returns an error if the limit or window is zero.
    pub fn new(config: SlidingWindowConfig) -> RateLimitResult<Self> {
        config.validate()?;
        info!(
            requests_per_minute = config.requests_per_minute,
            window_ms = config.window_ms,
            "Creating sliding window rate limiter"
        );
        Ok(Self {
            gate: Gate::new(SlidingWindow {
                limit: config.requests_per_minute,
                window: Duration::from_millis(config.window_ms),
                timestamps: VecDeque::new(),
                active_requests: 0,
            }),
        })
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
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
