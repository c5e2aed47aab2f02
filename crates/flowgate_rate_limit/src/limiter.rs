//! Rate limiter trait, observable state and RAII guard.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Admission algorithm backing a limiter.
#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum RateLimitStrategy {
    /// Continuous refill up to a burst capacity, plus a concurrency cap
    TokenBucket,
    /// Count of requests in a trailing time window
    SlidingWindow,
}

/// Point-in-time view of a limiter, computed fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterState {
    /// Algorithm producing this state
    pub strategy: RateLimitStrategy,
    /// Requests admitted and not yet released
    pub active_requests: u32,
    /// Concurrency cap, `None` when unbounded
    pub max_concurrent: Option<u32>,
    /// Requests admitted in the current window
    pub requests_in_window: u32,
    /// Configured request rate
    pub requests_per_minute: u32,
    /// Time until the window counter resets or the oldest request ages out
    pub window_reset_in: Duration,
    /// Callers currently queued for admission
    pub waiting: usize,
}

/// Admission control for calls to an external provider.
///
/// Admission and release never fail. A caller that cannot be admitted
/// immediately is queued and granted strictly in arrival order.
///
/// # Example
///
/// ```rust,ignore
/// use flowgate_rate_limit::{RateLimiter, RateLimiterGuard};
///
/// let _guard = RateLimiterGuard::acquire(limiter.as_ref()).await;
/// let response = provider.embed(&text).await;
/// // Slot released when `_guard` drops, on success and failure alike.
/// ```
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until the request is admitted.
    async fn acquire(&self);

    /// Admit the request only if that is possible without waiting.
    ///
    /// Never overtakes callers already queued in [`RateLimiter::acquire`].
    fn try_acquire(&self) -> bool;

    /// Return a slot taken by a previous admission and re-evaluate the queue.
    fn release(&self);

    /// Current state of the limiter.
    fn state(&self) -> RateLimiterState;

    /// Change the request rate. Zero is ignored.
    fn set_limit(&self, requests_per_minute: u32);
}

/// RAII guard for a limiter admission.
///
/// Releases the slot when dropped, so every exit path of the guarded
/// operation (success, error, timeout, panic) returns it.
pub struct RateLimiterGuard<'a, L: RateLimiter + ?Sized> {
    limiter: &'a L,
}

impl<'a, L: RateLimiter + ?Sized> RateLimiterGuard<'a, L> {
    /// Wait for admission and return a guard holding the slot.
    pub async fn acquire(limiter: &'a L) -> Self {
        limiter.acquire().await;
        Self { limiter }
    }

    /// Admit without waiting, or `None` if the limiter is saturated.
    pub fn try_acquire(limiter: &'a L) -> Option<Self> {
        limiter.try_acquire().then_some(Self { limiter })
    }
}

impl<L: RateLimiter + ?Sized> Drop for RateLimiterGuard<'_, L> {
    fn drop(&mut self) {
        self.limiter.release();
    }
}
