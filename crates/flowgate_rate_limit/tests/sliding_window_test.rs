//! Tests for the sliding window limiter.

use flowgate_rate_limit::{
    RateLimitStrategy, RateLimiter, SlidingWindowConfig, SlidingWindowLimiter,
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn create_limiter(limit: u32, window_ms: u64) -> SlidingWindowLimiter {
    SlidingWindowLimiter::new(SlidingWindowConfig {
        requests_per_minute: limit,
        window_ms,
    })
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_waits_for_oldest_to_age_out() {
    let limiter = create_limiter(2, 1000);
    let start = Instant::now();

    limiter.acquire().await;
    limiter.acquire().await;
    assert_eq!(start.elapsed(), Duration::ZERO);

    limiter.acquire().await;
    assert!(start.elapsed() >= Duration::from_millis(1000));
    assert_eq!(limiter.state().requests_in_window, 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_window() {
    let limiter = create_limiter(3, 1000);
    let start = Instant::now();

    join_all((0..5).map(|_| limiter.acquire())).await;

    assert!(start.elapsed() >= Duration::from_millis(1000));
    let state = limiter.state();
    assert_eq!(state.active_requests, 5);
    assert_eq!(state.requests_in_window, 2);
}

#[tokio::test(start_paused = true)]
async fn test_release_keeps_timestamps() {
    let limiter = create_limiter(2, 1000);
    limiter.acquire().await;
    limiter.acquire().await;
    limiter.release();
    limiter.release();

    let state = limiter.state();
    assert_eq!(state.active_requests, 0);
    assert_eq!(state.requests_in_window, 2);
    assert!(!limiter.try_acquire(), "release must not free window capacity");
}

#[tokio::test(start_paused = true)]
async fn test_window_reset_tracks_oldest_request() {
    let limiter = create_limiter(5, 1000);
    assert_eq!(limiter.state().window_reset_in, Duration::ZERO);

    limiter.acquire().await;
    tokio::time::advance(Duration::from_millis(300)).await;
    limiter.acquire().await;

    let state = limiter.state();
    assert_eq!(state.strategy, RateLimitStrategy::SlidingWindow);
    assert_eq!(state.max_concurrent, None);
    assert_eq!(state.window_reset_in, Duration::from_millis(700));
}

#[tokio::test(start_paused = true)]
async fn test_raising_limit_wakes_waiter() {
    let limiter = Arc::new(create_limiter(1, 60_000));
    limiter.acquire().await;
    let start = Instant::now();

    let waiter = {
        let limiter = limiter.clone();
        tokio::spawn(async move { limiter.acquire().await })
    };
    while limiter.state().waiting < 1 {
        tokio::task::yield_now().await;
    }

    limiter.set_limit(2);
    waiter.await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(1));
    assert_eq!(limiter.state().requests_in_window, 2);
}

#[tokio::test(start_paused = true)]
async fn test_lowering_limit_applies_to_next_admission() {
    let limiter = create_limiter(3, 1000);
    limiter.acquire().await;
    limiter.acquire().await;

    limiter.set_limit(2);
    assert!(!limiter.try_acquire());
    assert_eq!(limiter.state().requests_per_minute, 2);
}
