//! Admission control for calls to external model and storage providers.
//!
//! Two limiters implement the [`RateLimiter`] trait:
//! - [`TokenBucketLimiter`] - continuous refill up to a burst capacity, plus a
//!   concurrency cap
//! - [`SlidingWindowLimiter`] - at most N requests in any trailing window
//!
//! Callers that cannot be admitted are queued and granted strictly in arrival
//! order. Queued callers are woken by releases, limit changes, or a timer set
//! for the moment capacity next opens; there is no fixed-interval polling.
//!
//! Use [`RateLimiterGuard`] to tie a slot to a scope:
//!
//! ```rust,ignore
//! use flowgate_rate_limit::{RateLimiterConfig, RateLimiterGuard};
//!
//! let limiter = RateLimiterConfig::default().build()?;
//! let _guard = RateLimiterGuard::acquire(limiter.as_ref()).await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod gate;
mod limiter;
mod sliding_window;
mod token_bucket;

pub use config::{RateLimiterConfig, SlidingWindowConfig, TokenBucketConfig};
pub use error::{RateLimitError, RateLimitErrorKind, RateLimitResult};
pub use limiter::{RateLimitStrategy, RateLimiter, RateLimiterGuard, RateLimiterState};
pub use sliding_window::SlidingWindowLimiter;
pub use token_bucket::TokenBucketLimiter;
