//! Retry eligibility and backoff for calls to external providers.
//!
//! A [`RetryPolicy`] answers two questions after a failed call: should it be
//! tried again, and how long to wait first. Eligibility is decided by the
//! [`flowgate_error::ErrorCode`] the error reports through
//! [`flowgate_error::RetryableError`]:
//!
//! - codes in the configured retryable set are retried
//! - connection failures are always retried
//! - any other code, or an unrecognised error, is not
//!
//! Policies never sleep or run anything themselves; [`execute`] drives an
//! operation under a policy.
//!
//! # Example
//!
//! ```
//! use flowgate_error::{ErrorCode, ProviderError};
//! use flowgate_retry::{RetryConfig, RetryPolicy, RetryStrategy};
//!
//! let policy = RetryConfig::default()
//!     .with_strategy(RetryStrategy::Linear)
//!     .with_delay_ms(250)
//!     .build()
//!     .unwrap();
//!
//! let throttled = ProviderError::new(ErrorCode::RateLimit, "429");
//! assert!(policy.should_retry(&throttled, 1));
//! assert!(!policy.should_retry(&throttled, 3));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod execute;
mod exponential;
mod linear;
mod policy;

pub use config::{RetryConfig, RetryStrategy};
pub use execute::execute;
pub use exponential::ExponentialRetryPolicy;
pub use linear::LinearRetryPolicy;
pub use policy::{RetryHook, RetryPolicy};
