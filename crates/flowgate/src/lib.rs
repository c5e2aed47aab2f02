//! Flow control and resilience for calls to external model and storage providers.
//!
//! Flowgate bundles four independent components behind one configuration file:
//!
//! - [`RateLimiter`]: FIFO admission control, by token bucket or sliding window
//! - [`RetryPolicy`]: classification of failures and backoff between attempts
//! - [`EmbeddingCache`]: bounded LRU cache with optional TTL and byte budget
//! - [`ToolCallBridge`]: tool execution with deadlines and lifecycle hooks
//!
//! # Example
//!
//! ```no_run
//! use flowgate::{
//!     FlowgateConfig, ProviderError, RateLimiterGuard, execute, fingerprint, init_observability,
//! };
//!
//! # async fn embed(text: &str) -> Result<Vec<f32>, ProviderError> { Ok(vec![]) }
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! init_observability()?;
//!
//! let config = FlowgateConfig::load()?;
//! let limiter = config.rate_limiter()?;
//! let retry = config.retry_policy()?;
//! let mut cache = config.embedding_cache::<Vec<f32>>()?;
//!
//! let text = "hello world";
//! let key = fingerprint(text);
//! if cache.get(&key).is_none() {
//!     let _guard = RateLimiterGuard::acquire(limiter.as_ref()).await;
//!     let vector = execute(retry.as_ref(), || embed(text)).await?;
//!     cache.set(&key, vector);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod observability;

pub use config::FlowgateConfig;
pub use observability::{ObservabilityConfig, init_observability, init_observability_with_config};

pub use flowgate_error::{
    BuilderError, BuilderErrorKind, ConfigError, ErrorCode, FlowgateError, FlowgateErrorKind,
    FlowgateResult, ProviderError, RetryableError, ToolError, ToolErrorKind,
};

pub use flowgate_rate_limit::{
    RateLimitError, RateLimitErrorKind, RateLimitStrategy, RateLimiter, RateLimiterConfig,
    RateLimiterGuard, RateLimiterState, SlidingWindowConfig, SlidingWindowLimiter,
    TokenBucketConfig, TokenBucketLimiter,
};

pub use flowgate_retry::{
    ExponentialRetryPolicy, LinearRetryPolicy, RetryConfig, RetryHook, RetryPolicy, RetryStrategy,
    execute,
};

pub use flowgate_cache::{
    CacheStats, EmbeddingCache, EmbeddingCacheConfig, EmbeddingCacheConfigBuilder, EvictionHook,
    EvictionReason, SizeEstimate, fingerprint,
};

pub use flowgate_tools::{
    AfterHook, BeforeHook, ErrorHook, InMemoryToolRegistry, Tool, ToolBridgeConfig,
    ToolCall, ToolCallBridge, ToolCallStatus, ToolRegistry, ToolResult,
};
