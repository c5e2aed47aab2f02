//! Tests for the components working together around a provider call.

use flowgate::{
    EmbeddingCache, ErrorCode, FlowgateConfig, ProviderError, RateLimiter, RateLimiterConfig,
    RateLimiterGuard, RetryConfig, RetryStrategy, TokenBucketConfig, execute, fingerprint,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Provider stub failing with 503 until `failures` calls have been made.
struct FlakyProvider {
    calls: AtomicU32,
    failures: u32,
}

impl FlakyProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(ProviderError::from_http_status(503, "overloaded"));
        }
        Ok(vec![text.len() as f32; 4])
    }
}

fn pipeline_config() -> FlowgateConfig {
    FlowgateConfig {
        rate_limit: RateLimiterConfig::TokenBucket(TokenBucketConfig {
            requests_per_minute: 600,
            max_concurrent: 1,
            burst_size: 1,
            window_ms: 60_000,
        }),
        retry: RetryConfig::default()
            .with_strategy(RetryStrategy::Linear)
            .with_delay_ms(100),
        ..FlowgateConfig::default()
    }
}

async fn embed_cached(
    limiter: &dyn RateLimiter,
    config: &FlowgateConfig,
    cache: &mut EmbeddingCache<Vec<f32>>,
    provider: &FlakyProvider,
    text: &str,
) -> Result<Vec<f32>, ProviderError> {
    let key = fingerprint(text);
    if let Some(vector) = cache.get(&key) {
        return Ok(vector.clone());
    }

    let policy = config.retry_policy().unwrap();
    let vector = {
        let _guard = RateLimiterGuard::acquire(limiter).await;
        execute(policy.as_ref(), || provider.embed(text)).await?
    };
    cache.set(key, vector.clone());
    Ok(vector)
}

#[tokio::test(start_paused = true)]
async fn test_miss_retry_then_hit() {
    let config = pipeline_config();
    let limiter = config.rate_limiter().unwrap();
    let mut cache = config.embedding_cache::<Vec<f32>>().unwrap();
    let provider = FlakyProvider {
        calls: AtomicU32::new(0),
        failures: 2,
    };

    let start = Instant::now();
    let first = embed_cached(limiter.as_ref(), &config, &mut cache, &provider, "hello")
        .await
        .unwrap();
    assert_eq!(first, vec![5.0; 4]);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    assert!(start.elapsed() >= Duration::from_millis(200));

    let second = embed_cached(limiter.as_ref(), &config, &mut cache, &provider, "hello")
        .await
        .unwrap();
    assert_eq!(second, first);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(limiter.state().active_requests, 0);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_release_the_slot() {
    let config = pipeline_config();
    let limiter = config.rate_limiter().unwrap();
    let mut cache = config.embedding_cache::<Vec<f32>>().unwrap();
    let provider = FlakyProvider {
        calls: AtomicU32::new(0),
        failures: u32::MAX,
    };

    let err = embed_cached(limiter.as_ref(), &config, &mut cache, &provider, "hello")
        .await
        .unwrap_err();

    assert_eq!(err.code, Some(ErrorCode::ServiceUnavailable));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    assert_eq!(limiter.state().active_requests, 0);
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shared_limiter_paces_callers() {
    let config = pipeline_config();
    let limiter: Arc<dyn RateLimiter> = config.rate_limiter().unwrap();
    let start = Instant::now();

    let tasks: Vec<_> = (0..3)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                let _guard = RateLimiterGuard::acquire(limiter.as_ref()).await;
                Instant::now()
            })
        })
        .collect();

    let mut admitted = Vec::new();
    for task in tasks {
        admitted.push(task.await.unwrap());
    }

    // 600 rpm with a burst of one: one admission every 100ms.
    assert!(admitted[2].duration_since(start) >= Duration::from_millis(200));
}
