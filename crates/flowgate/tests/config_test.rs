//! Tests for layered Flowgate configuration.

use flowgate::{
    FlowgateConfig, RateLimitStrategy, RateLimiter, RateLimiterConfig, RetryPolicy, RetryStrategy,
    SlidingWindowConfig,
};
use std::path::Path;

fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("flowgate.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_bundled_defaults_match_default() {
    let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join("flowgate.toml");
    let config = FlowgateConfig::from_file(bundled).unwrap();
    assert_eq!(config, FlowgateConfig::default());
}

#[test]
fn test_partial_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[rate_limit]
strategy = "sliding_window"
requests_per_minute = 30
window_ms = 1000

[retry]
strategy = "linear"
delay_ms = 250
"#,
    );

    let config = FlowgateConfig::from_file(&path).unwrap();

    assert_eq!(
        config.rate_limit,
        RateLimiterConfig::SlidingWindow(SlidingWindowConfig {
            requests_per_minute: 30,
            window_ms: 1000,
        })
    );
    assert_eq!(config.retry.strategy, RetryStrategy::Linear);
    assert_eq!(config.retry.delay_ms, 250);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(*config.cache.max_entries(), 10_000);
    assert_eq!(config.tools.timeout_ms, 30_000);
}

#[test]
fn test_cache_bounds_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[cache]
max_entries = 500
max_bytes = 1048576
ttl_ms = 60000
"#,
    );

    let config = FlowgateConfig::from_file(&path).unwrap();
    assert_eq!(*config.cache.max_entries(), 500);
    assert_eq!(*config.cache.max_bytes(), Some(1_048_576));
    assert_eq!(*config.cache.ttl_ms(), Some(60_000));
}

#[test]
fn test_invalid_section_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[cache]\nmax_entries = 0\n");

    let err = FlowgateConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("max_entries"));
}

#[test]
fn test_zero_rate_limit_names_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "[rate_limit]\nstrategy = \"token_bucket\"\nburst_size = 0\n",
    );

    let err = FlowgateConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("burst_size"));
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[rate_limit]\nstrategy = \"leaky_bucket\"\n");

    assert!(FlowgateConfig::from_file(&path).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FlowgateConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_builds_components() {
    let config = FlowgateConfig::default();

    let limiter = config.rate_limiter().unwrap();
    assert_eq!(limiter.state().strategy, RateLimitStrategy::TokenBucket);
    assert_eq!(limiter.state().max_concurrent, Some(10));

    let retry = config.retry_policy().unwrap();
    assert_eq!(retry.max_attempts(), 3);

    let cache = config.embedding_cache::<Vec<f32>>().unwrap();
    assert!(cache.is_empty());
}
