//! Tests for the embedding cache.

use flowgate_cache::{
    EmbeddingCache, EmbeddingCacheConfig, EmbeddingCacheConfigBuilder, EvictionReason,
    SizeEstimate, fingerprint,
};
use flowgate_error::BuilderErrorKind;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Evictions = Arc<Mutex<Vec<(String, EvictionReason)>>>;

fn create_cache(config: EmbeddingCacheConfig) -> (EmbeddingCache<Vec<f32>>, Evictions) {
    let evictions: Evictions = Arc::default();
    let record = evictions.clone();
    let hook = move |key: &str, _: &Vec<f32>, reason: EvictionReason| {
        record.lock().unwrap().push((key.to_string(), reason));
    };
    let cache = EmbeddingCache::new(config)
        .unwrap()
        .with_eviction_hook(Arc::new(hook));
    (cache, evictions)
}

fn keys(cache: &mut EmbeddingCache<Vec<f32>>, candidates: &[&str]) -> Vec<String> {
    candidates
        .iter()
        .filter(|key| cache.has(key))
        .map(|key| key.to_string())
        .collect()
}

#[test]
fn test_capacity_evicts_oldest() {
    let (mut cache, evictions) = create_cache(EmbeddingCacheConfig::default().with_max_entries(2));
    cache.set("a", vec![1.0]);
    cache.set("b", vec![2.0]);
    cache.set("c", vec![3.0]);

    assert_eq!(keys(&mut cache, &["a", "b", "c"]), vec!["b", "c"]);
    assert_eq!(
        *evictions.lock().unwrap(),
        vec![("a".to_string(), EvictionReason::Capacity)]
    );
}

#[test]
fn test_get_refreshes_recency() {
    let (mut cache, _) = create_cache(EmbeddingCacheConfig::default().with_max_entries(2));
    cache.set("a", vec![1.0]);
    cache.set("b", vec![2.0]);
    assert!(cache.get("a").is_some());
    cache.set("c", vec![3.0]);

    assert_eq!(keys(&mut cache, &["a", "b", "c"]), vec!["a", "c"]);
}

#[test]
fn test_has_does_not_refresh_recency() {
    let (mut cache, _) = create_cache(EmbeddingCacheConfig::default().with_max_entries(2));
    cache.set("a", vec![1.0]);
    cache.set("b", vec![2.0]);
    assert!(cache.has("a"));
    cache.set("c", vec![3.0]);

    assert!(!cache.has("a"));
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (0, 0));
}

#[test]
fn test_overwrite_resets_entry_without_hook() {
    let (mut cache, evictions) = create_cache(EmbeddingCacheConfig::default());
    cache.set("a", vec![1.0]);
    cache.set("a", vec![1.0, 2.0]);

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("a"), Some(&vec![1.0, 2.0]));
    assert_eq!(cache.stats().estimated_bytes, 8);
    assert!(evictions.lock().unwrap().is_empty());
}

#[test]
fn test_byte_budget() {
    // Each value is 4 floats = 16 bytes
    let config = EmbeddingCacheConfig::default().with_max_bytes(40);
    let (mut cache, evictions) = create_cache(config);
    cache.set("a", vec![0.0; 4]);
    cache.set("b", vec![0.0; 4]);
    assert_eq!(cache.stats().estimated_bytes, 32);

    cache.set("c", vec![0.0; 4]);
    assert_eq!(keys(&mut cache, &["a", "b", "c"]), vec!["b", "c"]);
    assert_eq!(cache.stats().estimated_bytes, 32);
    assert_eq!(
        *evictions.lock().unwrap(),
        vec![("a".to_string(), EvictionReason::Bytes)]
    );
}

#[test]
fn test_oversized_value_empties_cache() {
    let config = EmbeddingCacheConfig::default().with_max_bytes(8);
    let (mut cache, _) = create_cache(config);
    cache.set("a", vec![0.0; 1]);
    cache.set("huge", vec![0.0; 16]);

    assert!(cache.is_empty());
    assert_eq!(cache.stats().estimated_bytes, 0);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_expiry_is_lazy() {
    let config = EmbeddingCacheConfig::default().with_ttl_ms(1000);
    let (mut cache, evictions) = create_cache(config);
    cache.set("a", vec![1.0]);

    tokio::time::advance(Duration::from_millis(1000)).await;
    assert!(cache.has("a"), "not older than the TTL yet");

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(cache.len(), 1, "expired entry keeps its slot until touched");
    assert_eq!(cache.get("a"), None);
    assert!(!cache.has("a"));
    assert_eq!(cache.stats().misses, 1);
    assert_eq!(
        *evictions.lock().unwrap(),
        vec![("a".to_string(), EvictionReason::Expired)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_purge_expired() {
    let config = EmbeddingCacheConfig::default().with_ttl_ms(100);
    let (mut cache, evictions) = create_cache(config);
    cache.set("old-1", vec![1.0]);
    cache.set("old-2", vec![1.0]);
    tokio::time::advance(Duration::from_millis(60)).await;
    cache.set("new", vec![1.0]);
    tokio::time::advance(Duration::from_millis(60)).await;

    assert_eq!(cache.purge_expired(), 2);
    assert_eq!(cache.len(), 1);
    assert!(cache.has("new"));
    assert_eq!(evictions.lock().unwrap().len(), 2);
}

#[test]
fn test_remove_and_clear_notify_per_entry() {
    let (mut cache, evictions) = create_cache(EmbeddingCacheConfig::default());
    cache.set("a", vec![1.0]);
    cache.set("b", vec![1.0]);
    cache.set("c", vec![1.0]);

    assert!(cache.remove("b"));
    assert!(!cache.remove("b"));
    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.stats().estimated_bytes, 0);
    assert_eq!(
        *evictions.lock().unwrap(),
        vec![
            ("b".to_string(), EvictionReason::Removed),
            ("a".to_string(), EvictionReason::Cleared),
            ("c".to_string(), EvictionReason::Cleared),
        ]
    );
}

#[test]
fn test_stats() {
    let (mut cache, _) = create_cache(EmbeddingCacheConfig::default());
    assert_eq!(cache.stats().hit_rate, 0.0);

    cache.set("a", vec![1.0, 2.0]);
    cache.get("a");
    cache.get("a");
    cache.get("a");
    cache.get("missing");

    let stats = cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hit_rate, 0.75);
    assert_eq!(stats.estimated_bytes, 8);
    assert_eq!(cache.stats(), stats, "stats must be idempotent");
}

#[test]
fn test_panicking_hook_is_isolated() {
    let hook = |_: &str, _: &String, _: EvictionReason| panic!("observer bug");
    let mut cache = EmbeddingCache::new(EmbeddingCacheConfig::default().with_max_entries(1))
        .unwrap()
        .with_eviction_hook(Arc::new(hook));
    cache.set("a", "first".to_string());
    cache.set("b", "second".to_string());

    assert_eq!(cache.get("b").map(String::as_str), Some("second"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_json_values_use_serialised_size() {
    let mut cache = EmbeddingCache::new(EmbeddingCacheConfig::default()).unwrap();
    let value = serde_json::json!({"model": "embed-small", "dims": 384});
    let expected = value.estimated_bytes();
    cache.set(fingerprint("query"), value);
    assert_eq!(cache.stats().estimated_bytes, expected);
    assert!(cache.has(&fingerprint("query")));
}

#[test]
fn test_config_builder_and_validation() {
    let err = EmbeddingCacheConfigBuilder::default()
        .max_entries(0_usize)
        .build()
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &BuilderErrorKind::InvalidField {
            field: "max_entries".to_string(),
            reason: "must be greater than zero".to_string(),
        }
    );
    let zero = EmbeddingCacheConfig::default().with_max_entries(0);
    assert!(EmbeddingCache::<Vec<f32>>::new(zero).is_err());

    let config: EmbeddingCacheConfig =
        serde_json::from_str(r#"{ "max_bytes": 1048576 }"#).unwrap();
    assert_eq!(*config.max_entries(), 10_000);
    assert_eq!(*config.max_bytes(), Some(1_048_576));
    assert_eq!(*config.ttl_ms(), None);
}

#[test]
fn test_fingerprint_is_stable_hex() {
    let key = fingerprint("hello world");
    assert_eq!(key.len(), 64);
    assert_eq!(key, fingerprint("hello world"));
    assert_ne!(key, fingerprint("hello world!"));
    assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}
