//! Bounded embedding cache implementation.

use crate::{EmbeddingCacheConfig, SizeEstimate};
use flowgate_error::ConfigError;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    /// Evicted to get back under `max_entries`
    Capacity,
    /// Evicted to get back under `max_bytes`
    Bytes,
    /// Older than `ttl_ms` when touched or purged
    Expired,
    /// Removed explicitly with [`EmbeddingCache::remove`]
    Removed,
    /// Dropped by [`EmbeddingCache::clear`]
    Cleared,
}

/// Observer notified with the key, value and reason of every entry that leaves the cache.
pub type EvictionHook<V> = Arc<dyn Fn(&str, &V, EvictionReason) + Send + Sync>;

/// Snapshot of cache counters, computed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries currently stored, including expired ones not yet touched
    pub entries: usize,
    /// Successful lookups
    pub hits: u64,
    /// Failed lookups, including expired entries
    pub misses: u64,
    /// `hits / (hits + misses)`, zero before the first lookup
    pub hit_rate: f64,
    /// Sum of [`SizeEstimate::estimated_bytes`] over stored values
    pub estimated_bytes: usize,
}

struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    last_access: Instant,
    hit_count: u64,
    bytes: usize,
    /// Position in the recency index
    tick: u64,
}

/// Bounded key/value cache with LRU, TTL and byte-budget eviction.
///
/// Every [`EmbeddingCache::set`] is followed by an eviction pass: the least
/// recently used entry is evicted until the cache holds at most
/// `max_entries`, then, if `max_bytes` is set, until the estimated byte total
/// fits the budget. Expired entries are removed lazily when a
/// [`EmbeddingCache::get`], [`EmbeddingCache::has`] or
/// [`EmbeddingCache::remove`] touches them, or by an explicit
/// [`EmbeddingCache::purge_expired`]. Until then they keep their slot.
///
/// All operations take `&mut self`; share a cache between tasks behind a
/// single lock.
///
/// # Example
///
/// ```
/// use flowgate_cache::{EmbeddingCache, EmbeddingCacheConfig, fingerprint};
///
/// let mut cache = EmbeddingCache::new(EmbeddingCacheConfig::default().with_max_entries(2)).unwrap();
///
/// cache.set(fingerprint("a"), vec![0.1_f32, 0.2]);
/// cache.set(fingerprint("b"), vec![0.3_f32, 0.4]);
/// cache.set(fingerprint("c"), vec![0.5_f32, 0.6]);
///
/// assert!(!cache.has(&fingerprint("a")));
/// assert_eq!(cache.get(&fingerprint("c")), Some(&vec![0.5_f32, 0.6]));
/// ```
pub struct EmbeddingCache<V> {
    config: EmbeddingCacheConfig,
    ttl: Option<Duration>,
    entries: HashMap<String, CacheEntry<V>>,
    /// Recency tick to key, oldest first
    recency: BTreeMap<u64, String>,
    tick: u64,
    total_bytes: usize,
    hits: u64,
    misses: u64,
    on_evict: Option<EvictionHook<V>>,
}

impl<V: SizeEstimate> EmbeddingCache<V> {
    /// Create an empty cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: EmbeddingCacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            max_entries = config.max_entries(),
            max_bytes = ?config.max_bytes(),
            ttl_ms = ?config.ttl_ms(),
            "Creating new EmbeddingCache"
        );
        Ok(Self {
            ttl: config.ttl_ms().map(Duration::from_millis),
            config,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
            total_bytes: 0,
            hits: 0,
            misses: 0,
            on_evict: None,
        })
    }

    /// Attach an eviction observer. Panics inside the hook are caught and logged.
    pub fn with_eviction_hook(mut self, hook: EvictionHook<V>) -> Self {
        self.on_evict = Some(hook);
        self
    }

    /// Configuration this cache was built with.
    pub fn config(&self) -> &EmbeddingCacheConfig {
        &self.config
    }

    /// Look up `key`, refreshing its recency on a hit.
    ///
    /// Missing and expired entries count as misses; an expired entry is
    /// removed on the way out.
    #[instrument(skip(self), fields(cache_size = self.entries.len()))]
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let now = Instant::now();
        self.expire_if_stale(key, now);
        let tick = self.next_tick();

        let Some(entry) = self.entries.get_mut(key) else {
            self.misses += 1;
            debug!("Cache miss");
            return None;
        };

        self.hits += 1;
        self.recency.remove(&entry.tick);
        self.recency.insert(tick, key.to_string());
        entry.tick = tick;
        entry.last_access = now;
        entry.hit_count += 1;
        debug!(
            hit_count = entry.hit_count,
            age_ms = now.saturating_duration_since(entry.created_at).as_millis() as u64,
            "Cache hit"
        );
        Some(&entry.value)
    }

    /// Insert or overwrite `key`, then evict down to the configured bounds.
    ///
    /// Overwriting replaces the old value without notifying the eviction hook.
    #[instrument(skip_all, fields(cache_size = self.entries.len()))]
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if self.detach(&key).is_some() {
            debug!("Overwriting cached entry");
        }

        let now = Instant::now();
        let tick = self.next_tick();
        let bytes = value.estimated_bytes();
        self.total_bytes += bytes;
        self.recency.insert(tick, key.clone());
        self.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
                last_access: now,
                hit_count: 0,
                bytes,
                tick,
            },
        );
        debug!(bytes, total_bytes = self.total_bytes, "Inserted entry into cache");

        self.evict();
    }

    /// Whether `key` is present and fresh. Leaves recency and counters alone.
    pub fn has(&mut self, key: &str) -> bool {
        self.expire_if_stale(key, Instant::now());
        self.entries.contains_key(key)
    }

    /// Remove `key`, returning whether a fresh entry was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.expire_if_stale(key, Instant::now()) {
            return false;
        }
        match self.detach(key) {
            Some(entry) => {
                self.notify(key, &entry.value, EvictionReason::Removed);
                true
            }
            None => false,
        }
    }

    /// Remove every entry, notifying the hook once per entry in LRU order.
    ///
    /// Hit and miss counters are kept.
    pub fn clear(&mut self) {
        let recency = std::mem::take(&mut self.recency);
        let mut entries = std::mem::take(&mut self.entries);
        self.total_bytes = 0;

        let count = entries.len();
        for key in recency.into_values() {
            if let Some(entry) = entries.remove(&key) {
                self.notify(&key, &entry.value, EvictionReason::Cleared);
            }
        }
        info!(cleared = count, "Cleared cache");
    }

    /// Remove every expired entry now. Returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let now = Instant::now();
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.created_at) > ttl)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            if let Some(entry) = self.detach(key) {
                self.notify(key, &entry.value, EvictionReason::Expired);
            }
        }
        if !stale.is_empty() {
            info!(
                removed = stale.len(),
                remaining = self.entries.len(),
                "Purged expired cache entries"
            );
        }
        stale.len()
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
            estimated_bytes: self.total_bytes,
        }
    }

    /// Number of stored entries, including expired ones not yet touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Unlink an entry from the map, the recency index and the byte total.
    fn detach(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.tick);
        self.total_bytes = self.total_bytes.saturating_sub(entry.bytes);
        Some(entry)
    }

    /// Drop `key` if it has outlived the TTL. Returns whether it was dropped.
    fn expire_if_stale(&mut self, key: &str, now: Instant) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| now.saturating_duration_since(entry.created_at) > ttl);
        if expired && let Some(entry) = self.detach(key) {
            debug!("Cache entry expired, removing");
            self.notify(key, &entry.value, EvictionReason::Expired);
        }
        expired
    }

    fn evict(&mut self) {
        let max_entries = *self.config.max_entries();
        while self.entries.len() > max_entries {
            if !self.evict_lru(EvictionReason::Capacity) {
                break;
            }
        }

        if let Some(max_bytes) = *self.config.max_bytes() {
            while self.total_bytes > max_bytes && !self.entries.is_empty() {
                if !self.evict_lru(EvictionReason::Bytes) {
                    break;
                }
            }
        }
    }

    fn evict_lru(&mut self, reason: EvictionReason) -> bool {
        let Some((_, key)) = self.recency.pop_first() else {
            return false;
        };
        if let Some(entry) = self.entries.remove(&key) {
            self.total_bytes = self.total_bytes.saturating_sub(entry.bytes);
            debug!(
                key = %key,
                ?reason,
                idle_ms = Instant::now().saturating_duration_since(entry.last_access).as_millis() as u64,
                "Evicting LRU entry"
            );
            self.notify(&key, &entry.value, reason);
        }
        true
    }

    fn notify(&self, key: &str, value: &V, reason: EvictionReason) {
        let Some(hook) = &self.on_evict else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| hook(key, value, reason))).is_err() {
            warn!(key, ?reason, "Eviction hook panicked");
        }
    }
}
