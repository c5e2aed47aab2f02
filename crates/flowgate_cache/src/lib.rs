//! Bounded cache for embedding vectors and other provider results.
//!
//! Entries are keyed by a content [`fingerprint`] and bounded three ways:
//! an entry count, an optional byte budget measured with [`SizeEstimate`],
//! and an optional time-to-live that is enforced lazily.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod fingerprint;
mod size;

pub use cache::{CacheStats, EmbeddingCache, EvictionHook, EvictionReason};
pub use config::{EmbeddingCacheConfig, EmbeddingCacheConfigBuilder};
pub use fingerprint::fingerprint;
pub use size::SizeEstimate;
