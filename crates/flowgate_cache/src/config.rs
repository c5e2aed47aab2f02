//! Embedding cache configuration.

use derive_getters::Getters;
use flowgate_error::{BuilderError, ConfigError};
use serde::{Deserialize, Serialize};

fn default_max_entries() -> usize {
    10_000
}

/// Configuration for [`crate::EmbeddingCache`].
///
/// ```
/// use flowgate_cache::EmbeddingCacheConfigBuilder;
///
/// let config = EmbeddingCacheConfigBuilder::default()
///     .max_entries(500_usize)
///     .ttl_ms(60_000_u64)
///     .build()
///     .unwrap();
/// assert_eq!(*config.max_entries(), 500);
/// assert_eq!(*config.max_bytes(), None);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default, build_fn(private, name = "build_internal"))]
pub struct EmbeddingCacheConfig {
    /// Maximum number of entries (default 10000)
    #[serde(default = "default_max_entries")]
    #[builder(setter(into))]
    max_entries: usize,

    /// Byte budget over all values, unbounded when unset
    #[serde(default)]
    #[setters(strip_option)]
    #[builder(setter(into, strip_option))]
    max_bytes: Option<usize>,

    /// Entry lifetime in milliseconds, unbounded when unset
    #[serde(default)]
    #[setters(strip_option)]
    #[builder(setter(into, strip_option))]
    ttl_ms: Option<u64>,
}

impl Default for EmbeddingCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_bytes: None,
            ttl_ms: None,
        }
    }
}

impl EmbeddingCacheConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_entries` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(ConfigError::invalid_field(
                "max_entries",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl EmbeddingCacheConfigBuilder {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_entries` is zero.
    pub fn build(&self) -> Result<EmbeddingCacheConfig, BuilderError> {
        let config = self
            .build_internal()
            .map_err(|e| BuilderError::from(e.to_string()))?;
        if config.max_entries == 0 {
            return Err(BuilderError::invalid_field(
                "max_entries",
                "must be greater than zero",
            ));
        }
        Ok(config)
    }
}
