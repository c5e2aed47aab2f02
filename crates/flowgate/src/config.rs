//! Layered TOML configuration for every Flowgate component.
//!
//! Configuration sources, later ones overriding earlier ones key by key:
//! 1. Bundled defaults (`flowgate.toml` shipped with this crate)
//! 2. `~/.config/flowgate/flowgate.toml`
//! 3. `./flowgate.toml`
//!
//! User files are optional and silently skipped when absent.

use config::{Config, File, FileFormat};
use flowgate_cache::{EmbeddingCache, EmbeddingCacheConfig, SizeEstimate};
use flowgate_error::{ConfigError, FlowgateError, FlowgateResult};
use flowgate_rate_limit::{RateLimiter, RateLimiterConfig};
use flowgate_retry::{RetryConfig, RetryPolicy};
use flowgate_tools::{ToolBridgeConfig, ToolCallBridge, ToolRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../flowgate.toml");

/// Top-level Flowgate configuration.
///
/// # Example
///
/// ```no_run
/// use flowgate::FlowgateConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FlowgateConfig::load()?;
/// let limiter = config.rate_limiter()?;
/// let retry = config.retry_policy()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowgateConfig {
    /// Admission control for provider calls
    #[serde(default)]
    pub rate_limit: RateLimiterConfig,

    /// Retry eligibility and backoff
    #[serde(default)]
    pub retry: RetryConfig,

    /// Embedding cache bounds
    #[serde(default)]
    pub cache: EmbeddingCacheConfig,

    /// Tool call bridge
    #[serde(default)]
    pub tools: ToolBridgeConfig,
}

impl FlowgateConfig {
    /// Load configuration from a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> FlowgateResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                FlowgateError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                FlowgateError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or the merged
    /// configuration fails validation.
    #[instrument]
    pub fn load() -> FlowgateResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/flowgate/flowgate.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("flowgate").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                FlowgateError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                FlowgateError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> FlowgateResult<()> {
        self.rate_limit.validate().map_err(ConfigError::from)?;
        self.retry.validate()?;
        self.cache.validate()?;
        self.tools.validate()?;
        Ok(())
    }

    /// Build the configured rate limiter.
    ///
    /// # Errors
    ///
    /// Returns an error if the `[rate_limit]` section is invalid.
    pub fn rate_limiter(&self) -> FlowgateResult<Arc<dyn RateLimiter>> {
        Ok(self.rate_limit.build().map_err(ConfigError::from)?)
    }

    /// Build the configured retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the `[retry]` section is invalid.
    pub fn retry_policy(&self) -> FlowgateResult<Arc<dyn RetryPolicy>> {
        Ok(self.retry.build()?)
    }

    /// Build an empty cache with the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the `[cache]` section is invalid.
    pub fn embedding_cache<V: SizeEstimate>(&self) -> FlowgateResult<EmbeddingCache<V>> {
        Ok(EmbeddingCache::new(self.cache.clone())?)
    }

    /// Build a tool bridge over `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the `[tools]` section is invalid.
    pub fn tool_bridge(&self, registry: Arc<dyn ToolRegistry>) -> FlowgateResult<ToolCallBridge> {
        Ok(ToolCallBridge::new(registry, self.tools.clone())?)
    }
}
