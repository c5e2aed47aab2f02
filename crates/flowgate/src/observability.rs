//! Structured logging setup.
//!
//! Every Flowgate crate logs through `tracing`; this module installs the
//! process-wide subscriber that renders those events as text or JSON lines.

use derive_setters::Setters;
use flowgate_error::{ConfigError, FlowgateResult};
use tracing::info;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const FALLBACK_FILTER: &str = "info";

/// Logging settings for a process embedding Flowgate.
///
/// ```
/// use flowgate::ObservabilityConfig;
///
/// let config = ObservabilityConfig::new("indexer")
///     .with_log_level("flowgate_rate_limit=debug,info")
///     .with_json_logs(true);
/// assert!(config.json_logs);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Setters)]
#[setters(prefix = "with_", into)]
pub struct ObservabilityConfig {
    /// Name reported on the startup event
    pub service_name: String,
    /// `EnvFilter` directive applied when `RUST_LOG` is unset or unparsable
    pub log_level: String,
    /// One JSON object per event instead of text
    pub json_logs: bool,
}

impl ObservabilityConfig {
    /// Settings for `service_name`, taking the level from `RUST_LOG` when set.
    pub fn new(service_name: impl Into<String>) -> Self {
        let log_level =
            std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| FALLBACK_FILTER.to_owned());
        Self {
            service_name: service_name.into(),
            log_level,
            json_logs: false,
        }
    }

    fn filter(&self) -> FlowgateResult<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.log_level).map_err(|e| {
            ConfigError::new(format!("Invalid log filter '{}': {}", self.log_level, e)).into()
        })
    }

    fn format_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = tracing_subscriber::fmt::layer().with_target(true);
        if self.json_logs {
            layer.json().boxed()
        } else {
            layer.boxed()
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

/// Install the global subscriber with [`ObservabilityConfig::default`].
///
/// # Errors
///
/// See [`init_observability_with_config`].
pub fn init_observability() -> FlowgateResult<()> {
    init_observability_with_config(ObservabilityConfig::default())
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if neither `RUST_LOG` nor `config.log_level` is a valid
/// filter, or if another global subscriber is already installed.
pub fn init_observability_with_config(config: ObservabilityConfig) -> FlowgateResult<()> {
    let filter = config.filter()?;

    tracing_subscriber::registry()
        .with(config.format_layer())
        .with(filter)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install subscriber: {}", e)))?;

    info!(
        service = %config.service_name,
        json = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters() {
        let config = ObservabilityConfig::new("embedder")
            .with_log_level("flowgate=debug")
            .with_json_logs(true);
        assert_eq!(config.service_name, "embedder");
        assert_eq!(config.log_level, "flowgate=debug");
        assert!(config.json_logs);
    }

    #[test]
    fn test_default_service_name() {
        assert_eq!(ObservabilityConfig::default().service_name, "flowgate");
    }

    #[test]
    fn test_invalid_filter_is_a_config_error() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        let config = ObservabilityConfig::new("embedder").with_log_level("flowgate=loudest");
        assert!(config.filter().is_err());
    }
}
