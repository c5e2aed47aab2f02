//! Tool bridge configuration.

use flowgate_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_timeout_ms() -> u64 {
    30_000
}

/// Configuration for [`crate::ToolCallBridge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ToolBridgeConfig {
    /// Per-call deadline in milliseconds, measured from call start (default 30000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ToolBridgeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ToolBridgeConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid_field(
                "timeout_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
