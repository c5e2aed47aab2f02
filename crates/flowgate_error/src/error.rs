//! Top-level error wrapper types.

use crate::{BuilderError, ConfigError, ProviderError, ToolError};

/// Foundation error enum covering every failure the workspace surfaces.
///
/// # Examples
///
/// ```
/// use flowgate_error::{ConfigError, FlowgateError};
///
/// let err: FlowgateError = ConfigError::new("bad window").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FlowgateErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Provider call error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Tool execution error
    #[from(ToolError)]
    Tool(ToolError),
}

/// Flowgate error with kind discrimination.
///
/// # Examples
///
/// ```
/// use flowgate_error::{ConfigError, FlowgateResult};
///
/// fn might_fail() -> FlowgateResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Flowgate Error: {}", _0)]
pub struct FlowgateError(Box<FlowgateErrorKind>);

impl FlowgateError {
    /// Create a new error from a kind.
    pub fn new(kind: FlowgateErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FlowgateErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to FlowgateErrorKind
impl<T> From<T> for FlowgateError
where
    T: Into<FlowgateErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Flowgate operations.
pub type FlowgateResult<T> = std::result::Result<T, FlowgateError>;
