//! Tool execution error types.

use crate::{ErrorCode, RetryableError};

/// Specific tool execution failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ToolErrorKind {
    /// No tool with this name is registered
    #[display("Tool not found: {}", _0)]
    NotFound(String),

    /// Tool did not finish before the deadline
    #[display("Tool '{}' timed out after {}ms", name, timeout_ms)]
    Timeout {
        /// Name of the tool that timed out
        name: String,
        /// Deadline that elapsed, in milliseconds
        timeout_ms: u64,
    },

    /// Underlying tool reported a failure
    #[display("Tool execution failed: {}", _0)]
    ExecutionFailure(String),

    /// Failure that could not be attributed to a known cause
    #[display("Unclassified tool failure: {}", _0)]
    Unclassified(String),
}

/// Tool execution error with location tracking.
///
/// # Examples
///
/// ```
/// use flowgate_error::{ToolError, ToolErrorKind};
///
/// let err = ToolError::new(ToolErrorKind::NotFound("search".to_string()));
/// assert_eq!(err.kind.to_string(), "Tool not found: search");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Tool Error: {} at line {} in {}", kind, line, file)]
pub struct ToolError {
    /// The kind of error that occurred
    pub kind: ToolErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ToolError {
    /// Create a new ToolError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ToolErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an execution failure.
    #[track_caller]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ExecutionFailure(message.into()))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ToolErrorKind {
        &self.kind
    }
}

impl RetryableError for ToolError {
    fn error_code(&self) -> Option<ErrorCode> {
        match &self.kind {
            ToolErrorKind::NotFound(_) => Some(ErrorCode::NotFound),
            ToolErrorKind::Timeout { .. } => Some(ErrorCode::Timeout),
            ToolErrorKind::ExecutionFailure(_) | ToolErrorKind::Unclassified(_) => None,
        }
    }
}
