//! Classified failures of external model/storage provider calls.

use crate::{ErrorCode, RetryableError};

/// A failed provider call with its classification code and source location.
///
/// # Examples
///
/// ```
/// use flowgate_error::{ErrorCode, ProviderError};
///
/// let err = ProviderError::from_http_status(503, "upstream overloaded");
/// assert_eq!(err.code, Some(ErrorCode::ServiceUnavailable));
/// assert!(format!("{}", err).contains("upstream overloaded"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", message, line, file)]
pub struct ProviderError {
    /// Classification code, `None` when the failure is unrecognised
    pub code: Option<ErrorCode>,
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ProviderError {
    /// Create a classified provider error at the current location.
    #[track_caller]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_code(Some(code), message)
    }

    /// Create a provider error the caller could not classify.
    #[track_caller]
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::with_code(None, message)
    }

    /// Create a provider error from an HTTP status code.
    #[track_caller]
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::with_code(
            ErrorCode::from_http_status(status),
            format!("HTTP {}: {}", status, message),
        )
    }

    #[track_caller]
    fn with_code(code: Option<ErrorCode>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            code,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for ProviderError {
    fn error_code(&self) -> Option<ErrorCode> {
        self.code.clone()
    }
}
