//! Error classification codes and the retry classification trait.

use std::convert::Infallible;
use std::str::FromStr;

/// Classification code reported by a failed provider call.
///
/// Retry policies decide eligibility by looking the code up in their set of
/// retryable codes. [`ErrorCode::Other`] carries caller-defined codes so the
/// vocabulary can be extended without touching this crate.
///
/// Codes are parsed case-insensitively and treat `-` and `_` alike:
///
/// ```
/// use flowgate_error::ErrorCode;
///
/// assert_eq!("RATE-LIMIT".parse::<ErrorCode>().unwrap(), ErrorCode::RateLimit);
/// assert_eq!(ErrorCode::RateLimit.to_string(), "rate_limit");
/// assert_eq!(
///     "quota_exhausted".parse::<ErrorCode>().unwrap(),
///     ErrorCode::Other("quota_exhausted".to_string())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ErrorCode {
    /// Provider rejected the call because of a rate limit (HTTP 429)
    #[display("rate_limit")]
    RateLimit,
    /// Call did not complete in time
    #[display("timeout")]
    Timeout,
    /// Transient network failure
    #[display("network")]
    Network,
    /// Provider temporarily unavailable (HTTP 502/503/504)
    #[display("service_unavailable")]
    ServiceUnavailable,
    /// Connection could not be established or was dropped
    #[display("connection")]
    Connection,
    /// Credentials missing or rejected
    #[display("authentication")]
    Authentication,
    /// Request was malformed
    #[display("invalid_input")]
    InvalidInput,
    /// Requested resource does not exist
    #[display("not_found")]
    NotFound,
    /// Caller-defined code
    #[display("{}", _0)]
    Other(String),
}

impl ErrorCode {
    /// Codes retried by default.
    pub const DEFAULT_RETRYABLE: [ErrorCode; 4] = [
        ErrorCode::RateLimit,
        ErrorCode::Timeout,
        ErrorCode::Network,
        ErrorCode::ServiceUnavailable,
    ];

    /// Build a code from an arbitrary string, normalising it the same way as parsing.
    pub fn custom(code: &str) -> Self {
        let normalized = normalize(code);
        match normalized.as_str() {
            "rate_limit" | "rate_limited" => ErrorCode::RateLimit,
            "timeout" | "timed_out" => ErrorCode::Timeout,
            "network" | "network_error" => ErrorCode::Network,
            "service_unavailable" | "unavailable" => ErrorCode::ServiceUnavailable,
            "connection" | "connection_error" => ErrorCode::Connection,
            "authentication" | "unauthorized" => ErrorCode::Authentication,
            "invalid_input" | "bad_request" => ErrorCode::InvalidInput,
            "not_found" => ErrorCode::NotFound,
            _ => ErrorCode::Other(normalized),
        }
    }

    /// Map an HTTP status code to an error code, if it has a meaningful one.
    pub fn from_http_status(status: u16) -> Option<Self> {
        match status {
            408 => Some(ErrorCode::Timeout),
            429 => Some(ErrorCode::RateLimit),
            500 | 502 | 503 | 504 => Some(ErrorCode::ServiceUnavailable),
            400 | 422 => Some(ErrorCode::InvalidInput),
            401 | 403 => Some(ErrorCode::Authentication),
            404 => Some(ErrorCode::NotFound),
            _ => None,
        }
    }

    /// Whether this code denotes a generic connection failure.
    ///
    /// Connection failures are retryable regardless of the configured code set.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ErrorCode::Connection)
    }
}

impl FromStr for ErrorCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::custom(s))
    }
}

fn normalize(code: &str) -> String {
    code.trim()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Trait for errors that can be classified for retry decisions.
///
/// Returning `None` marks the error as unrecognised; retry policies never
/// retry unrecognised errors.
///
/// # Examples
///
/// ```
/// use flowgate_error::{ErrorCode, ProviderError, RetryableError};
///
/// let err = ProviderError::new(ErrorCode::RateLimit, "429 Too Many Requests");
/// assert_eq!(err.error_code(), Some(ErrorCode::RateLimit));
/// ```
pub trait RetryableError {
    /// Classification code for this error, or `None` when unknown.
    fn error_code(&self) -> Option<ErrorCode>;
}

impl<T: RetryableError + ?Sized> RetryableError for &T {
    fn error_code(&self) -> Option<ErrorCode> {
        (**self).error_code()
    }
}

impl RetryableError for std::io::Error {
    fn error_code(&self) -> Option<ErrorCode> {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe => Some(ErrorCode::Connection),
            ErrorKind::TimedOut => Some(ErrorCode::Timeout),
            ErrorKind::AddrNotAvailable | ErrorKind::Interrupted => Some(ErrorCode::Network),
            _ => None,
        }
    }
}
