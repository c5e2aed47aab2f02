//! Limiter construction errors.
//!
//! Admission itself is total: `acquire`, `release` and friends never fail.
//! These errors only come out of validating a limiter configuration.

use flowgate_error::ConfigError;

/// What was wrong with a limiter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RateLimitErrorKind {
    /// A limit field holds a value no limiter can enforce
    #[display("{} {}", field, reason)]
    InvalidLimit {
        /// Configuration key, e.g. `burst_size`
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// A rejected limiter configuration and where it was rejected.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rate Limit Error: {} at line {} in {}", kind, line, file)]
pub struct RateLimitError {
    kind: RateLimitErrorKind,
    line: u32,
    file: &'static str,
}

impl RateLimitError {
    /// Wrap `kind`, recording the caller's location.
    #[track_caller]
    pub fn new(kind: RateLimitErrorKind) -> Self {
        let caller = std::panic::Location::caller();
        Self {
            kind,
            line: caller.line(),
            file: caller.file(),
        }
    }

    /// Reject `field` for `reason`.
    #[track_caller]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::new(RateLimitErrorKind::InvalidLimit {
            field,
            reason: reason.into(),
        })
    }

    /// The rejection.
    pub fn kind(&self) -> &RateLimitErrorKind {
        &self.kind
    }
}

impl From<RateLimitErrorKind> for RateLimitError {
    #[track_caller]
    fn from(kind: RateLimitErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Folds into the workspace-wide configuration error, keeping the field name in the message.
impl From<RateLimitError> for ConfigError {
    #[track_caller]
    fn from(err: RateLimitError) -> Self {
        ConfigError::new(format!("[rate_limit] {}", err.kind))
    }
}

/// Result of building or validating a limiter.
pub type RateLimitResult<T> = Result<T, RateLimitError>;
