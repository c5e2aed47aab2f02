//! Rejected configuration.

/// A configuration value or file that Flowgate refused, with the location
/// that rejected it.
///
/// Component constructors validate their config and return this error before
/// any state is built, so a limiter, policy, cache or bridge never exists in
/// an invalid shape.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// What was rejected and why
    pub message: String,
    /// Line of the check that failed
    pub line: u32,
    /// Source file of the check that failed
    pub file: &'static str,
}

impl ConfigError {
    /// Reject a configuration with a free-form message.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let caller = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: caller.line(),
            file: caller.file(),
        }
    }

    /// Reject one field, naming it first so the message points at the key to fix.
    ///
    /// ```
    /// use flowgate_error::ConfigError;
    ///
    /// let err = ConfigError::invalid_field("max_entries", "must be greater than zero");
    /// assert_eq!(err.message, "max_entries must be greater than zero");
    /// ```
    #[track_caller]
    pub fn invalid_field(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(format!("{} {}", field, reason))
    }
}
