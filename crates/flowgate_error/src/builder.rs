//! Errors from validating config builders.

/// Why a builder refused to produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BuilderErrorKind {
    /// A field was set to a value the built type cannot accept
    #[display("'{}' {}", field, reason)]
    InvalidField {
        /// Field name as it appears in configuration
        field: String,
        /// What is wrong with the value
        reason: String,
    },

    /// The generated builder could not assemble the value
    #[display("incomplete builder: {}", _0)]
    Incomplete(String),
}

/// Builder failure with the location that raised it.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Builder Error: {} at line {} in {}", kind, line, file)]
pub struct BuilderError {
    kind: BuilderErrorKind,
    line: u32,
    file: &'static str,
}

impl BuilderError {
    /// Wrap `kind`, recording the caller's location.
    #[track_caller]
    pub fn new(kind: BuilderErrorKind) -> Self {
        let caller = std::panic::Location::caller();
        Self {
            kind,
            line: caller.line(),
            file: caller.file(),
        }
    }

    /// A [`BuilderErrorKind::InvalidField`] for `field`.
    #[track_caller]
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(BuilderErrorKind::InvalidField {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// The failure kind.
    pub fn kind(&self) -> &BuilderErrorKind {
        &self.kind
    }
}

/// Messages produced by `derive_builder` generated `build` functions.
impl From<String> for BuilderError {
    #[track_caller]
    fn from(message: String) -> Self {
        Self::new(BuilderErrorKind::Incomplete(message))
    }
}
