//! Scope lookup errors.

/// Error returned when reading a variable that holds no value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// The variable exists (or was just created) but has no value.
    #[error("variable `{name}` has no value")]
    NotFound { name: String },
}

impl ScopeError {
    pub(crate) fn not_found(name: &str) -> Self {
        ScopeError::NotFound {
            name: name.to_owned(),
        }
    }
}

/// Result type for scope reads.
pub type ScopeResult<T> = Result<T, ScopeError>;
