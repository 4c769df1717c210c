//! Construction errors for expression nodes.
//!
//! Every variant here is an invalid-argument error: the factory rejected
//! its input before building anything. Contract violations by trusted
//! callers (a `rewrite` with the wrong child count, an out-of-range index)
//! are panics, not errors.

use crate::ExprKind;

/// Error returned by the validating node factories.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// A block was requested with no expressions.
    #[error("`{param}` must contain at least one expression")]
    EmptySequence { param: &'static str },

    /// A child cannot be evaluated in value position.
    #[error("expression at position {index} of `{param}` is a {kind} and cannot be read")]
    Unreadable {
        param: &'static str,
        index: usize,
        kind: ExprKind,
    },

    /// A scope variable was declared by reference.
    #[error("variable `{name}` at position {index} is a by-reference parameter")]
    ByRefVariable { index: usize, name: String },

    /// The same parameter appears twice in one scope's declarations.
    #[error("variable `{name}` at position {index} is declared more than once")]
    DuplicateVariable { index: usize, name: String },
}

impl ExprError {
    /// All construction errors belong to the invalid-argument class.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            ExprError::EmptySequence { .. }
                | ExprError::Unreadable { .. }
                | ExprError::ByRefVariable { .. }
                | ExprError::DuplicateVariable { .. }
        )
    }
}

/// Result type for node factories.
pub type ExprResult<T> = Result<T, ExprError>;
