//! Errors raised by contract construction and guarded operations.
//!
//! There are two classes of failure. A *contract violation* means a
//! value broke its contract at runtime; its message is exactly the
//! rendered [`Label::msg`] of the violated position so that callers can
//! compare messages verbatim. A *configuration error* means the type
//! description itself is unusable (an unresolved lazy type, an
//! ambiguous union, a misused seal). Neither is ever recovered from
//! inside the engine.

use crate::label::Label;

/// A malformed or unusable type description.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// `forall` was given a body that is neither a function nor a forall.
    #[error("forall {var} must have a function or forall body, found `{found}`")]
    InvalidForallBody { var: String, found: String },
    /// A union was constructed with no members.
    #[error("union must have at least one member")]
    EmptyUnion,
    /// A lazy type was used inside `wrap` before it was defined.
    #[error("lazy type `{0}` was used before it was defined")]
    UnresolvedLazyType(String),
    /// A lazy type would contain itself through union or hybrid members
    /// alone, so checking it could never reach a guard.
    #[error("lazy type `{0}` refers to itself without an enclosing structural type")]
    UnguardedRecursion(String),
    /// A lazy type name was defined twice.
    #[error("lazy type `{0}` is already defined")]
    LazyTypeRedefined(String),
    /// More than one union member accepts the value.
    #[error("{label} ambiguous union `{union}`: {matches} branches accept {value}")]
    AmbiguousUnion {
        label: Label,
        union: String,
        matches: usize,
        value: String,
    },
    /// A type variable reached `wrap` without being instantiated.
    #[error("type variable {0} is not bound by any forall")]
    UnboundTypeVariable(String),
    /// The asserted and expected types can never be reconciled.
    #[error("cannot guard `{left}` against `{right}`")]
    IncompatibleTypes { left: String, right: String },
}

/// The error type of every fallible engine operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlameError {
    /// A value broke its contract at the position named by `label`.
    #[error("{label} {note}")]
    Violation { label: Label, note: String },
    /// A sealed value was unsealed with the wrong store, or a value that
    /// should have been sealed was not.
    #[error("{label} seal violation: {reason}")]
    SealViolation { label: Label, reason: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Host-level misuse of a value, e.g. calling something that is not
    /// a function.
    #[error("{0}")]
    Runtime(String),
}

impl BlameError {
    pub fn violation(label: &Label, note: impl Into<String>) -> Self {
        BlameError::Violation {
            label: label.clone(),
            note: note.into(),
        }
    }

    pub fn seal_violation(label: &Label, reason: impl Into<String>) -> Self {
        BlameError::SealViolation {
            label: label.clone(),
            reason: reason.into(),
        }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        BlameError::Runtime(msg.into())
    }

    /// True for ordinary contract violations.
    pub fn is_violation(&self) -> bool {
        matches!(self, BlameError::Violation { .. })
    }

    /// True for errors in the type description itself, seal misuse included.
    pub fn is_configuration(&self) -> bool {
        matches!(self, BlameError::Config(_) | BlameError::SealViolation { .. })
    }

    /// The label the failure is attributed to, if any.
    pub fn blamed(&self) -> Option<&Label> {
        match self {
            BlameError::Violation { label, .. } | BlameError::SealViolation { label, .. } => {
                Some(label)
            }
            BlameError::Config(ConfigError::AmbiguousUnion { label, .. }) => Some(label),
            BlameError::Config(_) | BlameError::Runtime(_) => None,
        }
    }
}
