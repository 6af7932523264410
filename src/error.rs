//! Error taxonomy for the Pine VM.
//!
//! Every fallible step in the value layer, expression codec, and evaluator
//! returns a [`PineError`]. Steps that call into a sub-step wrap the
//! propagated error with positional context via [`PineError::context`], so a
//! failure several frames deep still reads as a breadcrumb trail rather than
//! a bare message.

use std::fmt;

use thiserror::Error;

/// The closed set of ways a Pine operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("unknown tag '{0}'")]
    UnknownTag(String),

    #[error("unknown kernel function '{0}'")]
    UnknownKernel(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("evaluation cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

/// A [`ErrorKind`] plus an accumulated chain of positional context, e.g.
/// `"list element [3]"` or `"decode-and-evaluate environment"`.
///
/// Display renders as `"Failed to <step>: ... Failed to <step>: <inner>"`
/// per the user-visible failure format in the specification; programmatic
/// consumers should match on [`PineError::kind`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PineError {
    kind: ErrorKind,
    context: Vec<String>,
}

impl PineError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: Vec::new(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Wrap this error with a description of the step that was being
    /// attempted when it propagated ("list element [3]", "conditional
    /// condition", ...).
    #[must_use]
    pub fn context(mut self, step: impl Into<String>) -> Self {
        self.context.push(step.into());
        self
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode(reason.into()))
    }

    pub fn unknown_tag(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownTag(name.into()))
    }

    pub fn unknown_kernel(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownKernel(name.into()))
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        })
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

impl fmt::Display for PineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in self.context.iter().rev() {
            write!(f, "Failed to {step}: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for PineError {}

/// Convenience trait for attaching context to a `Result<_, PineError>`
/// without an intermediate `map_err` closure at every call site.
pub trait ResultExt<T> {
    fn with_context(self, step: impl Into<String>) -> Result<T, PineError>;
}

impl<T> ResultExt<T> for Result<T, PineError> {
    fn with_context(self, step: impl Into<String>) -> Result<T, PineError> {
        self.map_err(|e| e.context(step))
    }
}

pub type PineResult<T> = Result<T, PineError>;
