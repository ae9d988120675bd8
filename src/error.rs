use thiserror::Error;

/// Errors raised while lexing, evaluating, or running scripts.
///
/// Errors abort the whole evaluation in progress. The host entry points wrap
/// whatever was raised into [`ScriptError::Aborted`], composing the message
/// with the accumulated call trace and the source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The parser met a token of the wrong kind.
    #[error("got {found} expected {expected} at {position}")]
    TokenMismatch {
        expected: String,
        found: String,
        position: String,
    },

    /// An operator was applied to a type combination that does not define it.
    #[error("operation {op} not supported on the {datatype} datatype")]
    UnsupportedOperation { op: String, datatype: String },

    /// Integer division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A loop ran past the iteration cap.
    #[error("LOOP_ERROR")]
    LoopLimit,

    /// A call was made on something that is not a function.
    #[error("expecting '{0}' to be a function")]
    NotAFunction(String),

    /// Composed host-level failure: inner message, call trace, position.
    #[error("{0}")]
    Aborted(String),
}
