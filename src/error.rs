// ABOUTME: Error types for reader and evaluation failures in the interpreter

use crate::value::Value;
use thiserror::Error;

/// Faults raised by the s-expression reader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected ')'")]
    UnexpectedClose,

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("malformed expression near: {0}")]
    Malformed(String),
}

/// Faults raised while evaluating.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Type mismatch error with function name, expected type, actual type, and position
    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
        position: usize,
    },

    /// Arity error with function name, expected count, and actual count
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("unbound symbol: {0}")]
    UnboundSymbol(String),

    #[error("not a procedure: {0}")]
    NotCallable(String),

    #[error("proper list required, found: {0}")]
    ImproperList(String),

    /// Raised by the `error` procedure; the message is already fully formatted.
    #[error("{0}")]
    User(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(String),

    /// A non-user error carrying the continuation steps that were still
    /// pending when it unwound.
    #[error("{error}\n\t{steps}")]
    Traced { error: Box<EvalError>, steps: String },
}

impl EvalError {
    /// Create a type mismatch error with full context
    pub fn type_error(function: &str, expected: &str, actual: &Value, position: usize) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
            position,
        }
    }

    /// Create an arity error with expected and actual counts
    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::Arity {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }
}
