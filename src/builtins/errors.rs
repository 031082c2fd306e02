//! User-raised errors: error
//!
//! `(error reason arg)` aborts evaluation with a formatted message. Unlike
//! internal faults, user errors unwind without a continuation dump.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

/// Raises `Error: <reason>: <arg>`, with the reason stringified bare and
/// the argument in read-back notation.
pub fn builtin_error(args: &[Value]) -> Result<Value, EvalError> {
    Err(EvalError::User(format!(
        "Error: {}: {}",
        args[0].to_display_string(),
        args[1]
    )))
}

/// Register the error builtin in the environment
pub fn register(env: &Rc<Environment>) {
    super::define_intrinsic(env, "error", 2, builtin_error);
}
