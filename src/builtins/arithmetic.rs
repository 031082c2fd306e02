//! Numeric operations: +, -, *, <, =, number?
//!
//! All arithmetic goes through the mixed-precision tower: results take the
//! smallest representation that fits, and floats are contagious.
//!
//! - `+`, `-`, `*`: two-argument arithmetic
//! - `<`: strict less-than over numerics
//! - `=`: numeric equality across representations
//! - `number?`: numeric-tower membership

use crate::env::Environment;
use crate::error::EvalError;
use crate::number::Number;
use crate::value::Value;
use std::cmp::Ordering;
use std::rc::Rc;

fn number_arg<'a>(
    function: &str,
    args: &'a [Value],
    position: usize,
) -> Result<&'a Number, EvalError> {
    match &args[position] {
        Value::Num(n) => Ok(n),
        other => Err(EvalError::type_error(function, "number", other, position + 1)),
    }
}

/// Returns the sum of its two arguments.
pub fn builtin_add(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Num(
        number_arg("+", args, 0)?.add(number_arg("+", args, 1)?),
    ))
}

/// Returns the first argument minus the second.
pub fn builtin_sub(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Num(
        number_arg("-", args, 0)?.sub(number_arg("-", args, 1)?),
    ))
}

/// Returns the product of its two arguments.
pub fn builtin_mul(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Num(
        number_arg("*", args, 0)?.mul(number_arg("*", args, 1)?),
    ))
}

/// Strict numeric less-than.
pub fn builtin_lt(args: &[Value]) -> Result<Value, EvalError> {
    let ordering = number_arg("<", args, 0)?.compare(number_arg("<", args, 1)?);
    Ok(Value::Bool(ordering == Ordering::Less))
}

/// Numeric equality across representations.
pub fn builtin_num_eq(args: &[Value]) -> Result<Value, EvalError> {
    let ordering = number_arg("=", args, 0)?.compare(number_arg("=", args, 1)?);
    Ok(Value::Bool(ordering == Ordering::Equal))
}

/// Tests membership in the numeric tower.
pub fn builtin_number_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(args[0], Value::Num(_))))
}

/// Register all arithmetic builtins in the environment
pub fn register(env: &Rc<Environment>) {
    super::define_intrinsic(env, "+", 2, builtin_add);
    super::define_intrinsic(env, "-", 2, builtin_sub);
    super::define_intrinsic(env, "*", 2, builtin_mul);
    super::define_intrinsic(env, "<", 2, builtin_lt);
    super::define_intrinsic(env, "=", 2, builtin_num_eq);
    super::define_intrinsic(env, "number?", 1, builtin_number_p);
}
