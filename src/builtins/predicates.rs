//! Identity and type predicates: eq?, eqv?, not, symbol?, eof-object?
//!
//! - `eq?`: identity equality
//! - `eqv?`: identity, or numeric equality when both sides are numbers
//! - `not`: true only for the boolean false
//! - `symbol?` / `eof-object?`: shape predicates

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::cmp::Ordering;
use std::rc::Rc;

/// Identity equality.
pub fn builtin_eq(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].is_identical(&args[1])))
}

/// Identity, widened to numeric equality when both arguments are numbers.
pub fn builtin_eqv(args: &[Value]) -> Result<Value, EvalError> {
    let same = match (&args[0], &args[1]) {
        (Value::Num(a), Value::Num(b)) => a.compare(b) == Ordering::Equal,
        _ => args[0].is_identical(&args[1]),
    };
    Ok(Value::Bool(same))
}

/// True iff the argument is the boolean false.
pub fn builtin_not(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].is_false()))
}

/// Tests whether the argument is a symbol.
pub fn builtin_symbol_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(args[0], Value::Sym(_))))
}

/// Tests whether the argument is the end-of-file object.
pub fn builtin_eof_object_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(args[0], Value::Eof)))
}

/// Register all predicate builtins in the environment
pub fn register(env: &Rc<Environment>) {
    super::define_intrinsic(env, "eq?", 2, builtin_eq);
    super::define_intrinsic(env, "eqv?", 2, builtin_eqv);
    super::define_intrinsic(env, "not", 1, builtin_not);
    super::define_intrinsic(env, "symbol?", 1, builtin_symbol_p);
    super::define_intrinsic(env, "eof-object?", 1, builtin_eof_object_p);
}
