//! List operations: car, cdr, cons, list, pair?, null?
//!
//! Pairs are immutable cons cells; a proper list is a chain ending in nil.
//!
//! - `car`: first of a pair
//! - `cdr`: second of a pair
//! - `cons`: fresh pair
//! - `list`: its arguments as a proper list
//! - `pair?` / `null?`: shape predicates

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

/// Returns the first element of a pair.
pub fn builtin_car(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Pair(p) => Ok(p.car.clone()),
        other => Err(EvalError::type_error("car", "pair", other, 1)),
    }
}

/// Returns the second element of a pair.
pub fn builtin_cdr(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Pair(p) => Ok(p.cdr.clone()),
        other => Err(EvalError::type_error("cdr", "pair", other, 1)),
    }
}

/// Builds a fresh pair from its two arguments.
pub fn builtin_cons(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::cons(args[0].clone(), args[1].clone()))
}

/// Returns its arguments as a proper list.
pub fn builtin_list(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::list(args))
}

/// Tests whether the argument is a pair.
pub fn builtin_pair_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(args[0], Value::Pair(_))))
}

/// Tests whether the argument is the empty list.
pub fn builtin_null_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].is_nil()))
}

/// Register all list builtins in the environment
pub fn register(env: &Rc<Environment>) {
    super::define_intrinsic(env, "car", 1, builtin_car);
    super::define_intrinsic(env, "cdr", 1, builtin_cdr);
    super::define_intrinsic(env, "cons", 2, builtin_cons);
    super::define_intrinsic(env, "list", -1, builtin_list);
    super::define_intrinsic(env, "pair?", 1, builtin_pair_p);
    super::define_intrinsic(env, "null?", 1, builtin_null_p);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::Number;

    fn num(n: i32) -> Value {
        Value::Num(Number::Int(n))
    }

    #[test]
    fn test_cons_car_cdr() {
        let pair = builtin_cons(&[num(1), num(2)]).expect("conses");
        assert_eq!(pair.to_string(), "(1 . 2)");
        assert_eq!(builtin_car(&[pair.clone()]).expect("car").to_string(), "1");
        assert_eq!(builtin_cdr(&[pair]).expect("cdr").to_string(), "2");
    }

    #[test]
    fn test_car_of_non_pair_fails() {
        assert!(matches!(
            builtin_car(&[Value::Nil]),
            Err(EvalError::TypeMismatch { .. })
        ));
        assert!(matches!(
            builtin_cdr(&[num(2)]),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_list_builds_proper_list() {
        let list = builtin_list(&[num(1), num(2), num(3)]).expect("lists");
        assert_eq!(list.to_string(), "(1 2 3)");

        let empty = builtin_list(&[]).expect("lists");
        assert!(empty.is_nil());
    }

    #[test]
    fn test_shape_predicates() {
        let pair = Value::cons(num(1), Value::Nil);
        assert!(matches!(builtin_pair_p(&[pair.clone()]).expect("pair?"), Value::Bool(true)));
        assert!(matches!(builtin_pair_p(&[Value::Nil]).expect("pair?"), Value::Bool(false)));
        assert!(matches!(builtin_null_p(&[Value::Nil]).expect("null?"), Value::Bool(true)));
        assert!(matches!(builtin_null_p(&[pair]).expect("null?"), Value::Bool(false)));
    }
}
