//! # Built-in Procedures Module
//!
//! The intrinsic registry installed in the global environment, organized
//! into categories:
//!
//! - **[arithmetic]**: +, -, *, <, =, number? - numeric tower operations
//! - **[lists]**: car, cdr, cons, list, pair?, null? - pair manipulation
//! - **[predicates]**: eq?, eqv?, not, symbol?, eof-object? - identity tests
//! - **[console]**: display, newline, read - terminal I/O
//! - **[errors]**: error - user-raised failures
//!
//! `globals` lives here at the registry root, and `apply` / `call/cc` are
//! bound to their own literal symbols so function application can recognise
//! and unwrap them.

use crate::env::Environment;
use crate::error::EvalError;
use crate::sym::{self, Symbol};
use crate::value::{Intrinsic, Value};
use std::cell::RefCell;
use std::rc::Rc;

pub mod arithmetic;
pub mod console;
pub mod errors;
pub mod lists;
pub mod predicates;

// Re-export for convenience
pub use arithmetic::register as register_arithmetic;
pub use console::register as register_console;
pub use errors::register as register_errors;
pub use lists::register as register_lists;
pub use predicates::register as register_predicates;

// ============================================================================
// Global environment handle for the `globals` intrinsic
// ============================================================================

thread_local! {
    static GLOBAL_ENV: RefCell<Option<Rc<Environment>>> = const { RefCell::new(None) };
}

fn set_global_env(env: Rc<Environment>) {
    GLOBAL_ENV.with(|g| {
        *g.borrow_mut() = Some(env);
    });
}

/// Returns a proper list of all symbols bound in the global environment
pub fn builtin_globals(_args: &[Value]) -> Result<Value, EvalError> {
    GLOBAL_ENV.with(|g| {
        let guard = g.borrow();
        let Some(head) = guard.as_ref() else {
            return Ok(Value::Nil);
        };
        let mut names = Vec::new();
        let mut current = head.next();
        while let Some(cell) = current {
            if let Some(s) = cell.symbol() {
                names.push(Value::Sym(s));
            }
            current = cell.next();
        }
        Ok(Value::list(&names))
    })
}

// ============================================================================
// Registration
// ============================================================================

/// Defines a named intrinsic in `env`. An arity of -1 accepts any count;
/// fixed arities are checked by the evaluator before the function runs.
pub fn define_intrinsic(
    env: &Rc<Environment>,
    name: &'static str,
    arity: i32,
    fun: fn(&[Value]) -> Result<Value, EvalError>,
) {
    env.define_here(
        Symbol::intern(name),
        Value::Intrinsic(Rc::new(Intrinsic { name, arity, fun })),
    );
}

/// Register all built-in procedures in the environment
pub fn register_builtins(env: Rc<Environment>) {
    set_global_env(env.clone());

    register_arithmetic(&env);
    register_lists(&env);
    register_predicates(&env);
    register_console(&env);
    register_errors(&env);

    define_intrinsic(&env, "globals", 0, builtin_globals);

    // `apply` and `call/cc` evaluate to their own symbols; function
    // application recognises and unwraps them.
    env.define_here(sym::APPLY, Value::Sym(sym::APPLY));
    env.define_here(sym::CALLCC, Value::Sym(sym::CALLCC));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_binds_every_name() {
        let env = Environment::global();
        register_builtins(env.clone());

        for name in [
            "car", "cdr", "cons", "list", "pair?", "null?", "eq?", "eqv?", "not", "symbol?",
            "eof-object?", "+", "-", "*", "<", "=", "number?", "display", "newline", "read",
            "error", "globals", "apply", "call/cc",
        ] {
            assert!(
                env.look_for(Symbol::intern(name)).is_ok(),
                "{} should be bound",
                name
            );
        }
    }

    #[test]
    fn test_apply_and_call_cc_are_their_own_symbols() {
        let env = Environment::global();
        register_builtins(env.clone());

        let apply = env.look_for(sym::APPLY).expect("apply bound").value();
        assert!(matches!(apply, Value::Sym(s) if s == sym::APPLY));

        let callcc = env.look_for(sym::CALLCC).expect("call/cc bound").value();
        assert!(matches!(callcc, Value::Sym(s) if s == sym::CALLCC));
    }

    #[test]
    fn test_globals_lists_bound_symbols() {
        let env = Environment::global();
        register_builtins(env.clone());
        env.define_here(Symbol::intern("user-made"), Value::Bool(true));

        let listing = builtin_globals(&[]).expect("globals succeeds").to_string();
        assert!(listing.contains("car"));
        assert!(listing.contains("call/cc"));
        assert!(listing.contains("user-made"));
    }
}
