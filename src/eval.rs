// ABOUTME: Trampoline evaluator driving expressions and continuation steps iteratively

use crate::cont::{Continuation, Step};
use crate::env::Environment;
use crate::error::EvalError;
use crate::sym;
use crate::value::{Closure, Value};
use std::rc::Rc;

/// Splits a form into `(car, cdr)`, faulting when the required structure
/// is missing.
fn split(form: &Value, context: &'static str) -> Result<(Value, Value), EvalError> {
    match form {
        Value::Pair(p) => Ok((p.car.clone(), p.cdr.clone())),
        other => Err(EvalError::type_error(context, "pair", other, 1)),
    }
}

/// Evaluates `exp` in `env`, driving a fresh continuation stack until it is
/// empty. Any non-user error picks up a dump of the steps that were still
/// pending when it unwound.
pub fn evaluate(exp: Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut k = Continuation::new();
    match eval_loop(exp, Rc::clone(env), &mut k) {
        Ok(value) => Ok(value),
        Err(error @ EvalError::User(_)) => Err(error),
        Err(error) if !k.is_empty() => Err(EvalError::Traced {
            error: Box::new(error),
            steps: k.to_string(),
        }),
        Err(error) => Err(error),
    }
}

/// The two-phase trampoline: phase 1 reduces `exp` until it is a value,
/// phase 2 pops continuation steps until the stack is empty. Neither phase
/// recurses, so evaluation depth is bounded by the explicit stack alone.
fn eval_loop(
    mut exp: Value,
    mut env: Rc<Environment>,
    k: &mut Continuation,
) -> Result<Value, EvalError> {
    loop {
        // Phase 1: reduce the current expression to a value.
        'reduce: loop {
            match exp {
                Value::Pair(p) => {
                    let kar = p.car.clone();
                    let kdr = p.cdr.clone();
                    match kar {
                        Value::Sym(s) if s == sym::QUOTE => {
                            let (quoted, _) = split(&kdr, "quote")?;
                            exp = quoted;
                            break 'reduce;
                        }
                        Value::Sym(s) if s == sym::IF => {
                            let (test, clauses) = split(&kdr, "if")?;
                            k.push(Step::Then(clauses));
                            exp = test;
                        }
                        Value::Sym(s) if s == sym::BEGIN => {
                            let (first, rest) = split(&kdr, "begin")?;
                            if !rest.is_nil() {
                                k.push(Step::Begin(rest));
                            }
                            exp = first;
                        }
                        Value::Sym(s) if s == sym::LAMBDA => {
                            let (params, body) = split(&kdr, "lambda")?;
                            exp = Value::Closure(Rc::new(Closure {
                                params,
                                body,
                                env: Rc::clone(&env),
                            }));
                            break 'reduce;
                        }
                        Value::Sym(s) if s == sym::DEFINE => {
                            let (name, rest) = split(&kdr, "define")?;
                            let (value_expr, _) = split(&rest, "define")?;
                            match name {
                                Value::Sym(n) => k.push(Step::Define(n)),
                                other => {
                                    return Err(EvalError::type_error(
                                        "define", "symbol", &other, 1,
                                    ))
                                }
                            }
                            exp = value_expr;
                        }
                        Value::Sym(s) if s == sym::SETQ => {
                            let (name, rest) = split(&kdr, "set!")?;
                            let (value_expr, _) = split(&rest, "set!")?;
                            // The binding cell is captured now, before the
                            // value expression runs.
                            match name {
                                Value::Sym(n) => k.push(Step::SetQ(env.look_for(n)?)),
                                other => {
                                    return Err(EvalError::type_error("set!", "symbol", &other, 1))
                                }
                            }
                            exp = value_expr;
                        }
                        operator => {
                            k.push(Step::Apply(kdr));
                            exp = operator;
                        }
                    }
                }
                Value::Sym(s) => {
                    exp = env.look_for(s)?.value();
                    break 'reduce;
                }
                _ => break 'reduce,
            }
        }

        // Phase 2: drive the continuation stack until it needs another
        // expression reduced or runs dry.
        'resume: loop {
            let Some(step) = k.pop() else {
                return Ok(exp);
            };
            match step {
                Step::Then(clauses) => {
                    let (then_branch, else_rest) = split(&clauses, "if")?;
                    if exp.is_false() {
                        match else_rest.as_pair() {
                            Some(p) => {
                                exp = p.car.clone();
                                break 'resume;
                            }
                            None => exp = Value::Void,
                        }
                    } else {
                        exp = then_branch;
                        break 'resume;
                    }
                }
                Step::Begin(rest) => {
                    let (first, more) = split(&rest, "begin")?;
                    if !more.is_nil() {
                        k.push(Step::Begin(more));
                    }
                    exp = first;
                    break 'resume;
                }
                Step::Define(name) => {
                    env.define_here(name, exp);
                    exp = Value::Void;
                }
                Step::SetQ(cell) => {
                    cell.set_value(exp);
                    exp = Value::Void;
                }
                Step::Apply(args) => match args {
                    Value::Nil => {
                        let (value, next_env) = apply_function(exp, Value::Nil, k, &env)?;
                        exp = value;
                        env = next_env;
                    }
                    Value::Pair(p) => {
                        // Arguments evaluate strictly left to right: the
                        // first becomes the next expression, the rest are
                        // stacked so they pop in source order.
                        k.push(Step::ApplyFun(exp));
                        let rest_exprs = p.cdr.try_to_vec()?;
                        for arg in rest_exprs.into_iter().rev() {
                            k.push(Step::EvalArg(arg));
                        }
                        k.push(Step::ConsArgs(Value::Nil));
                        exp = p.car.clone();
                        break 'resume;
                    }
                    other => return Err(EvalError::ImproperList(other.to_string())),
                },
                Step::ConsArgs(collected) => {
                    let args = Value::cons(exp, collected);
                    match k.pop() {
                        Some(Step::EvalArg(next_arg)) => {
                            k.push(Step::ConsArgs(args));
                            exp = next_arg;
                            break 'resume;
                        }
                        Some(Step::ApplyFun(fun)) => {
                            let (value, next_env) =
                                apply_function(fun, reverse_list(args), k, &env)?;
                            exp = value;
                            env = next_env;
                        }
                        _ => unreachable!("ConsArgs sits on an EvalArg or ApplyFun step"),
                    }
                }
                Step::EvalArg(_) | Step::ApplyFun(_) => {
                    unreachable!("argument steps are only consumed through ConsArgs")
                }
                Step::RestoreEnv(saved) => env = saved,
            }
        }
    }
}

/// Reverses an evaluator-built argument list. The accumulator collects
/// evaluated arguments newest first, so the call must see them turned back
/// into source order.
fn reverse_list(list: Value) -> Value {
    let mut reversed = Value::Nil;
    let mut rest = list;
    while let Value::Pair(p) = rest {
        reversed = Value::cons(p.car.clone(), reversed);
        rest = p.cdr.clone();
    }
    reversed
}

/// Applies `fun` to the evaluated `args`, returning the next expression and
/// environment for the trampoline. `call/cc` and `apply` are bound to their
/// own symbols in the global environment and unwrapped here.
fn apply_function(
    mut fun: Value,
    mut args: Value,
    k: &mut Continuation,
    env: &Rc<Environment>,
) -> Result<(Value, Rc<Environment>), EvalError> {
    loop {
        let head = match &fun {
            Value::Sym(s) => Some(*s),
            _ => None,
        };
        if head == Some(sym::CALLCC) {
            // The restore must be pending before the snapshot so the
            // captured continuation reinstates the caller's environment.
            k.push_restore_env(env);
            let (receiver, _) = split(&args, "call/cc")?;
            fun = receiver;
            args = Value::cons(Value::Continuation(Rc::new(k.clone())), Value::Nil);
        } else if head == Some(sym::APPLY) {
            let (target, rest) = split(&args, "apply")?;
            let (arg_list, _) = split(&rest, "apply")?;
            fun = target;
            args = arg_list;
        } else {
            break;
        }
    }
    match fun {
        Value::Intrinsic(native) => {
            let argv = args.try_to_vec()?;
            if native.arity >= 0 && argv.len() != native.arity as usize {
                return Err(EvalError::arity_error(
                    native.name,
                    native.arity.to_string(),
                    argv.len(),
                ));
            }
            let value = (native.fun)(&argv)?;
            Ok((value, Rc::clone(env)))
        }
        Value::Closure(closure) => {
            k.push_restore_env(env);
            k.push(Step::Begin(closure.body.clone()));
            let locals = closure.env.prepend(&closure.params, &args)?;
            Ok((Value::Void, Environment::frame(locals)))
        }
        Value::Continuation(snapshot) => {
            let (value, _) = split(&args, "continuation")?;
            k.copy_from(&snapshot);
            Ok((value, Rc::clone(env)))
        }
        other => Err(EvalError::NotCallable(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::register_builtins;
    use crate::number::Number;
    use crate::parser;

    fn setup() -> Rc<Environment> {
        let env = Environment::global();
        register_builtins(env.clone());
        env
    }

    fn run(env: &Rc<Environment>, source: &str) -> Result<Value, EvalError> {
        evaluate(parser::parse(source).expect("test source parses"), env)
    }

    fn run_ok(env: &Rc<Environment>, source: &str) -> Value {
        run(env, source).expect("test source evaluates")
    }

    #[test]
    fn test_self_evaluating_values() {
        let env = setup();
        assert!(matches!(run_ok(&env, "42"), Value::Num(Number::Int(42))));
        assert!(matches!(run_ok(&env, "#t"), Value::Bool(true)));
        assert_eq!(run_ok(&env, "\"hi\"").to_string(), "\"hi\"");
    }

    #[test]
    fn test_symbol_lookup() {
        let env = setup();
        run_ok(&env, "(define x 42)");
        assert!(matches!(run_ok(&env, "x"), Value::Num(Number::Int(42))));
    }

    #[test]
    fn test_unbound_symbol_fails() {
        let env = setup();
        assert!(matches!(
            run(&env, "nowhere"),
            Err(EvalError::UnboundSymbol(name)) if name == "nowhere"
        ));
    }

    #[test]
    fn test_quote() {
        let env = setup();
        assert_eq!(run_ok(&env, "(quote (a b c))").to_string(), "(a b c)");
        assert_eq!(run_ok(&env, "'x").to_string(), "x");
    }

    #[test]
    fn test_if_branches() {
        let env = setup();
        assert!(matches!(run_ok(&env, "(if #t 1 2)"), Value::Num(Number::Int(1))));
        assert!(matches!(run_ok(&env, "(if #f 1 2)"), Value::Num(Number::Int(2))));
        assert!(matches!(run_ok(&env, "(if #f 1)"), Value::Void));
        // only the boolean false selects the else branch
        assert!(matches!(run_ok(&env, "(if 0 1 2)"), Value::Num(Number::Int(1))));
        assert!(matches!(run_ok(&env, "(if '() 1 2)"), Value::Num(Number::Int(1))));
    }

    #[test]
    fn test_begin_sequences() {
        let env = setup();
        assert!(matches!(run_ok(&env, "(begin 1 2 3)"), Value::Num(Number::Int(3))));
        run_ok(&env, "(begin (define x 10) (define y 20))");
        assert!(matches!(run_ok(&env, "y"), Value::Num(Number::Int(20))));
    }

    #[test]
    fn test_lambda_application() {
        let env = setup();
        assert!(matches!(
            run_ok(&env, "((lambda (x) x) 42)"),
            Value::Num(Number::Int(42))
        ));
        assert!(matches!(
            run_ok(&env, "((lambda (x y) (+ x y)) 10 20)"),
            Value::Num(Number::Int(30))
        ));
    }

    #[test]
    fn test_lambda_arity_mismatch() {
        let env = setup();
        assert!(matches!(
            run(&env, "((lambda (x) x) 1 2)"),
            Err(EvalError::Traced { error, .. }) if matches!(*error, EvalError::Arity { .. })
        ));
    }

    #[test]
    fn test_closure_captures_environment() {
        let env = setup();
        run_ok(&env, "(define make-adder (lambda (n) (lambda (x) (+ x n))))");
        run_ok(&env, "(define add5 (make-adder 5))");
        assert!(matches!(run_ok(&env, "(add5 10)"), Value::Num(Number::Int(15))));
    }

    #[test]
    fn test_set_overwrites_binding() {
        let env = setup();
        run_ok(&env, "(define x 1)");
        assert!(matches!(run_ok(&env, "(set! x 99)"), Value::Void));
        assert!(matches!(run_ok(&env, "x"), Value::Num(Number::Int(99))));
    }

    #[test]
    fn test_set_unbound_fails() {
        let env = setup();
        assert!(matches!(
            run(&env, "(set! ghost 1)"),
            Err(EvalError::UnboundSymbol(_))
        ));
    }

    #[test]
    fn test_define_inside_lambda_is_local() {
        let env = setup();
        run_ok(&env, "((lambda () (define hidden 5) hidden))");
        assert!(run(&env, "hidden").is_err());
    }

    #[test]
    fn test_not_callable() {
        let env = setup();
        assert!(matches!(
            run(&env, "(42 1 2)"),
            Err(EvalError::NotCallable(_))
        ));
    }

    #[test]
    fn test_argument_order_is_left_to_right() {
        let env = setup();
        run_ok(&env, "(define order '())");
        let result = run_ok(
            &env,
            "((lambda (a b) (list a b)) \
               (begin (set! order (cons 1 order)) 1) \
               (begin (set! order (cons 2 order)) 2))",
        );
        assert_eq!(result.to_string(), "(1 2)");
        // side effects ran left to right, so the accumulator holds (2 1)
        assert_eq!(run_ok(&env, "order").to_string(), "(2 1)");
    }

    #[test]
    fn test_recursive_definition() {
        let env = setup();
        run_ok(
            &env,
            "(define fact (lambda (n) (if (= n 0) 1 (* n (fact (- n 1))))))",
        );
        assert_eq!(run_ok(&env, "(fact 10)").to_string(), "3628800");
        // 20! exceeds the bounded integer range and lands in the big tier
        assert_eq!(run_ok(&env, "(fact 20)").to_string(), "2432902008176640000");
    }

    #[test]
    fn test_tail_recursion_is_bounded() {
        let env = setup();
        run_ok(
            &env,
            "(define loop (lambda (n) (if (= n 0) 'done (loop (- n 1)))))",
        );
        assert_eq!(run_ok(&env, "(loop 10000)").to_string(), "done");
    }

    #[test]
    fn test_call_cc_escapes() {
        let env = setup();
        assert_eq!(
            run_ok(&env, "(+ 1 (call/cc (lambda (k) (+ 2 (k 10)))))").to_string(),
            "11"
        );
    }

    #[test]
    fn test_call_cc_falls_through_when_unused() {
        let env = setup();
        assert_eq!(
            run_ok(&env, "(+ 1 (call/cc (lambda (k) 5)))").to_string(),
            "6"
        );
    }

    #[test]
    fn test_continuation_reinvoked_with_different_values() {
        let env = setup();
        run_ok(&env, "(define saved #f)");
        assert_eq!(
            run_ok(&env, "(+ 1 (call/cc (lambda (k) (set! saved k) 1)))").to_string(),
            "2"
        );
        // the snapshot survives its first use and re-enters independently
        assert_eq!(run_ok(&env, "(saved 10)").to_string(), "11");
        assert_eq!(run_ok(&env, "(saved 100)").to_string(), "101");
    }

    #[test]
    fn test_apply_spreads_argument_list() {
        let env = setup();
        assert_eq!(
            run_ok(&env, "(apply + (cons 3 (cons 4 '())))").to_string(),
            "7"
        );
        assert_eq!(run_ok(&env, "(apply car '((a b)))").to_string(), "a");
    }

    #[test]
    fn test_apply_rejects_improper_argument_list() {
        let env = setup();
        assert!(matches!(
            run(&env, "(apply + (cons 1 2))"),
            Err(EvalError::ImproperList(_))
        ));
    }

    #[test]
    fn test_trace_attached_to_non_user_errors() {
        let env = setup();
        let message = run(&env, "(+ 1 (car 2))").expect_err("car of a number").to_string();
        assert!(message.contains("car: expected pair"));
        assert!(message.contains("ApplyFun"));
    }

    #[test]
    fn test_user_error_carries_no_trace() {
        let env = setup();
        let err = run(&env, "(+ 1 (error 'bad \"news\"))").expect_err("error raises");
        assert!(matches!(err, EvalError::User(_)));
        assert_eq!(err.to_string(), "Error: bad: \"news\"");
    }
}
