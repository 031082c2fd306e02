// ABOUTME: Value types representing Scheme data and expressions, plus the stringifier

use crate::cont::Continuation;
use crate::env::Environment;
use crate::error::EvalError;
use crate::number::Number;
use crate::sym::Symbol;
use std::fmt;
use std::rc::Rc;

/// A cons cell. Immutable once built; proper lists end in `Value::Nil`.
#[derive(Debug, Clone)]
pub struct Pair {
    pub car: Value,
    pub cdr: Value,
}

/// A user function: parameter list, body expressions, defining environment.
#[derive(Debug, Clone)]
pub struct Closure {
    pub params: Value,
    pub body: Value,
    pub env: Rc<Environment>,
}

/// A named built-in procedure. `arity` of -1 accepts any argument count;
/// fixed arities are enforced by the evaluator before `fun` runs.
#[derive(Debug, Clone)]
pub struct Intrinsic {
    pub name: &'static str,
    pub arity: i32,
    pub fun: fn(&[Value]) -> Result<Value, EvalError>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Num(Number),
    Str(Rc<str>),
    Sym(Symbol),
    Pair(Rc<Pair>),
    Closure(Rc<Closure>),
    Intrinsic(Rc<Intrinsic>),
    Continuation(Rc<Continuation>),
    /// Result of expressions with no meaningful value (`define`, `set!`, ...)
    Void,
    /// Returned by `read` at end of input
    Eof,
}

impl Value {
    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Pair(Rc::new(Pair { car, cdr }))
    }

    /// Builds a proper list from the given elements.
    pub fn list(items: &[Value]) -> Value {
        items
            .iter()
            .rev()
            .fold(Value::Nil, |tail, item| Value::cons(item.clone(), tail))
    }

    /// Builds a pair chain ending in `tail` instead of nil.
    pub fn improper_list(items: &[Value], tail: Value) -> Value {
        items
            .iter()
            .rev()
            .fold(tail, |tail, item| Value::cons(item.clone(), tail))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Only the boolean false is falsy.
    pub fn is_false(&self) -> bool {
        matches!(self, Value::Bool(false))
    }

    pub fn as_pair(&self) -> Option<&Rc<Pair>> {
        match self {
            Value::Pair(p) => Some(p),
            _ => None,
        }
    }

    /// Collects a proper list into a vector, failing on an improper tail.
    pub fn try_to_vec(&self) -> Result<Vec<Value>, EvalError> {
        let mut items = Vec::new();
        let mut rest = self;
        loop {
            match rest {
                Value::Nil => return Ok(items),
                Value::Pair(p) => {
                    items.push(p.car.clone());
                    rest = &p.cdr;
                }
                other => return Err(EvalError::ImproperList(other.to_string())),
            }
        }
    }

    /// Identity equality: atoms compare by value, everything heap-allocated
    /// by pointer. Boxed numbers (`Big`, `Float`) are never identical;
    /// `eqv?` covers those.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) | (Value::Void, Value::Void) | (Value::Eof, Value::Eof) => {
                true
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Sym(a), Value::Sym(b)) => a == b,
            (Value::Num(Number::Int(a)), Value::Num(Number::Int(b))) => a == b,
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Intrinsic(a), Value::Intrinsic(b)) => Rc::ptr_eq(a, b),
            (Value::Continuation(a), Value::Continuation(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "()",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Sym(_) => "symbol",
            Value::Pair(_) => "pair",
            Value::Closure(_) => "closure",
            Value::Intrinsic(_) => "intrinsic",
            Value::Continuation(_) => "continuation",
            Value::Void => "void",
            Value::Eof => "eof",
        }
    }

    /// Stringifies without quoting strings, as `display` and error
    /// reasons require.
    pub fn to_display_string(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self, false).expect("string formatting cannot fail");
        out
    }
}

/// Renders `value` into `out`; `quote` selects the read-back notation for
/// strings (the `Display` impl) over the bare one (`display`).
fn write_value<W: fmt::Write>(out: &mut W, value: &Value, quote: bool) -> fmt::Result {
    match value {
        Value::Nil => write!(out, "()"),
        Value::Bool(true) => write!(out, "#t"),
        Value::Bool(false) => write!(out, "#f"),
        Value::Num(n) => write!(out, "{}", n),
        Value::Str(s) => {
            if quote {
                write!(out, "\"{}\"", s)
            } else {
                write!(out, "{}", s)
            }
        }
        Value::Sym(s) => write!(out, "{}", s),
        Value::Pair(p) => write_pair(out, p, quote),
        Value::Closure(c) => {
            write!(out, "#<")?;
            write_value(out, &c.params, quote)?;
            write!(out, ":")?;
            write_value(out, &c.body, quote)?;
            write!(out, ":{}>", c.env)
        }
        Value::Intrinsic(native) => write!(out, "#<{}:{}>", native.name, native.arity),
        Value::Continuation(k) => write!(out, "#<continuation:{}>", k.len()),
        Value::Void => write!(out, "#<VOID>"),
        Value::Eof => write!(out, "#<EOF>"),
    }
}

/// The cdr chain is walked iteratively so deep lists do not recurse; an
/// improper tail is emitted after a dot.
fn write_pair<W: fmt::Write>(out: &mut W, pair: &Pair, quote: bool) -> fmt::Result {
    write!(out, "(")?;
    write_value(out, &pair.car, quote)?;
    let mut rest = &pair.cdr;
    loop {
        match rest {
            Value::Nil => break,
            Value::Pair(p) => {
                write!(out, " ")?;
                write_value(out, &p.car, quote)?;
                rest = &p.cdr;
            }
            tail => {
                write!(out, " . ")?;
                write_value(out, tail, quote)?;
                break;
            }
        }
    }
    write!(out, ")")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, true)
    }
}
