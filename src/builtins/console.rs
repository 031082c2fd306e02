//! Terminal I/O: display, newline, read
//!
//! - `display`: emits the bare stringification of its argument, no newline
//! - `newline`: emits a line terminator
//! - `read`: parses one expression from stdin, `#<EOF>` at stream end
//!
//! `display` flushes so interleaved output is observable in source order.
//! `read` keeps a line buffer across calls: a line may hold several
//! expressions, and an expression may span several lines.

use crate::env::Environment;
use crate::error::{EvalError, ParseError};
use crate::parser::{self, ReadOutcome};
use crate::value::Value;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

thread_local! {
    static READ_BUFFER: RefCell<String> = const { RefCell::new(String::new()) };
}

fn io_error(err: io::Error) -> EvalError {
    EvalError::Io(err.to_string())
}

/// Emits the unquoted stringification of its argument. Returns VOID.
pub fn builtin_display(args: &[Value]) -> Result<Value, EvalError> {
    let mut out = io::stdout();
    write!(out, "{}", args[0].to_display_string()).map_err(io_error)?;
    out.flush().map_err(io_error)?;
    Ok(Value::Void)
}

/// Emits a line terminator. Returns VOID.
pub fn builtin_newline(_args: &[Value]) -> Result<Value, EvalError> {
    let mut out = io::stdout();
    writeln!(out).map_err(io_error)?;
    out.flush().map_err(io_error)?;
    Ok(Value::Void)
}

/// Reads one expression from stdin, pulling further lines while the buffer
/// holds an incomplete expression. Returns EOF at stream end.
pub fn builtin_read(_args: &[Value]) -> Result<Value, EvalError> {
    READ_BUFFER.with(|buffer| {
        let mut buf = buffer.borrow_mut();
        loop {
            let outcome = match parser::read_expr(&buf) {
                Ok(outcome) => outcome,
                Err(e) => {
                    buf.clear();
                    return Err(e.into());
                }
            };
            match outcome {
                ReadOutcome::Expr(value, used) => {
                    buf.drain(..used);
                    return Ok(value);
                }
                pending => {
                    let mut line = String::new();
                    let read = io::stdin().lock().read_line(&mut line).map_err(io_error)?;
                    if read == 0 {
                        return match pending {
                            ReadOutcome::End => Ok(Value::Eof),
                            _ => {
                                buf.clear();
                                Err(ParseError::UnexpectedEof.into())
                            }
                        };
                    }
                    buf.push_str(&line);
                }
            }
        }
    })
}

/// Register all console builtins in the environment
pub fn register(env: &Rc<Environment>) {
    super::define_intrinsic(env, "display", 1, builtin_display);
    super::define_intrinsic(env, "newline", 0, builtin_newline);
    super::define_intrinsic(env, "read", 0, builtin_read);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::Number;

    #[test]
    fn test_display_and_newline_return_void() {
        assert!(matches!(
            builtin_display(&[Value::Num(Number::Int(1))]).expect("display"),
            Value::Void
        ));
        assert!(matches!(builtin_newline(&[]).expect("newline"), Value::Void));
    }
}
