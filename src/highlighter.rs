// ABOUTME: Syntax highlighter for the REPL with ANSI color support
// Implements rustyline's Highlighter trait to provide color codes for
// Scheme syntax elements while preserving display width

use crate::number::Number;
use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Helper;
use std::borrow::Cow;

// ANSI color codes (3-bit/4-bit colors for maximum terminal compatibility)
const COLOR_RESET: &str = "\x1b[0m";
const COLOR_PARENS: &str = "\x1b[1;34m"; // Bold blue
const COLOR_SPECIAL_FORM: &str = "\x1b[1;35m"; // Bold magenta
const COLOR_BUILTIN: &str = "\x1b[36m"; // Cyan
const COLOR_NUMBER: &str = "\x1b[33m"; // Yellow
const COLOR_STRING: &str = "\x1b[32m"; // Green
const COLOR_BOOLEAN: &str = "\x1b[33m"; // Yellow
const COLOR_COMMENT: &str = "\x1b[90m"; // Bright black (gray)
const COLOR_QUOTE: &str = "\x1b[1;33m"; // Bold yellow

/// Keywords with special evaluation semantics
const SPECIAL_FORMS: [&str; 6] = ["quote", "if", "begin", "lambda", "define", "set!"];

/// Names installed in the global environment at startup
const BUILTINS: [&str; 24] = [
    "car",
    "cdr",
    "cons",
    "list",
    "pair?",
    "null?",
    "eq?",
    "eqv?",
    "not",
    "symbol?",
    "eof-object?",
    "+",
    "-",
    "*",
    "<",
    "=",
    "number?",
    "display",
    "newline",
    "read",
    "error",
    "globals",
    "apply",
    "call/cc",
];

/// Main highlighter helper for the Scheme REPL
pub struct SchemeHelper;

impl SchemeHelper {
    pub fn new() -> Self {
        SchemeHelper
    }
}

impl Default for SchemeHelper {
    fn default() -> Self {
        Self::new()
    }
}

// Implement the required rustyline traits
impl Helper for SchemeHelper {}

impl Completer for SchemeHelper {
    type Candidate = String;
}

impl Hinter for SchemeHelper {
    type Hint = String;
}

impl Validator for SchemeHelper {}

impl Highlighter for SchemeHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let highlighted = highlight_line(line);
        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true // re-highlight on character input and cursor movement
    }
}

fn is_atom_end(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '"' | ';')
}

fn push_colored(result: &mut String, color: &str, text: &str) {
    result.push_str(color);
    result.push_str(text);
    result.push_str(COLOR_RESET);
}

/// Tokenize a line and apply syntax highlighting
fn highlight_line(line: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            // Comments: everything from ; to end of line
            ';' => {
                result.push_str(COLOR_COMMENT);
                while i < chars.len() && chars[i] != '\n' {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }

            // Strings: preserve exact content but colorize
            '"' => {
                result.push_str(COLOR_STRING);
                result.push('"');
                i += 1;
                while i < chars.len() {
                    let c = chars[i];
                    result.push(c);
                    i += 1;
                    if c == '"' {
                        break;
                    }
                }
                result.push_str(COLOR_RESET);
            }

            '(' | ')' => {
                push_colored(&mut result, COLOR_PARENS, &chars[i].to_string());
                i += 1;
            }

            '\'' => {
                push_colored(&mut result, COLOR_QUOTE, "'");
                i += 1;
            }

            c if c.is_whitespace() => {
                result.push(c);
                i += 1;
            }

            // Atoms: collect to the next delimiter, then classify
            _ => {
                let start = i;
                while i < chars.len() && !is_atom_end(chars[i]) {
                    i += 1;
                }
                let atom: String = chars[start..i].iter().collect();

                if SPECIAL_FORMS.contains(&atom.as_str()) {
                    push_colored(&mut result, COLOR_SPECIAL_FORM, &atom);
                } else if BUILTINS.contains(&atom.as_str()) {
                    push_colored(&mut result, COLOR_BUILTIN, &atom);
                } else if atom == "#t" || atom == "#f" {
                    push_colored(&mut result, COLOR_BOOLEAN, &atom);
                } else if Number::parse(&atom).is_some() {
                    push_colored(&mut result, COLOR_NUMBER, &atom);
                } else {
                    result.push_str(&atom);
                }
            }
        }
    }

    result
}
