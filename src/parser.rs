// ABOUTME: S-expression reader built on nom combinators, producing pair-chain values

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::value,
    multi::many0,
    IResult, Parser,
};

use crate::error::ParseError;
use crate::number::Number;
use crate::sym::{self, Symbol};
use crate::value::Value;

/// Result of asking the reader for one expression from a buffer.
#[derive(Debug, Clone)]
pub enum ReadOutcome {
    /// A complete expression and the number of bytes consumed, including
    /// leading whitespace and comments.
    Expr(Value, usize),
    /// The buffer starts an expression but does not finish it yet.
    Incomplete,
    /// Nothing but whitespace and comments remain.
    End,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '"' | ';')
}

// ============================================================================
// nom combinators over a known-complete span
// ============================================================================

fn line_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

/// Skip whitespace and comments
fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((
        value((), take_while1(char::is_whitespace)),
        line_comment,
    )))
    .map(|_| ())
    .parse(input)
}

/// Parse a string: raw text between double quotes, no escape processing
fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('"')(input)?;
    let (input, content) = take_while(|c| c != '"')(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, Value::Str(content.into())))
}

/// Parse a quoted expression: 'expr -> (quote expr)
fn parse_quote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('\'')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, Value::list(&[Value::Sym(sym::QUOTE), expr])))
}

/// A lone `.` introduces a dotted tail; it only counts when a delimiter
/// follows, so symbols like `.5` and `...` are untouched.
fn parse_dot(input: &str) -> IResult<&str, ()> {
    let (rest, _) = char('.')(input)?;
    match rest.chars().next() {
        None => Ok((rest, ())),
        Some(c) if is_delimiter(c) => Ok((rest, ())),
        Some(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        ))),
    }
}

/// Parse an atom token and classify it: booleans, then the numeric tower,
/// otherwise an interned symbol.
fn parse_atom(input: &str) -> IResult<&str, Value> {
    let (rest, token) = take_while1(|c: char| !is_delimiter(c))(input)?;
    if token == "." {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    let atom = match token {
        "#t" => Value::Bool(true),
        "#f" => Value::Bool(false),
        _ => match Number::parse(token) {
            Some(n) => Value::Num(n),
            None => Value::Sym(Symbol::intern(token)),
        },
    };
    Ok((rest, atom))
}

/// Parse a list: (expr ...) with an optional dotted tail before the closer.
/// An empty list reads as nil.
fn parse_list(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('(')(input)?;
    let mut items = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = ws_and_comments(remaining)?;
        if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>(')')(rest) {
            return Ok((rest, Value::list(&items)));
        }
        if !items.is_empty() {
            if let Ok((rest, _)) = parse_dot(rest) {
                let (rest, tail) = parse_expr(rest)?;
                let (rest, _) = ws_and_comments(rest)?;
                let (rest, _) = char(')')(rest)?;
                return Ok((rest, Value::improper_list(&items, tail)));
            }
        }
        let (rest, expr) = parse_expr(rest)?;
        items.push(expr);
        remaining = rest;
    }
}

/// Main expression parser - tries all alternatives
fn parse_expr(input: &str) -> IResult<&str, Value> {
    let (input, _) = ws_and_comments(input)?;
    alt((parse_quote, parse_list, parse_string, parse_atom)).parse(input)
}

// ============================================================================
// Completeness scan
// ============================================================================

enum Scan {
    End,
    Incomplete,
    Complete(usize),
}

/// Locates the end of the first complete expression without building it:
/// parens are balanced outside strings and comments, `'` prefixes attach to
/// the expression that follows. This is what lets the interactive loop tell
/// "keep typing" apart from "malformed".
fn scan_expr(input: &str) -> Result<Scan, ParseError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let len = input.len();
    let mut i = 0;

    let skip_blank = |i: &mut usize| {
        while *i < chars.len() {
            let (_, c) = chars[*i];
            if c.is_whitespace() {
                *i += 1;
            } else if c == ';' {
                while *i < chars.len() && chars[*i].1 != '\n' {
                    *i += 1;
                }
            } else {
                break;
            }
        }
    };

    skip_blank(&mut i);
    if i >= chars.len() {
        return Ok(Scan::End);
    }

    // Consume quote prefixes; the span ends with the datum they decorate.
    while chars[i].1 == '\'' {
        i += 1;
        skip_blank(&mut i);
        if i >= chars.len() {
            return Ok(Scan::Incomplete);
        }
    }

    match chars[i].1 {
        ')' => Err(ParseError::UnexpectedClose),
        '"' => {
            i += 1;
            while i < chars.len() {
                if chars[i].1 == '"' {
                    return Ok(Scan::Complete(end_offset(&chars, i + 1, len)));
                }
                i += 1;
            }
            Ok(Scan::Incomplete)
        }
        '(' => {
            let mut depth = 0usize;
            while i < chars.len() {
                match chars[i].1 {
                    '"' => {
                        i += 1;
                        while i < chars.len() && chars[i].1 != '"' {
                            i += 1;
                        }
                        if i >= chars.len() {
                            return Ok(Scan::Incomplete);
                        }
                    }
                    ';' => {
                        while i < chars.len() && chars[i].1 != '\n' {
                            i += 1;
                        }
                        continue;
                    }
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(Scan::Complete(end_offset(&chars, i + 1, len)));
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            Ok(Scan::Incomplete)
        }
        _ => {
            while i < chars.len() && !is_delimiter(chars[i].1) {
                i += 1;
            }
            Ok(Scan::Complete(end_offset(&chars, i, len)))
        }
    }
}

fn end_offset(chars: &[(usize, char)], index: usize, len: usize) -> usize {
    chars.get(index).map_or(len, |(offset, _)| *offset)
}

fn snippet(rest: &str) -> String {
    rest.chars().take(40).collect()
}

fn nom_failure(err: nom::Err<nom::error::Error<&str>>) -> ParseError {
    let place = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.input,
        nom::Err::Incomplete(_) => "",
    };
    ParseError::Malformed(snippet(place))
}

// ============================================================================
// Public entry points
// ============================================================================

/// Reads at most one expression from the front of `input`.
pub fn read_expr(input: &str) -> Result<ReadOutcome, ParseError> {
    match scan_expr(input)? {
        Scan::End => Ok(ReadOutcome::End),
        Scan::Incomplete => Ok(ReadOutcome::Incomplete),
        Scan::Complete(end) => {
            let (_, expr) = parse_expr(&input[..end]).map_err(nom_failure)?;
            Ok(ReadOutcome::Expr(expr, end))
        }
    }
}

/// Parses exactly one expression spanning the whole input.
#[allow(dead_code)]
pub fn parse(input: &str) -> Result<Value, ParseError> {
    match read_expr(input)? {
        ReadOutcome::Expr(expr, used) => match scan_expr(&input[used..])? {
            Scan::End => Ok(expr),
            _ => Err(ParseError::Malformed(snippet(input[used..].trim_start()))),
        },
        ReadOutcome::Incomplete | ReadOutcome::End => Err(ParseError::UnexpectedEof),
    }
}

/// Parses every expression in the input, as a script file holds them.
pub fn parse_all(input: &str) -> Result<Vec<Value>, ParseError> {
    let mut expressions = Vec::new();
    let mut rest = input;
    loop {
        match read_expr(rest)? {
            ReadOutcome::Expr(expr, used) => {
                expressions.push(expr);
                rest = &rest[used..];
            }
            ReadOutcome::End => return Ok(expressions),
            ReadOutcome::Incomplete => return Err(ParseError::UnexpectedEof),
        }
    }
}
