// ABOUTME: Mixed-precision numeric tower over i32, BigInt, and f64

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::fmt;

/// A Scheme number, always held in the smallest representation that fits.
///
/// Integer arithmetic widens before it computes (i64 for the bounded tier,
/// `BigInt` above that) and narrows the result back down, so `Int` values
/// never wrap and a `Big` never holds a value that fits in an i32. Floats
/// are contagious: any operation touching one yields a float.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i32),
    Big(BigInt),
    Float(f64),
}

/// Narrows an i64 intermediate to `Int` when it fits the bounded range.
fn from_i64(n: i64) -> Number {
    match i32::try_from(n) {
        Ok(small) => Number::Int(small),
        Err(_) => Number::Big(BigInt::from(n)),
    }
}

/// Demotes a `BigInt` result to `Int` when it fits the bounded range.
fn from_big(n: BigInt) -> Number {
    match n.to_i32() {
        Some(small) => Number::Int(small),
        None => Number::Big(n),
    }
}

impl Number {
    /// Parses a numeric token: bounded integer, then big integer, then
    /// float. Returns `None` for anything that is not a number, including
    /// bare signs and alphabetic floats like `inf`, which must stay symbols.
    pub fn parse(text: &str) -> Option<Number> {
        let body = text.strip_prefix(['+', '-']).unwrap_or(text);
        if !body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return None;
        }
        if let Ok(small) = text.parse::<i32>() {
            return Some(Number::Int(small));
        }
        if let Ok(big) = text.parse::<BigInt>() {
            return Some(from_big(big));
        }
        text.parse::<f64>().ok().map(Number::Float)
    }

    fn to_f64(&self) -> f64 {
        match self {
            Number::Int(n) => f64::from(*n),
            Number::Big(n) => n.to_f64().unwrap_or(f64::NAN),
            Number::Float(x) => *x,
        }
    }

    fn to_big(&self) -> BigInt {
        match self {
            Number::Int(n) => BigInt::from(*n),
            Number::Big(n) => n.clone(),
            Number::Float(x) => BigInt::from(*x as i64),
        }
    }

    pub fn add(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Float(_), _) | (_, Number::Float(_)) => {
                Number::Float(self.to_f64() + other.to_f64())
            }
            (Number::Int(a), Number::Int(b)) => from_i64(i64::from(*a) + i64::from(*b)),
            _ => from_big(self.to_big() + other.to_big()),
        }
    }

    pub fn sub(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Float(_), _) | (_, Number::Float(_)) => {
                Number::Float(self.to_f64() - other.to_f64())
            }
            (Number::Int(a), Number::Int(b)) => from_i64(i64::from(*a) - i64::from(*b)),
            _ => from_big(self.to_big() - other.to_big()),
        }
    }

    pub fn mul(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Float(_), _) | (_, Number::Float(_)) => {
                Number::Float(self.to_f64() * other.to_f64())
            }
            (Number::Int(a), Number::Int(b)) => from_i64(i64::from(*a) * i64::from(*b)),
            _ => from_big(self.to_big() * other.to_big()),
        }
    }

    /// Three-way comparison with the same promotion rules as the
    /// arithmetic: mixing a float with an exact integer compares through
    /// f64, accepting the precision loss.
    pub fn compare(&self, other: &Number) -> Ordering {
        match (self, other) {
            (Number::Float(_), _) | (_, Number::Float(_)) => {
                self.to_f64().total_cmp(&other.to_f64())
            }
            (Number::Int(a), Number::Int(b)) => a.cmp(b),
            _ => self.to_big().cmp(&other.to_big()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Big(n) => write!(f, "{}", n),
            Number::Float(x) => {
                // An integral float keeps its ".0" so it round-trips as a float
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
        }
    }
}
