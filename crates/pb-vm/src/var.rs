//! Runtime values.
//!
//! The data model only distinguishes `NUMERIC` from `STRING`; `Number`
//! itself is an implementation detail that lets integer arithmetic stay
//! exact until a float enters the computation; section 3's "a `Var` is
//! `{type, value}`" is `Var`'s two outer variants, not `Number`'s two.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i32),
    Float(f32),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f as f64,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Var {
    Numeric(Number),
    Str(String),
}

impl Var {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Var::Numeric(_))
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Var::Numeric(n) => Some(*n),
            Var::Str(_) => None,
        }
    }

    /// `EQUAL` semantics: both sides must share a `type`, and within
    /// `NUMERIC` the comparison is by value, not by `Int`/`Float` tag.
    pub fn vm_eq(&self, other: &Var) -> bool {
        match (self, other) {
            (Var::Numeric(a), Var::Numeric(b)) => a.as_f64() == b.as_f64(),
            (Var::Str(a), Var::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Var::Numeric(n) => write!(f, "{n}"),
            Var::Str(s) => write!(f, "{s}"),
        }
    }
}
