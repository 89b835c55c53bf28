use std::fmt;

use crate::function::Callable;

/// A runtime value. Operator semantics are exhaustive matches over this enum.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    Nil,
    Callable(Callable),
}

impl Value {
    /// `nil` and `false` are falsy; everything else, `0` and `""` included, is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

/// No cross-variant equality: `nil` only equals `nil`, `0` never equals `false`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Callable(a), Value::Callable(b)) => a.same_as(b),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => fmt_number(*n, f),

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),

            Value::Callable(c) => write!(f, "{}", c),
        }
    }
}

/// Integral numbers print without a fractional part (`3`, not `3.0`).
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n == 0.0 && n.is_sign_negative() {
        return write!(f, "-0");
    }

    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        let mut buf: itoa::Buffer = itoa::Buffer::new();
        return f.write_str(buf.format(n as i64));
    }

    write!(f, "{}", n)
}
