//! Tagged values handed to the printer

use std::fmt;

/// A value to be written by a [`CsvPrinter`](crate::CsvPrinter).
///
/// The quote decision under [`QuoteMode::NonNumeric`](crate::QuoteMode) is a
/// match over the variant tag, so callers state up front whether a value is
/// numeric instead of the printer guessing from its textual shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The null sentinel; rendered as the dialect's null string (or empty)
    Null,

    /// Text value
    String(String),

    /// Numeric value; never quoted under `NonNumeric`
    Number(f64),
}

impl Value {
    /// Check whether this is the null sentinel
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
