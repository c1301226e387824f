//! Cell values
//!
//! A `Value` is the scalar stored in every table cell and produced by every
//! formula. Formula failures are values too (`Value::Error`), so a bad cell
//! never aborts a whole evaluation.

use crate::types::ColumnType;
use std::cmp::Ordering;
use std::fmt;

/// Kinds of in-band formula errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    DivByZero,
    InvalidRef,
    TypeMismatch,
    UnknownFunction,
    ParseError,
}

impl ErrorKind {
    /// Spreadsheet notation for the error
    pub fn literal(&self) -> &'static str {
        match self {
            ErrorKind::DivByZero => "#DIV/0!",
            ErrorKind::InvalidRef => "#REF!",
            ErrorKind::TypeMismatch => "#VALUE!",
            ErrorKind::UnknownFunction => "#NAME?",
            ErrorKind::ParseError => "#PARSE!",
        }
    }

    /// Inverse of [`ErrorKind::literal`], case-insensitive
    pub fn from_literal(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "#DIV/0!" => Some(ErrorKind::DivByZero),
            "#REF!" => Some(ErrorKind::InvalidRef),
            "#VALUE!" => Some(ErrorKind::TypeMismatch),
            "#NAME?" => Some(ErrorKind::UnknownFunction),
            "#PARSE!" => Some(ErrorKind::ParseError),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A numeric value
    Number(f64),
    /// A text value
    Text(String),
    /// A boolean value
    Boolean(bool),
    /// Empty cell
    Missing,
    /// In-band formula error
    Error(ErrorKind),
}

/// Comparison operators shared by formulas and filter predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Parse an operator symbol. `!=` and `==` are accepted as aliases.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" | "==" => Some(CompareOp::Eq),
            "<>" | "!=" => Some(CompareOp::Ne),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// Hashable identity of a non-error value, used for grouping and dedupe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Number(u64),
    Text(String),
    Boolean(bool),
    Missing,
}

impl Value {
    /// Numeric payload, only for `Value::Number`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Column category of a present value; `None` for Missing and Error
    pub fn category(&self) -> Option<ColumnType> {
        match self {
            Value::Number(_) => Some(ColumnType::Number),
            Value::Text(_) => Some(ColumnType::Text),
            Value::Boolean(_) => Some(ColumnType::Boolean),
            Value::Missing | Value::Error(_) => None,
        }
    }

    /// Render the value the way a cell displays it
    pub fn as_text(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Value::Missing => String::new(),
            Value::Error(kind) => kind.literal().to_string(),
        }
    }

    /// Infer a value from untyped text (CSV fields, filter literals).
    ///
    /// Empty → Missing, `true`/`false` → Boolean, error literal → Error,
    /// finite number → Number, anything else → Text.
    pub fn infer(text: &str) -> Value {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Boolean(false);
        }
        if let Some(kind) = ErrorKind::from_literal(trimmed) {
            return Value::Error(kind);
        }
        match parse_finite(trimmed) {
            Some(n) => Value::Number(n),
            None => Value::Text(text.to_string()),
        }
    }

    /// Coerce an arithmetic operand: Missing counts as zero.
    pub fn arithmetic_operand(&self) -> Result<f64, ErrorKind> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Missing => Ok(0.0),
            Value::Error(kind) => Err(*kind),
            Value::Text(_) | Value::Boolean(_) => Err(ErrorKind::TypeMismatch),
        }
    }

    /// Compare two values, yielding a Boolean or an Error.
    ///
    /// Errors propagate (left operand first). Missing orders before every
    /// present value. Values of different categories are unequal, but
    /// ordering them is a type mismatch.
    pub fn compare(&self, op: CompareOp, other: &Value) -> Value {
        if let Value::Error(kind) = self {
            return Value::Error(*kind);
        }
        if let Value::Error(kind) = other {
            return Value::Error(*kind);
        }

        let ordering = match (self, other) {
            (Value::Missing, Value::Missing) => Some(Ordering::Equal),
            (Value::Missing, _) => Some(Ordering::Less),
            (_, Value::Missing) => Some(Ordering::Greater),
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            _ => {
                return match op {
                    CompareOp::Eq => Value::Boolean(false),
                    CompareOp::Ne => Value::Boolean(true),
                    _ => Value::Error(ErrorKind::TypeMismatch),
                };
            }
        };

        match ordering {
            Some(ordering) => Value::Boolean(op.holds(ordering)),
            None => Value::Error(ErrorKind::TypeMismatch),
        }
    }

    /// Total order used by sort: Missing < Number < Text < Boolean < Error,
    /// natural order within a category.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Error(a), Value::Error(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Missing => 0,
            Value::Number(_) => 1,
            Value::Text(_) => 2,
            Value::Boolean(_) => 3,
            Value::Error(_) => 4,
        }
    }

    /// Hash key for equality grouping; errors have no key.
    pub fn key(&self) -> Option<ValueKey> {
        match self {
            Value::Number(n) => {
                // -0.0 and 0.0 compare equal
                let n = if *n == 0.0 { 0.0 } else { *n };
                Some(ValueKey::Number(n.to_bits()))
            }
            Value::Text(s) => Some(ValueKey::Text(s.clone())),
            Value::Boolean(b) => Some(ValueKey::Boolean(*b)),
            Value::Missing => Some(ValueKey::Missing),
            Value::Error(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Format a number without trailing zeros (integers print without a point)
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parse a finite f64; rejects `inf`/`NaN` spellings that `str::parse` accepts
pub fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
