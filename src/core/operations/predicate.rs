//! Filter predicates: `column op literal`

use crate::error::{CellforgeError, CellforgeResult};
use crate::types::{ColumnType, Table};
use crate::value::{parse_finite, CompareOp, Value};
use regex::Regex;
use std::sync::OnceLock;

fn pattern() -> CellforgeResult<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\s*(.+?)\s*(>=|<=|<>|!=|==|=|>|<)\s*(.*?)\s*$"))
        .as_ref()
        .map_err(|e| CellforgeError::InvalidArgument(format!("Regex error: {}", e)))
}

/// Read unquoted literal text as a value for a column of `column_type`.
///
/// Empty text is Missing. A Number column reads a number, a Boolean column
/// reads TRUE/FALSE, a Text column keeps the raw text and a Mixed column
/// infers. Text that does not fit the column stays Text.
pub fn literal_for(column_type: ColumnType, literal: &str) -> Value {
    if literal.is_empty() {
        return Value::Missing;
    }
    match column_type {
        ColumnType::Number => match parse_finite(literal) {
            Some(n) => Value::Number(n),
            None => Value::Text(literal.to_string()),
        },
        ColumnType::Boolean => match Value::infer(literal) {
            b @ Value::Boolean(_) => b,
            _ => Value::Text(literal.to_string()),
        },
        ColumnType::Text => Value::Text(literal.to_string()),
        ColumnType::Mixed => Value::infer(literal),
    }
}

/// A parsed `column op literal` filter
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: CompareOp,
    /// Literal text as written; quoted literals have their quotes removed
    pub literal: String,
    pub quoted: bool,
}

impl Predicate {
    /// Parse `Amount > 1000`, `Region = "North"`, `Name <> 'x'`.
    ///
    /// `!=` is accepted for `<>` and `==` for `=`.
    pub fn parse(text: &str) -> CellforgeResult<Self> {
        let caps = pattern()?.captures(text).ok_or_else(|| {
            CellforgeError::InvalidArgument(format!(
                "expected 'column op value' in '{}'",
                text
            ))
        })?;

        let column = caps[1].to_string();
        let op = CompareOp::from_symbol(&caps[2]).ok_or_else(|| {
            CellforgeError::InvalidArgument(format!("unknown operator '{}'", &caps[2]))
        })?;
        let raw = &caps[3];

        let (literal, quoted) = match unquote(raw) {
            Some(inner) => (inner.to_string(), true),
            None => (raw.to_string(), false),
        };

        Ok(Self {
            column,
            op,
            literal,
            quoted,
        })
    }

    /// Type the literal after the column it is compared against. Quoted
    /// literals are always Text; see [`literal_for`] for the rest.
    pub fn typed_literal(&self, column_type: ColumnType) -> Value {
        if self.quoted {
            return Value::Text(self.literal.clone());
        }
        literal_for(column_type, &self.literal)
    }

    /// Zero-based indices of the rows the predicate keeps
    pub fn matching_rows(&self, table: &Table) -> CellforgeResult<Vec<usize>> {
        let index = table.require_column(&self.column)?;
        let column = &table.columns()[index];
        let literal = self.typed_literal(column.column_type());

        Ok(column
            .values()
            .iter()
            .enumerate()
            .filter(|(_, v)| v.compare(self.op, &literal) == Value::Boolean(true))
            .map(|(i, _)| i)
            .collect())
    }
}

fn unquote(raw: &str) -> Option<&str> {
    ['"', '\''].iter().find_map(|&q| {
        raw.strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })
}
