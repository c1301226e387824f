//! Formula engine
//!
//! Tokenizes, parses and evaluates spreadsheet formulas such as
//! `=IF(SUM(B1:B10) > 1000, "big", "small")` against a table snapshot.
//! Formulas are evaluated once; there is no dependency tracking between
//! cells.

pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod tokenizer;

pub use evaluator::EvalContext;
pub use functions::{reduce, Aggregate, Arity, Function};
pub use parser::{BinaryOperator, Expr, ParseError, UnaryOperator};
pub use tokenizer::{Token, TokenizeError};

use crate::core::reference::CellAddress;
use crate::error::{CellforgeError, CellforgeResult};
use crate::types::{Table, MAX_COLUMNS, MAX_ROWS};
use crate::value::{ErrorKind, Value};
use tracing::debug;

/// Parse formula text (leading `=` optional) into an AST
pub fn parse_formula(formula: &str) -> Result<Expr, ParseError> {
    let tokens =
        tokenizer::tokenize(formula).map_err(|e| ParseError::new(e.message, e.position))?;
    parser::parse(tokens)
}

/// Evaluate a formula against a table.
///
/// `target_row` is the zero-based row the result is meant for (read by
/// `ROW()`). Malformed formulas evaluate to `#PARSE!`.
pub fn evaluate_formula(formula: &str, table: &Table, target_row: Option<usize>) -> Value {
    let expr = match parse_formula(formula) {
        Ok(expr) => expr,
        Err(e) => {
            debug!(formula, error = %e, "formula did not parse");
            return Value::Error(ErrorKind::ParseError);
        }
    };
    let ctx = EvalContext::new(table, target_row);
    let value = evaluator::evaluate(&expr, &ctx);
    debug!(formula, ?target_row, result = %value, "evaluated formula");
    value
}

/// Evaluate a formula and write the result into `target_cell`, returning
/// the new table.
///
/// The target may lie past the table's edge; the table grows to fit, up to
/// the size of a worksheet. Fails when the target is not a cell address or
/// lies beyond that size, or when the formula does not parse. Evaluation
/// errors are written into the cell.
pub fn apply_formula(formula: &str, table: &Table, target_cell: &str) -> CellforgeResult<Table> {
    let target = CellAddress::parse(target_cell)?;
    // data rows sit below the header row
    if target.row >= MAX_ROWS - 1 || target.column >= MAX_COLUMNS {
        return Err(CellforgeError::Reference(format!(
            "'{}' lies outside a {} x {} worksheet",
            target_cell.trim(),
            MAX_ROWS,
            MAX_COLUMNS
        )));
    }
    let expr = parse_formula(formula)
        .map_err(|e| CellforgeError::Parse(format!("{} in '{}'", e, formula)))?;

    let ctx = EvalContext::new(table, Some(target.row));
    let value = evaluator::evaluate(&expr, &ctx);
    debug!(formula, cell = %target, result = %value, "applied formula");

    Ok(table.with_cell(target.row, target.column, value))
}
