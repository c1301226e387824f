//! Formula evaluator
//!
//! Walks an AST against a table snapshot and produces a `Value`. Nothing
//! here fails: every problem becomes an in-band `Value::Error` and the first
//! error encountered (left to right, depth first) is the result.

use super::functions;
use super::parser::{BinaryOperator, Expr, UnaryOperator};
use crate::core::reference::{RangeAddress, Resolver};
use crate::types::Table;
use crate::value::{ErrorKind, Value};

/// Evaluation context: the table being read and the row being written
pub struct EvalContext<'a> {
    resolver: Resolver<'a>,
    target_row: Option<usize>,
}

impl<'a> EvalContext<'a> {
    /// `target_row` is the zero-based row the result is destined for, if any
    pub fn new(table: &'a Table, target_row: Option<usize>) -> Self {
        Self {
            resolver: Resolver::new(table),
            target_row,
        }
    }

    pub fn target_row(&self) -> Option<usize> {
        self.target_row
    }

    pub fn resolver(&self) -> &Resolver<'a> {
        &self.resolver
    }

    /// Value of a single cell; bad or out-of-bounds addresses are `#REF!`
    fn cell(&self, text: &str) -> Value {
        match self.resolver.resolve_cell(text) {
            Ok(address) => self.resolver.value(&address),
            Err(_) => Value::Error(ErrorKind::InvalidRef),
        }
    }

    /// Resolve `start:end`
    pub fn range(&self, start: &str, end: &str) -> Result<RangeAddress, ErrorKind> {
        self.resolver
            .resolve_range(&format!("{}:{}", start, end))
            .map_err(|_| ErrorKind::InvalidRef)
    }
}

/// Evaluate an expression in scalar position
pub fn evaluate(expr: &Expr, ctx: &EvalContext) -> Value {
    match expr {
        Expr::Number(n) => Value::Number(*n),

        Expr::Text(s) => Value::Text(s.clone()),

        Expr::Boolean(b) => Value::Boolean(*b),

        Expr::CellRef(text) => ctx.cell(text),

        // A range in scalar position reads its top-left cell
        Expr::RangeRef(start, end) => match ctx.range(start, end) {
            Ok(range) => ctx.resolver().value(&range.start),
            Err(kind) => Value::Error(kind),
        },

        Expr::BinaryOp { op, left, right } => {
            let left_val = evaluate(left, ctx);
            if left_val.is_error() {
                return left_val;
            }
            let right_val = evaluate(right, ctx);
            evaluate_binary_op(*op, &left_val, &right_val)
        }

        Expr::UnaryOp { op, operand } => {
            let val = evaluate(operand, ctx);
            evaluate_unary_op(*op, &val)
        }

        Expr::FunctionCall { name, args } => functions::call(name, args, ctx),
    }
}

/// Evaluate an argument a function consumes as a range.
///
/// Ranges expand to their cells (row-major) and a cell reference is a
/// one-cell range; any other expression yields its single scalar value.
/// Error cells are returned for the function to judge, but a computed
/// argument that is an Error fails the call.
pub fn evaluate_range_arg(expr: &Expr, ctx: &EvalContext) -> Result<Vec<Value>, ErrorKind> {
    match expr {
        Expr::RangeRef(start, end) => {
            let range = ctx.range(start, end)?;
            Ok(ctx.resolver().range_values(&range))
        }
        Expr::CellRef(text) => {
            let address = ctx
                .resolver()
                .resolve_cell(text)
                .map_err(|_| ErrorKind::InvalidRef)?;
            Ok(vec![ctx.resolver().value(&address)])
        }
        other => match evaluate(other, ctx) {
            Value::Error(kind) => Err(kind),
            value => Ok(vec![value]),
        },
    }
}

/// Like [`evaluate_range_arg`], keeping the row structure
pub fn evaluate_range_rows(expr: &Expr, ctx: &EvalContext) -> Result<Vec<Vec<Value>>, ErrorKind> {
    match expr {
        Expr::RangeRef(start, end) => {
            let range = ctx.range(start, end)?;
            Ok(ctx.resolver().range_rows(&range))
        }
        other => match evaluate(other, ctx) {
            Value::Error(kind) => Err(kind),
            value => Ok(vec![vec![value]]),
        },
    }
}

/// Apply a binary operator to two evaluated operands
pub fn evaluate_binary_op(op: BinaryOperator, left: &Value, right: &Value) -> Value {
    if let Value::Error(kind) = left {
        return Value::Error(*kind);
    }
    if let Value::Error(kind) = right {
        return Value::Error(*kind);
    }

    match op {
        BinaryOperator::Compare(cmp) => left.compare(cmp, right),

        // Missing counts as zero
        BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Multiply => {
            let (a, b) = match (left.arithmetic_operand(), right.arithmetic_operand()) {
                (Ok(a), Ok(b)) => (a, b),
                (Err(kind), _) | (_, Err(kind)) => return Value::Error(kind),
            };
            let result = match op {
                BinaryOperator::Add => a + b,
                BinaryOperator::Subtract => a - b,
                _ => a * b,
            };
            finite(result)
        }

        BinaryOperator::Divide => match (left, right) {
            (Value::Number(_), Value::Number(b)) if *b == 0.0 => {
                Value::Error(ErrorKind::DivByZero)
            }
            (Value::Number(a), Value::Number(b)) => finite(a / b),
            _ => Value::Error(ErrorKind::TypeMismatch),
        },

        BinaryOperator::Power => match (left, right) {
            (Value::Number(a), Value::Number(b)) if *a == 0.0 && *b < 0.0 => {
                Value::Error(ErrorKind::DivByZero)
            }
            (Value::Number(a), Value::Number(b)) => finite(a.powf(*b)),
            _ => Value::Error(ErrorKind::TypeMismatch),
        },
    }
}

/// Apply a unary operator; Missing counts as zero
pub fn evaluate_unary_op(op: UnaryOperator, val: &Value) -> Value {
    match val.arithmetic_operand() {
        Ok(n) => match op {
            UnaryOperator::Negate => Value::Number(-n),
            UnaryOperator::Plus => Value::Number(n),
        },
        Err(kind) => Value::Error(kind),
    }
}

/// NaN or infinite results have no cell representation
pub fn finite(n: f64) -> Value {
    if n.is_finite() {
        Value::Number(n)
    } else {
        Value::Error(ErrorKind::TypeMismatch)
    }
}
