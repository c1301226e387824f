//! Function registry
//!
//! A closed catalog: each `Function` has a case-insensitive name, an arity
//! contract and a flag per argument saying whether it consumes a whole
//! range. Adding a function means adding a variant and a table entry.

use super::evaluator::{evaluate, evaluate_range_arg, evaluate_range_rows, finite, EvalContext};
use super::parser::Expr;
use crate::core::reference::CellAddress;
use crate::value::{parse_finite, CompareOp, ErrorKind, Value};

/// Built-in functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sum,
    Average,
    Count,
    CountA,
    Min,
    Max,
    If,
    Round,
    Abs,
    Len,
    Concat,
    And,
    Or,
    Not,
    SumIf,
    CountIf,
    VLookup,
    Row,
}

/// Accepted argument counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Between(min, max) => (min..=max).contains(&count),
            Arity::AtLeast(min) => count >= min,
        }
    }
}

const REGISTRY: &[(&str, Function)] = &[
    ("SUM", Function::Sum),
    ("AVERAGE", Function::Average),
    ("COUNT", Function::Count),
    ("COUNTA", Function::CountA),
    ("MIN", Function::Min),
    ("MAX", Function::Max),
    ("IF", Function::If),
    ("ROUND", Function::Round),
    ("ABS", Function::Abs),
    ("LEN", Function::Len),
    ("CONCAT", Function::Concat),
    ("CONCATENATE", Function::Concat),
    ("AND", Function::And),
    ("OR", Function::Or),
    ("NOT", Function::Not),
    ("SUMIF", Function::SumIf),
    ("COUNTIF", Function::CountIf),
    ("VLOOKUP", Function::VLookup),
    ("ROW", Function::Row),
];

impl Function {
    /// Case-insensitive lookup
    pub fn lookup(name: &str) -> Option<Function> {
        REGISTRY
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, f)| *f)
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(_, f)| f == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    pub fn arity(&self) -> Arity {
        match self {
            Function::Sum
            | Function::Average
            | Function::Count
            | Function::CountA
            | Function::Min
            | Function::Max
            | Function::Concat
            | Function::And
            | Function::Or => Arity::AtLeast(1),
            Function::If => Arity::Between(2, 3),
            Function::Round => Arity::Between(1, 2),
            Function::Abs | Function::Len | Function::Not => Arity::Exact(1),
            Function::SumIf => Arity::Between(2, 3),
            Function::CountIf => Arity::Exact(2),
            Function::VLookup => Arity::Between(3, 4),
            Function::Row => Arity::Between(0, 1),
        }
    }

    /// Whether argument `index` is read as a whole range rather than
    /// reduced to its top-left cell
    pub fn consumes_range(&self, index: usize) -> bool {
        match self {
            Function::Sum
            | Function::Average
            | Function::Count
            | Function::CountA
            | Function::Min
            | Function::Max
            | Function::And
            | Function::Or => true,
            Function::SumIf => index == 0 || index == 2,
            Function::CountIf => index == 0,
            Function::VLookup => index == 1,
            Function::Row => index == 0,
            _ => false,
        }
    }

    /// The reduction behind an aggregate function
    pub fn aggregate(&self) -> Option<Aggregate> {
        match self {
            Function::Sum => Some(Aggregate::Sum),
            Function::Average => Some(Aggregate::Average),
            Function::Count => Some(Aggregate::Count),
            Function::CountA => Some(Aggregate::CountA),
            Function::Min => Some(Aggregate::Min),
            Function::Max => Some(Aggregate::Max),
            _ => None,
        }
    }
}

//==============================================================================
// Reductions (shared with groupby)
//==============================================================================

/// Reductions over a list of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Average,
    Count,
    CountA,
    Min,
    Max,
}

impl Aggregate {
    /// Parse a groupby aggregation name: sum, avg/mean/average, count,
    /// counta, min, max
    pub fn from_name(name: &str) -> Option<Aggregate> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sum" => Some(Aggregate::Sum),
            "avg" | "mean" | "average" => Some(Aggregate::Average),
            "count" => Some(Aggregate::Count),
            "counta" => Some(Aggregate::CountA),
            "min" => Some(Aggregate::Min),
            "max" => Some(Aggregate::Max),
            _ => None,
        }
    }

    /// Short name used in groupby output columns
    pub fn name(&self) -> &'static str {
        match self {
            Aggregate::Sum => "sum",
            Aggregate::Average => "avg",
            Aggregate::Count => "count",
            Aggregate::CountA => "counta",
            Aggregate::Min => "min",
            Aggregate::Max => "max",
        }
    }
}

/// Reduce cells the way the matching formula function does.
///
/// Only Number cells take part; Text, Boolean and Missing are skipped. For
/// SUM, AVERAGE, MIN and MAX the first Error cell is the result, and a sum
/// that overflows is `#VALUE!`.
pub fn reduce(aggregate: Aggregate, values: &[Value]) -> Value {
    match aggregate {
        Aggregate::Count => {
            Value::Number(values.iter().filter(|v| v.as_number().is_some()).count() as f64)
        }
        Aggregate::CountA => {
            Value::Number(values.iter().filter(|v| !v.is_missing()).count() as f64)
        }
        _ => {
            let numbers = match numeric_cells(values) {
                Ok(numbers) => numbers,
                Err(kind) => return Value::Error(kind),
            };
            match aggregate {
                Aggregate::Sum => finite(numbers.iter().sum()),
                Aggregate::Average => {
                    if numbers.is_empty() {
                        Value::Error(ErrorKind::DivByZero)
                    } else {
                        finite(numbers.iter().sum::<f64>() / numbers.len() as f64)
                    }
                }
                Aggregate::Min => numbers
                    .iter()
                    .copied()
                    .reduce(f64::min)
                    .map(Value::Number)
                    .unwrap_or(Value::Error(ErrorKind::InvalidRef)),
                _ => numbers
                    .iter()
                    .copied()
                    .reduce(f64::max)
                    .map(Value::Number)
                    .unwrap_or(Value::Error(ErrorKind::InvalidRef)),
            }
        }
    }
}

/// Number cells of a list, stopping at the first Error
fn numeric_cells(values: &[Value]) -> Result<Vec<f64>, ErrorKind> {
    let mut numbers = Vec::new();
    for value in values {
        match value {
            Value::Number(n) => numbers.push(*n),
            Value::Error(kind) => return Err(*kind),
            _ => {}
        }
    }
    Ok(numbers)
}

//==============================================================================
// Dispatch
//==============================================================================

/// Evaluate a function call
pub fn call(name: &str, args: &[Expr], ctx: &EvalContext) -> Value {
    let function = match Function::lookup(name) {
        Some(f) => f,
        None => return Value::Error(ErrorKind::UnknownFunction),
    };
    if !function.arity().accepts(args.len()) {
        return Value::Error(ErrorKind::ParseError);
    }

    let result = match function {
        Function::If => return evaluate_if(args, ctx),
        Function::Row => evaluate_row(args, ctx),
        f => match f.aggregate() {
            Some(aggregate) => collect_range_args(f, args, ctx).map(|v| reduce(aggregate, &v)),
            None => evaluate_scalar_function(f, args, ctx),
        },
    };

    result.unwrap_or_else(Value::Error)
}

/// Evaluate range-consuming arguments left to right into one list
fn collect_range_args(
    function: Function,
    args: &[Expr],
    ctx: &EvalContext,
) -> Result<Vec<Value>, ErrorKind> {
    let mut values = Vec::new();
    for (index, arg) in args.iter().enumerate() {
        if function.consumes_range(index) {
            values.extend(evaluate_range_arg(arg, ctx)?);
        } else {
            values.push(evaluate(arg, ctx));
        }
    }
    Ok(values)
}

/// Evaluate a required scalar argument, short-circuiting on Error
fn scalar_arg(arg: &Expr, ctx: &EvalContext) -> Result<Value, ErrorKind> {
    match evaluate(arg, ctx) {
        Value::Error(kind) => Err(kind),
        value => Ok(value),
    }
}

/// A numeric argument; Missing reads as zero
fn number_arg(arg: &Expr, ctx: &EvalContext) -> Result<f64, ErrorKind> {
    scalar_arg(arg, ctx)?.arithmetic_operand()
}

fn evaluate_if(args: &[Expr], ctx: &EvalContext) -> Value {
    match evaluate(&args[0], ctx) {
        Value::Boolean(true) => evaluate(&args[1], ctx),
        Value::Boolean(false) => match args.get(2) {
            Some(else_branch) => evaluate(else_branch, ctx),
            None => Value::Boolean(false),
        },
        Value::Error(kind) => Value::Error(kind),
        _ => Value::Error(ErrorKind::TypeMismatch),
    }
}

/// ROW() is the row being written; ROW(ref) is the row of `ref`
fn evaluate_row(args: &[Expr], ctx: &EvalContext) -> Result<Value, ErrorKind> {
    let row = match args.first() {
        None => ctx.target_row().ok_or(ErrorKind::InvalidRef)?,
        Some(Expr::CellRef(text)) | Some(Expr::RangeRef(text, _)) => {
            CellAddress::parse(text)
                .map_err(|_| ErrorKind::InvalidRef)?
                .row
        }
        Some(_) => return Err(ErrorKind::TypeMismatch),
    };
    Ok(Value::Number((row + 1) as f64))
}

fn evaluate_scalar_function(
    function: Function,
    args: &[Expr],
    ctx: &EvalContext,
) -> Result<Value, ErrorKind> {
    match function {
        Function::Round => {
            let x = number_arg(&args[0], ctx)?;
            let digits = match args.get(1) {
                Some(arg) => number_arg(arg, ctx)?.trunc() as i32,
                None => 0,
            };
            let rounded = if digits >= 0 {
                let factor = 10f64.powi(digits);
                (x * factor).round() / factor
            } else {
                let factor = 10f64.powi(digits.saturating_neg());
                if factor.is_infinite() {
                    0.0
                } else {
                    (x / factor).round() * factor
                }
            };
            Ok(finite(rounded))
        }

        Function::Abs => Ok(Value::Number(number_arg(&args[0], ctx)?.abs())),

        Function::Len => {
            let text = scalar_arg(&args[0], ctx)?.as_text();
            Ok(Value::Number(text.chars().count() as f64))
        }

        Function::Concat => {
            let mut out = String::new();
            for arg in args {
                out.push_str(&scalar_arg(arg, ctx)?.as_text());
            }
            Ok(Value::Text(out))
        }

        Function::And | Function::Or => {
            let values = collect_range_args(function, args, ctx)?;
            let mut flags = Vec::new();
            for value in values {
                match value {
                    Value::Boolean(b) => flags.push(b),
                    Value::Number(n) => flags.push(n != 0.0),
                    Value::Error(kind) => return Err(kind),
                    Value::Text(_) | Value::Missing => {}
                }
            }
            if flags.is_empty() {
                return Err(ErrorKind::TypeMismatch);
            }
            Ok(Value::Boolean(if function == Function::And {
                flags.iter().all(|b| *b)
            } else {
                flags.iter().any(|b| *b)
            }))
        }

        Function::Not => match scalar_arg(&args[0], ctx)? {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            Value::Number(n) => Ok(Value::Boolean(n == 0.0)),
            _ => Err(ErrorKind::TypeMismatch),
        },

        Function::SumIf | Function::CountIf => {
            let range = evaluate_range_arg(&args[0], ctx)?;
            let criteria = Criteria::parse(&scalar_arg(&args[1], ctx)?);
            let matched: Vec<usize> = range
                .iter()
                .enumerate()
                .filter(|(_, cell)| criteria.matches(cell))
                .map(|(i, _)| i)
                .collect();

            if function == Function::CountIf {
                return Ok(Value::Number(matched.len() as f64));
            }

            let sum_cells = match args.get(2) {
                Some(arg) => evaluate_range_arg(arg, ctx)?,
                None => range,
            };
            let selected: Vec<Value> = matched
                .iter()
                .map(|&i| sum_cells.get(i).cloned().unwrap_or(Value::Missing))
                .collect();
            Ok(reduce(Aggregate::Sum, &selected))
        }

        Function::VLookup => {
            let needle = scalar_arg(&args[0], ctx)?;
            let rows = evaluate_range_rows(&args[1], ctx)?;
            let index = number_arg(&args[2], ctx)?.trunc();
            if index < 1.0 {
                return Err(ErrorKind::TypeMismatch);
            }
            let column = index as usize - 1;
            let approximate = match args.get(3) {
                Some(arg) => match scalar_arg(arg, ctx)? {
                    Value::Boolean(b) => b,
                    Value::Number(n) => n != 0.0,
                    _ => return Err(ErrorKind::TypeMismatch),
                },
                None => false,
            };
            let key_holds = |row: &&Vec<Value>, op: CompareOp| {
                row.first()
                    .map(|key| key.compare(op, &needle) == Value::Boolean(true))
                    .unwrap_or(false)
            };

            let row = if approximate {
                // first column sorted ascending: last key not above the needle
                rows.iter()
                    .take_while(|row| !key_holds(row, CompareOp::Gt))
                    .filter(|row| key_holds(row, CompareOp::Le))
                    .last()
            } else {
                rows.iter().find(|row| key_holds(row, CompareOp::Eq))
            }
            .ok_or(ErrorKind::InvalidRef)?;
            row.get(column).cloned().ok_or(ErrorKind::InvalidRef)
        }

        // aggregates, IF and ROW are dispatched in `call`
        _ => Err(ErrorKind::ParseError),
    }
}

/// SUMIF/COUNTIF criteria: `">100"`, `"<>x"`, `"=5"` or a bare value
struct Criteria {
    op: CompareOp,
    value: Value,
}

impl Criteria {
    fn parse(criteria: &Value) -> Criteria {
        let text = match criteria {
            Value::Text(text) => text,
            other => {
                return Criteria {
                    op: CompareOp::Eq,
                    value: other.clone(),
                }
            }
        };

        for symbol in ["<=", ">=", "<>", "<", ">", "="] {
            if let Some(rest) = text.strip_prefix(symbol) {
                let value = match parse_finite(rest.trim()) {
                    Some(n) => Value::Number(n),
                    None if rest.is_empty() => Value::Missing,
                    None => Value::Text(rest.to_string()),
                };
                if let Some(op) = CompareOp::from_symbol(symbol) {
                    return Criteria { op, value };
                }
            }
        }

        Criteria {
            op: CompareOp::Eq,
            value: match parse_finite(text.trim()) {
                Some(n) => Value::Number(n),
                None => Value::Text(text.clone()),
            },
        }
    }

    /// Blank cells only match a blank criterion
    fn matches(&self, cell: &Value) -> bool {
        if cell.is_missing() && !self.value.is_missing() {
            return false;
        }
        cell.compare(self.op, &self.value) == Value::Boolean(true)
    }
}
