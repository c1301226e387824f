//! Table operations
//!
//! Every operation is a pure function from a `Table` to a new `Table`
//! (`describe` yields a `Report`). `Operation` names one step with its
//! parameters and `Pipeline` chains steps.

pub mod clean;
pub mod describe;
pub mod distinct;
pub mod groupby;
pub mod predicate;
pub mod rows;
pub mod shape;

pub use clean::{dropna, fillna, replace};
pub use describe::{describe, ColumnStats, Report};
pub use distinct::{unique, value_counts};
pub use groupby::{groupby, AggSpec};
pub use predicate::Predicate;
pub use rows::{dedupe, filter, head, sort, tail};
pub use shape::{drop_columns, rename, select, slice, transpose};

use crate::error::CellforgeResult;
use crate::types::Table;
use tracing::debug;

/// One table-to-table step
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Sort { column: String, descending: bool },
    Filter(Predicate),
    Dedupe,
    Transpose,
    Select(Vec<String>),
    Head(usize),
    Tail(usize),
    GroupBy { by: Vec<String>, aggs: Vec<AggSpec> },
    Slice(String),
    /// Evaluate a formula into a cell
    Formula { formula: String, cell: String },
    /// Fill Missing cells; no columns means every column
    FillNa { value: String, columns: Vec<String> },
    /// Drop rows with Missing cells; no columns means every column
    DropNa { columns: Vec<String> },
    /// `(old, new)` column name pairs
    Rename(Vec<(String, String)>),
    Drop(Vec<String>),
    Replace {
        find: String,
        with: String,
        column: Option<String>,
    },
    ValueCounts(String),
    Unique(String),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Sort { .. } => "sort",
            Operation::Filter(_) => "filter",
            Operation::Dedupe => "dedupe",
            Operation::Transpose => "transpose",
            Operation::Select(_) => "select",
            Operation::Head(_) => "head",
            Operation::Tail(_) => "tail",
            Operation::GroupBy { .. } => "groupby",
            Operation::Slice(_) => "slice",
            Operation::Formula { .. } => "formula",
            Operation::FillNa { .. } => "fillna",
            Operation::DropNa { .. } => "dropna",
            Operation::Rename(_) => "rename",
            Operation::Drop(_) => "drop",
            Operation::Replace { .. } => "replace",
            Operation::ValueCounts(_) => "value_counts",
            Operation::Unique(_) => "unique",
        }
    }

    pub fn apply(&self, table: &Table) -> CellforgeResult<Table> {
        match self {
            Operation::Sort { column, descending } => sort(table, column, *descending),
            Operation::Filter(predicate) => filter(table, predicate),
            Operation::Dedupe => Ok(dedupe(table)),
            Operation::Transpose => transpose(table),
            Operation::Select(columns) => select(table, columns),
            Operation::Head(n) => Ok(head(table, *n)),
            Operation::Tail(n) => Ok(tail(table, *n)),
            Operation::GroupBy { by, aggs } => groupby(table, by, aggs),
            Operation::Slice(range) => slice(table, range),
            Operation::Formula { formula, cell } => {
                crate::core::formula::apply_formula(formula, table, cell)
            }
            Operation::FillNa { value, columns } => fillna(table, value, columns),
            Operation::DropNa { columns } => dropna(table, columns),
            Operation::Rename(renames) => rename(table, renames),
            Operation::Drop(columns) => drop_columns(table, columns),
            Operation::Replace { find, with, column } => {
                replace(table, find, with, column.as_deref())
            }
            Operation::ValueCounts(column) => value_counts(table, column),
            Operation::Unique(column) => unique(table, column),
        }
    }
}

/// An ordered list of operations applied to one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    steps: Vec<Operation>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn then(mut self, operation: Operation) -> Self {
        self.steps.push(operation);
        self
    }

    pub fn steps(&self) -> &[Operation] {
        &self.steps
    }

    /// Run every step in order; the first failure aborts the run
    pub fn run(&self, table: &Table) -> CellforgeResult<Table> {
        let mut current = table.clone();
        for step in &self.steps {
            current = step.apply(&current)?;
            debug!(
                step = step.name(),
                rows = current.row_count(),
                columns = current.column_count(),
                "pipeline step"
            );
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CellforgeError;
    use crate::types::Column;
    use crate::value::Value;

    fn sales() -> Table {
        Table::new(vec![
            Column::new(
                "Category",
                vec![
                    Value::from("A"),
                    Value::from("B"),
                    Value::from("A"),
                    Value::from("B"),
                ],
            ),
            Column::new(
                "Amount",
                vec![
                    Value::Number(500.0),
                    Value::Number(1500.0),
                    Value::Number(800.0),
                    Value::Number(2000.0),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_pipeline_chains_steps() {
        let pipeline = Pipeline::new()
            .then(Operation::Filter(Predicate::parse("Amount > 600").unwrap()))
            .then(Operation::Sort {
                column: "Amount".to_string(),
                descending: true,
            })
            .then(Operation::Head(2));

        let result = pipeline.run(&sales()).unwrap();
        assert_eq!(
            result.column("Amount").unwrap().values(),
            &[Value::Number(2000.0), Value::Number(1500.0)]
        );
        assert_eq!(pipeline.steps().len(), 3);
    }

    #[test]
    fn test_pipeline_stops_at_first_failure() {
        let pipeline = Pipeline::new()
            .then(Operation::Select(vec!["Missing".to_string()]))
            .then(Operation::Dedupe);
        assert!(matches!(
            pipeline.run(&sales()),
            Err(CellforgeError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_formula_step() {
        let pipeline = Pipeline::new().then(Operation::Formula {
            formula: "=SUM(B1:B4)".to_string(),
            cell: "C1".to_string(),
        });
        let result = pipeline.run(&sales()).unwrap();
        assert_eq!(result.cell(0, 2), Some(&Value::Number(4800.0)));
    }

    #[test]
    fn test_cleaning_steps_chain() {
        let pipeline = Pipeline::new()
            .then(Operation::Replace {
                find: "B".to_string(),
                with: "Beta".to_string(),
                column: Some("Category".to_string()),
            })
            .then(Operation::Rename(vec![(
                "Category".to_string(),
                "Group".to_string(),
            )]))
            .then(Operation::ValueCounts("Group".to_string()));
        let result = pipeline.run(&sales()).unwrap();
        assert_eq!(result.column_names(), vec!["Group", "count"]);
        assert_eq!(result.row(0), vec![Value::from("A"), Value::Number(2.0)]);
        assert_eq!(result.row(1), vec![Value::from("Beta"), Value::Number(2.0)]);
        assert_eq!(Operation::Drop(vec![]).name(), "drop");
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        assert_eq!(Pipeline::new().run(&sales()).unwrap(), sales());
    }
}
