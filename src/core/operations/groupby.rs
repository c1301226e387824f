//! Group rows by key columns and aggregate

use crate::core::formula::{reduce, Aggregate};
use crate::error::{CellforgeError, CellforgeResult};
use crate::types::{unique_name, Column, Table};
use crate::value::{Value, ValueKey};
use std::collections::HashMap;

/// One `func:column` aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct AggSpec {
    pub aggregate: Aggregate,
    pub column: String,
}

impl AggSpec {
    /// Parse `sum:Amount`
    pub fn parse(text: &str) -> CellforgeResult<Self> {
        let (func, column) = text.split_once(':').ok_or_else(|| {
            CellforgeError::InvalidArgument(format!(
                "aggregation '{}' must look like func:column",
                text
            ))
        })?;
        let aggregate = Aggregate::from_name(func).ok_or_else(|| {
            CellforgeError::InvalidArgument(format!(
                "unknown aggregation '{}' (use sum, avg, count, counta, min, max)",
                func.trim()
            ))
        })?;
        Ok(Self {
            aggregate,
            column: column.trim().to_string(),
        })
    }

    /// Parse a comma-separated list
    pub fn parse_list(text: &str) -> CellforgeResult<Vec<Self>> {
        text.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    /// Output column name, e.g. `Amount_sum`
    pub fn output_name(&self) -> String {
        format!("{}_{}", self.column, self.aggregate.name())
    }
}

/// Partition rows by `by` and reduce each aggregation over every group.
///
/// Groups appear in first-seen order. Key equality is value equality; a
/// key containing an Error equals nothing, so such a row is its own group.
pub fn groupby(table: &Table, by: &[String], aggs: &[AggSpec]) -> CellforgeResult<Table> {
    if by.is_empty() {
        return Err(CellforgeError::InvalidArgument(
            "groupby needs at least one key column".to_string(),
        ));
    }

    let key_indices = by
        .iter()
        .map(|name| table.require_column(name))
        .collect::<CellforgeResult<Vec<_>>>()?;
    let agg_indices = aggs
        .iter()
        .map(|spec| table.require_column(&spec.column))
        .collect::<CellforgeResult<Vec<_>>>()?;

    // group order = first appearance
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut lookup: HashMap<Vec<ValueKey>, usize> = HashMap::new();
    for row in 0..table.row_count() {
        let key: Option<Vec<ValueKey>> = key_indices
            .iter()
            .map(|&c| table.cell(row, c).and_then(Value::key))
            .collect();
        match key {
            Some(key) => match lookup.get(&key) {
                Some(&g) => groups[g].push(row),
                None => {
                    lookup.insert(key, groups.len());
                    groups.push(vec![row]);
                }
            },
            None => groups.push(vec![row]),
        }
    }

    let mut columns = Vec::with_capacity(by.len() + aggs.len());
    for &c in &key_indices {
        let source = &table.columns()[c];
        let values = groups
            .iter()
            .map(|rows| source.get(rows[0]).cloned().unwrap_or(Value::Missing))
            .collect();
        columns.push(Column::new(source.name(), values));
    }

    for (spec, &c) in aggs.iter().zip(&agg_indices) {
        let source = &table.columns()[c];
        let values = groups
            .iter()
            .map(|rows| {
                let cells: Vec<Value> = rows
                    .iter()
                    .map(|&r| source.get(r).cloned().unwrap_or(Value::Missing))
                    .collect();
                reduce(spec.aggregate, &cells)
            })
            .collect();
        let existing: Vec<&str> = columns.iter().map(Column::name).collect();
        let name = unique_name(&spec.output_name(), &existing);
        columns.push(Column::new(name, values));
    }

    Table::new(columns)
}
