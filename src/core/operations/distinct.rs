//! Distinct values of one column: value_counts, unique

use crate::error::CellforgeResult;
use crate::types::{unique_name, Column, Table};
use crate::value::{Value, ValueKey};
use std::collections::HashMap;

/// Distinct values of a column with their row counts, first-seen order.
/// Missing counts as a value; Error cells are skipped.
fn tally(table: &Table, column: &str) -> CellforgeResult<(String, Vec<(Value, usize)>)> {
    let index = table.require_column(column)?;
    let source = &table.columns()[index];

    let mut counts: Vec<(Value, usize)> = Vec::new();
    let mut lookup: HashMap<ValueKey, usize> = HashMap::new();
    for value in source.values() {
        let key = match value.key() {
            Some(key) => key,
            None => continue,
        };
        match lookup.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                lookup.insert(key, counts.len());
                counts.push((value.clone(), 1));
            }
        }
    }
    Ok((source.name().to_string(), counts))
}

/// Count how often each value occurs in `column`.
///
/// The result has the column itself and `count`, most frequent first; ties
/// keep first-seen order.
pub fn value_counts(table: &Table, column: &str) -> CellforgeResult<Table> {
    let (name, mut counts) = tally(table, column)?;
    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let count_name = unique_name("count", &[name.as_str()]);
    let (values, tallies): (Vec<Value>, Vec<Value>) = counts
        .into_iter()
        .map(|(value, n)| (value, Value::Number(n as f64)))
        .unzip();

    Table::new(vec![
        Column::new(name, values),
        Column::new(count_name, tallies),
    ])
}

/// The distinct values of `column` in first-seen order, as a one-column table
pub fn unique(table: &Table, column: &str) -> CellforgeResult<Table> {
    let (name, counts) = tally(table, column)?;
    let values = counts.into_iter().map(|(value, _)| value).collect();
    Table::new(vec![Column::new(name, values)])
}
