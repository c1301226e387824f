//! Row-level transforms: sort, filter, dedupe, head, tail

use super::predicate::Predicate;
use crate::error::CellforgeResult;
use crate::types::Table;
use crate::value::ValueKey;
use std::collections::HashSet;

/// Stable sort by one column. Missing sorts first ascending, last
/// descending; mixed columns order Missing < Number < Text < Boolean < Error.
pub fn sort(table: &Table, column: &str, descending: bool) -> CellforgeResult<Table> {
    let index = table.require_column(column)?;
    let values = table.columns()[index].values();

    let mut order: Vec<usize> = (0..table.row_count()).collect();
    // sort_by is stable; reversing the comparator keeps ties in input order
    order.sort_by(|&a, &b| {
        let ordering = values[a].sort_cmp(&values[b]);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    Ok(table.take_rows(&order))
}

/// Keep rows where the predicate holds; comparisons yielding an error drop
/// the row
pub fn filter(table: &Table, predicate: &Predicate) -> CellforgeResult<Table> {
    let keep = predicate.matching_rows(table)?;
    Ok(table.take_rows(&keep))
}

/// Keep the first occurrence of each distinct row. A row holding an Error
/// value is never equal to another row, so it is always kept.
pub fn dedupe(table: &Table) -> Table {
    let mut seen: HashSet<Vec<ValueKey>> = HashSet::new();
    let keep: Vec<usize> = (0..table.row_count())
        .filter(|&r| {
            let key: Option<Vec<ValueKey>> = table.row(r).iter().map(|v| v.key()).collect();
            match key {
                Some(key) => seen.insert(key),
                None => true,
            }
        })
        .collect();
    table.take_rows(&keep)
}

/// First `n` rows (clamped)
pub fn head(table: &Table, n: usize) -> Table {
    let n = n.min(table.row_count());
    table.take_rows(&(0..n).collect::<Vec<_>>())
}

/// Last `n` rows (clamped)
pub fn tail(table: &Table, n: usize) -> Table {
    let n = n.min(table.row_count());
    let start = table.row_count() - n;
    table.take_rows(&(start..table.row_count()).collect::<Vec<_>>())
}
