//! Shape transforms: transpose, select, slice, rename, drop_columns

use crate::core::reference::{RangeAddress, Resolver};
use crate::error::{CellforgeError, CellforgeResult};
use crate::types::{Column, ColumnType, Table};
use crate::value::Value;
use std::collections::HashSet;

/// Swap rows and columns.
///
/// The first output column, `Column`, lists the input's column names; the
/// rest are `Row1`..`RowN`. Every output column is typed Mixed.
pub fn transpose(table: &Table) -> CellforgeResult<Table> {
    let mut columns = Vec::with_capacity(table.row_count() + 1);

    let names = table
        .column_names()
        .into_iter()
        .map(Value::from)
        .collect();
    columns.push(Column::with_type("Column", ColumnType::Mixed, names)?);

    for row in 0..table.row_count() {
        let values = table
            .columns()
            .iter()
            .map(|c| c.get(row).cloned().unwrap_or(Value::Missing))
            .collect();
        columns.push(Column::with_type(
            format!("Row{}", row + 1),
            ColumnType::Mixed,
            values,
        )?);
    }

    Table::new(columns)
}

/// Project columns in the given order
pub fn select(table: &Table, names: &[String]) -> CellforgeResult<Table> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(names.len());

    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(CellforgeError::InvalidArgument(format!(
                "column '{}' selected twice",
                name
            )));
        }
        let index = table.require_column(name)?;
        columns.push(table.columns()[index].clone());
    }

    Table::new(columns)
}

/// Rename columns by `(old, new)` pairs; values and types carry over.
///
/// Every old name must exist. Pairs apply together, so `a=b,b=a` swaps two
/// columns, but a result with a repeated name is a schema error.
pub fn rename(table: &Table, renames: &[(String, String)]) -> CellforgeResult<Table> {
    let mut names: Vec<String> = table
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    for (old, new) in renames {
        let index = table.require_column(old)?;
        if new.trim().is_empty() {
            return Err(CellforgeError::InvalidArgument(format!(
                "new name for column '{}' is empty",
                old
            )));
        }
        names[index] = new.clone();
    }

    Table::new(
        table
            .columns()
            .iter()
            .zip(names)
            .map(|(column, name)| column.renamed(name))
            .collect(),
    )
}

/// Remove the named columns, keeping the rest in order
pub fn drop_columns(table: &Table, names: &[String]) -> CellforgeResult<Table> {
    let mut dropped = HashSet::new();
    for name in names {
        dropped.insert(table.require_column(name)?);
    }
    if !table.columns().is_empty() && dropped.len() == table.column_count() {
        return Err(CellforgeError::InvalidArgument(
            "cannot drop every column".to_string(),
        ));
    }

    Table::new(
        table
            .columns()
            .iter()
            .enumerate()
            .filter(|(index, _)| !dropped.contains(index))
            .map(|(_, column)| column.clone())
            .collect(),
    )
}

/// Sub-table covered by an `A1:C5` range.
///
/// The range may run past the table's edge; it is clamped. Column names
/// and types carry over.
pub fn slice(table: &Table, range: &str) -> CellforgeResult<Table> {
    let range: RangeAddress = Resolver::new(table).resolve_range(range)?;

    let last_row = range.end.row.min(table.row_count().saturating_sub(1));
    let last_column = range.end.column.min(table.column_count().saturating_sub(1));

    let rows: Vec<usize> = (range.start.row..=last_row).collect();
    let picked = table.take_rows(&rows);

    Table::new(picked.columns()[range.start.column..=last_column].to_vec())
}
